use std::process;

use clap::Parser;
use content_loader::Section;
use tracing::instrument;

use super::{ContextArgs, Source, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Display the questions of a section")]
pub struct Show {
    /// The id of the section to display
    section: String,

    #[command(flatten)]
    context: ContextArgs,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Yaml,
}

impl Show {
    #[instrument(level = "debug", skip(self, source))]
    pub fn run(self, source: &Source) -> anyhow::Result<()> {
        let loader = source.load()?;
        let view = self.context.view(&loader)?;

        let Some(section) = view.get_section(&self.section) else {
            eprintln!("Section {} not found", self.section);
            process::exit(1);
        };

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(section),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(section)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(section)?),
        }

        Ok(())
    }

    fn output_pretty(section: &Section) {
        println!("# {}", section.id);
        println!("{}\n", section.name);

        println!("{}", "Metadata".dim());
        println!("  Editable:  {}", section.editable);
        for (key, value) in &section.extra {
            println!("  {key}: {}", render_scalar(value));
        }

        println!("\n{}", "Questions".dim());
        if section.questions.is_empty() {
            println!("  {}", "none".dim());
        }
        for question in &section.questions {
            println!("  • {} {}", question.id.info(), question.name);
            for dependency in &question.depends {
                let on = dependency.on.as_deref().unwrap_or("?");
                let being = dependency
                    .being
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(render_scalar)
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("      {}", format!("when {on} is one of [{being}]").dim());
            }
        }
    }
}

fn render_scalar(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
