use clap::Parser;
use content_loader::Section;
use tracing::instrument;

use super::{ContextArgs, Source, terminal::Colorize};

#[derive(Debug, Parser, Default)]
#[command(about = "List the sections visible under a context")]
pub struct Sections {
    #[command(flatten)]
    context: ContextArgs,

    /// Only list editable sections
    #[arg(long)]
    editable: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Ids,
}

impl Sections {
    #[instrument(level = "debug", skip(self, source))]
    pub fn run(self, source: &Source) -> anyhow::Result<()> {
        let loader = source.load()?;
        let view = self.context.view(&loader)?;

        let sections: Vec<&Section> = view
            .iter()
            .filter(|section| !self.editable || section.editable)
            .collect();

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(&sections),
            OutputFormat::Json => Self::output_json(&sections)?,
            OutputFormat::Ids => {
                for section in &sections {
                    println!("{}", section.id);
                }
            }
        }

        Ok(())
    }

    fn output_pretty(sections: &[&Section]) {
        if sections.is_empty() {
            println!("{}", "No sections visible.".dim());
            return;
        }

        let width = sections.iter().map(|s| s.id.len()).max().unwrap_or(0);
        for section in sections {
            let marker = if section.editable {
                " (editable)".info()
            } else {
                String::new()
            };
            println!(
                "{:<width$}  {}{marker} {}",
                section.id,
                section.name,
                format!("[{} questions]", section.questions.len()).dim(),
            );
        }
    }

    fn output_json(sections: &[&Section]) -> anyhow::Result<()> {
        use serde_json::json;

        let output: Vec<_> = sections
            .iter()
            .map(|section| {
                json!({
                    "id": section.id,
                    "name": section.name,
                    "editable": section.editable,
                    "questions": section
                        .questions
                        .iter()
                        .map(|q| q.id.as_str())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
