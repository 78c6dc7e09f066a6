use std::process;

use clap::Parser;
use tracing::instrument;

use super::Source;

#[derive(Debug, Parser)]
#[command(about = "Display a single question definition")]
pub struct Question {
    /// The id of the question
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "yaml")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl Question {
    #[instrument(level = "debug", skip(self, source))]
    pub fn run(self, source: &Source) -> anyhow::Result<()> {
        let loader = source.load()?;

        let Some(question) = loader.get_question(&self.id) else {
            eprintln!("Question {} not found", self.id);
            process::exit(1);
        };

        match self.output {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&question)?),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&question)?),
        }

        Ok(())
    }
}
