use std::process;

use clap::Parser;
use tracing::instrument;

use super::{ContextArgs, Source};

#[derive(Debug, Parser)]
#[command(about = "Print the id of the next visible section")]
pub struct Next {
    /// The current section; omit to get the first section
    section: Option<String>,

    /// Only consider editable sections
    #[arg(long)]
    editable: bool,

    #[command(flatten)]
    context: ContextArgs,
}

impl Next {
    #[instrument(level = "debug", skip(self, source))]
    pub fn run(self, source: &Source) -> anyhow::Result<()> {
        let loader = source.load()?;
        let view = self.context.view(&loader)?;

        let current = self.section.as_deref();
        let next = if self.editable {
            view.get_next_editable_section_id(current)
        } else {
            view.get_next_section_id(current)
        };

        // no next section is signalled through the exit code, for scripting
        let Some(next) = next else {
            tracing::info!("No section after {current:?}");
            process::exit(1);
        };

        println!("{next}");
        Ok(())
    }
}
