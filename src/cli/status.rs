use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use content_loader::ContentLoader;
use tracing::instrument;
use walkdir::WalkDir;

use super::{
    Source,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show content counts, missing files and unreferenced question files")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

struct Summary {
    sections: usize,
    editable: usize,
    questions: usize,
    missing: Vec<PathBuf>,
    unreferenced: Vec<PathBuf>,
}

impl Status {
    #[instrument(level = "debug", skip(self, source))]
    pub fn run(self, source: &Source) -> anyhow::Result<()> {
        let loader = source.load()?;

        let summary = Summary {
            sections: loader.sections().len(),
            editable: loader.sections().iter().filter(|s| s.editable).count(),
            questions: loader.questions().len(),
            missing: loader.missing_files().to_vec(),
            unreferenced: unreferenced_question_files(
                &loader,
                &source.questions_dir(),
                source.extension(),
            ),
        };

        if summary.sections == 0 && summary.missing.is_empty() {
            println!("No sections found yet. Add some to the manifest.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&summary)?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(&summary);
                } else {
                    Self::output_table(&summary);
                }
            }
        }

        // Exit with a non-zero code when files referenced by the manifest are missing.
        if !summary.missing.is_empty() {
            process::exit(2);
        }

        Ok(())
    }

    fn output_json(summary: &Summary) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "sections": {
                "count": summary.sections,
                "editable": summary.editable,
            },
            "questions": summary.questions,
            "missing": summary.missing,
            "unreferenced": summary.unreferenced,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(summary: &Summary) {
        println!(
            "sections={} editable={} questions={} missing={} unreferenced={}",
            summary.sections,
            summary.editable,
            summary.questions,
            summary.missing.len(),
            summary.unreferenced.len()
        );
    }

    fn output_table(summary: &Summary) {
        const MAX_PATH_DISPLAY: usize = 10;

        println!("Content counts");
        println!("{}", "──────────────".dim());

        if is_narrow() {
            println!("Sections: {} ({} editable)", summary.sections, summary.editable);
            println!("Questions: {}", summary.questions);
        } else {
            println!("{:<12} {:<6} {}", "", "Count", "Editable");
            println!("{:<12} {:<6} {}", "Sections", summary.sections, summary.editable);
            println!("{:<12} {:<6} {}", "Questions", summary.questions, "–".dim());
        }

        println!();

        for (label, paths, hint) in [
            (
                "Missing files",
                &summary.missing,
                "Missing files are loaded as empty documents.",
            ),
            (
                "Unreferenced question files",
                &summary.unreferenced,
                "These files are not referenced by any section.",
            ),
        ] {
            if paths.is_empty() {
                println!("{label}: {} ✅", "0".success());
                continue;
            }

            println!("{label}: {} ⚠️", paths.len().to_string().warning());
            for path in paths.iter().take(MAX_PATH_DISPLAY) {
                println!("  - {}", path.display());
            }
            if paths.len() > MAX_PATH_DISPLAY {
                println!("  - ... and {} more", paths.len() - MAX_PATH_DISPLAY);
            }
            println!("{}", hint.dim());
        }
    }
}

fn unreferenced_question_files(
    loader: &ContentLoader,
    questions_dir: &Path,
    extension: &str,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(questions_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new(extension)))
        .filter(|entry| {
            entry
                .path()
                .file_stem()
                .and_then(OsStr::to_str)
                .is_none_or(|id| !loader.questions().contains_key(id))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();
    paths
}
