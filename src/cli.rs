use std::path::{Path, PathBuf};

mod next;
mod question;
mod sections;
mod show;
mod status;
mod terminal;

use clap::ArgAction;
use content_loader::{Config, ContentBuilder, ContentLoader, Context, domain::context::parse_pair};
use next::Next;
use question::Question;
use sections::Sections;
use serde_yaml::Value;
use show::Show;
use status::Status;
use tracing::instrument;

/// Name of the optional configuration file at the content root.
const CONFIG_FILE: &str = "content.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the content directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Override the manifest path from the configuration
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Override the question directory from the configuration
    #[arg(long, global = true)]
    questions: Option<PathBuf>,

    /// Fail if the manifest or a question file is missing
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let source = self.source();

        self.command
            .unwrap_or_else(|| Command::Sections(Sections::default()))
            .run(&source)
    }

    /// Resolves the configuration at the root, with command-line overrides applied.
    fn source(&self) -> Source {
        let mut config = load_config(&self.root);
        if let Some(manifest) = &self.manifest {
            config.manifest.clone_from(manifest);
        }
        if let Some(questions) = &self.questions {
            config.questions.clone_from(questions);
        }
        config.strict |= self.strict;

        Source {
            root: self.root.clone(),
            config,
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List the sections visible under a context (default)
    Sections(Sections),

    /// Show the questions of a section
    Show(Show),

    /// Print the id of the section after a given one
    ///
    /// Without a section, prints the first visible section.
    Next(Next),

    /// Print a single question definition
    Question(Question),

    /// Summarise the content directory and report missing or unused files
    Status(Status),
}

impl Command {
    fn run(self, source: &Source) -> anyhow::Result<()> {
        match self {
            Self::Sections(command) => command.run(source)?,
            Self::Show(command) => command.run(source)?,
            Self::Next(command) => command.run(source)?,
            Self::Question(command) => command.run(source)?,
            Self::Status(command) => command.run(source)?,
        }
        Ok(())
    }
}

/// Where content is read from.
#[derive(Debug)]
pub struct Source {
    root: PathBuf,
    config: Config,
}

impl Source {
    #[instrument(level = "debug", skip(self))]
    fn load(&self) -> anyhow::Result<ContentLoader> {
        Ok(ContentLoader::from_config(&self.root, &self.config)?)
    }

    fn questions_dir(&self) -> PathBuf {
        self.config.questions_dir(&self.root)
    }

    fn extension(&self) -> &str {
        self.config.extension()
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!("No {CONFIG_FILE} in {}, using defaults", root.display());
        return Config::default();
    }
    Config::load(&path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {e}");
        Config::default()
    })
}

/// Answers used to filter content, given as repeated `-c KEY=VALUE` flags.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ContextArgs {
    /// A context answer, e.g. `-c lot=SaaS` (may be repeated)
    #[arg(short = 'c', long = "context", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pairs: Vec<(String, Value)>,
}

impl ContextArgs {
    fn context(&self) -> Context {
        self.pairs.iter().cloned().collect()
    }

    /// Builds a view over `loader`, filtered when any answers were given.
    fn view(&self, loader: &ContentLoader) -> anyhow::Result<ContentBuilder> {
        let builder = loader.get_builder();
        if self.pairs.is_empty() {
            return Ok(builder);
        }
        Ok(builder.filter(&self.context())?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::tempdir;

    use super::*;

    fn write_content(root: &Path) {
        fs::create_dir_all(root.join("questions")).unwrap();
        fs::write(
            root.join("manifest.yml"),
            "- name: Pricing\n  questions: [price, discount]\n",
        )
        .unwrap();
        fs::write(root.join("questions/price.yml"), "name: Price\n").unwrap();
        fs::write(
            root.join("questions/discount.yml"),
            "name: Discount\ndepends:\n- on: lot\n  being: SaaS\n",
        )
        .unwrap();
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("content").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn load_config_falls_back_to_defaults() {
        let tmp = tempdir().unwrap();

        assert_eq!(load_config(tmp.path()), Config::default());

        fs::write(tmp.path().join(CONFIG_FILE), "not = [valid").unwrap();
        assert_eq!(load_config(tmp.path()), Config::default());
    }

    #[test]
    fn load_config_reads_config_file() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "_version = \"1\"\nmanifest = \"g7.yml\"\nstrict = true\n",
        )
        .unwrap();

        let config = load_config(tmp.path());

        assert_eq!(config.manifest, PathBuf::from("g7.yml"));
        assert!(config.strict);
    }

    #[test]
    fn overrides_reach_the_source() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();

        let cli = parse(&[
            "--root",
            root,
            "status",
            "--manifest",
            "other.yml",
            "--questions",
            "qs",
            "--strict",
        ]);
        let source = cli.source();

        assert_eq!(source.root, tmp.path());
        assert_eq!(source.config.manifest, PathBuf::from("other.yml"));
        assert_eq!(source.questions_dir(), tmp.path().join("qs"));
        assert!(source.config.strict);
    }

    #[test]
    fn command_line_overrides_config_file() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "_version = \"1\"\nmanifest = \"g7.yml\"\nextension = \"yaml\"\n",
        )
        .unwrap();

        let source = parse(&["--root", tmp.path().to_str().unwrap()]).source();
        assert_eq!(source.config.manifest, PathBuf::from("g7.yml"));
        assert!(!source.config.strict);

        let source = parse(&[
            "--root",
            tmp.path().to_str().unwrap(),
            "--manifest",
            "g8.yml",
        ])
        .source();
        assert_eq!(source.config.manifest, PathBuf::from("g8.yml"));
        assert_eq!(source.extension(), "yaml");
    }

    #[test]
    fn strict_source_fails_on_missing_files() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();

        assert!(parse(&["--root", root]).source().load().is_ok());
        assert!(parse(&["--root", root, "--strict"]).source().load().is_err());
    }

    #[test]
    fn view_without_answers_is_unfiltered() {
        let tmp = tempdir().unwrap();
        write_content(tmp.path());
        let loader = parse(&["--root", tmp.path().to_str().unwrap()])
            .source()
            .load()
            .unwrap();

        let view = ContextArgs::default().view(&loader).unwrap();

        assert_eq!(view.sections(), loader.sections());
        assert_eq!(view.sections()[0].questions.len(), 2);
    }

    #[test]
    fn view_with_answers_is_filtered() {
        let tmp = tempdir().unwrap();
        write_content(tmp.path());
        let loader = parse(&["--root", tmp.path().to_str().unwrap()])
            .source()
            .load()
            .unwrap();

        let saas = ContextArgs {
            pairs: vec![parse_pair("lot=SaaS").unwrap()],
        };
        let iaas = ContextArgs {
            pairs: vec![parse_pair("lot=IaaS").unwrap()],
        };

        assert_eq!(saas.view(&loader).unwrap().sections()[0].questions.len(), 2);
        let view = iaas.view(&loader).unwrap();
        assert_eq!(view.sections()[0].questions.len(), 1);
        assert_eq!(view.sections()[0].questions[0].id, "price");
    }
}
