use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use suspension_config::Config;
use suspension_engine::{
    Affinity, RelativeMarks, StringComparer, TextReplayer, TokenCatalog, TokenReplacer, remove,
    restore, suspend,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "suspension")]
#[command(about = "Lift markup out of documents, edit the plain text, put the markup back")]
struct Cli {
    /// Config file to use instead of ~/.config/suspension/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Token catalog TOML, overriding the configured one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Named token set within the catalog
    #[arg(long = "set", global = true)]
    token_set: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a document into filtered text and a marks file
    Suspend {
        document: PathBuf,
        /// Where to write the marks
        #[arg(long)]
        marks: PathBuf,
        /// Where to write the filtered text (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Put marks back into filtered text
    Restore {
        text: PathBuf,
        marks: PathBuf,
        /// Only restore marks with these names
        #[arg(long = "only", value_delimiter = ',')]
        only: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Take the prose of one document and the marks of another
    Replay {
        text_authority: PathBuf,
        mark_authority: PathBuf,
        /// Where a mark goes when text is inserted right at it
        #[arg(long, value_parser = parse_affinity)]
        affinity: Option<Affinity>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy the named marks from one document into another with the same text
    Replace {
        source: PathBuf,
        target: PathBuf,
        #[arg(long, value_delimiter = ',', required = true)]
        tokens: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Drop every mark and print the filtered text
    Strip {
        document: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report the differences between two texts
    Compare {
        a: PathBuf,
        b: PathBuf,
        /// Include unchanged segments
        #[arg(long)]
        all: bool,
        /// Omit line numbers and excerpts
        #[arg(long)]
        no_context: bool,
    },
}

fn parse_affinity(value: &str) -> Result<Affinity, String> {
    match value {
        "left" => Ok(Affinity::Left),
        "right" => Ok(Affinity::Right),
        other => Err(format!("expected left or right, got {other:?}")),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Suspend {
            document,
            marks,
            output,
        } => {
            let catalog = load_catalog(&config)?;
            let suspension = suspend(&read(&document)?, &catalog, None);
            log::info!(
                "Suspended {} marks from {}",
                suspension.marks.len(),
                document.display()
            );
            let wire = suspension.marks.to_relative()?.serialize()?;
            write(Some(marks.as_path()), &wire)?;
            write(output.as_deref(), &suspension.filtered_text)
        }
        Command::Restore {
            text,
            marks,
            only,
            output,
        } => {
            let list = RelativeMarks::deserialize(&read(&marks)?)
                .with_context(|| format!("Failed to decode marks in {}", marks.display()))?;
            let names: Vec<&str> = only.iter().map(String::as_str).collect();
            let names = (!names.is_empty()).then_some(names.as_slice());
            write(output.as_deref(), &restore(&read(&text)?, &list, names)?)
        }
        Command::Replay {
            text_authority,
            mark_authority,
            affinity,
            output,
        } => {
            let replayer = TextReplayer::new(load_catalog(&config)?)
                .with_affinity(affinity.unwrap_or(config.affinity))
                .with_diff(config.diff_adapter());
            let result = replayer.replay(&read(&text_authority)?, &read(&mark_authority)?)?;
            write(output.as_deref(), &result)
        }
        Command::Replace {
            source,
            target,
            tokens,
            output,
        } => {
            let names: Vec<&str> = tokens.iter().map(String::as_str).collect();
            let replacer = TokenReplacer::new(load_catalog(&config)?);
            let result = replacer
                .replace(&read(&source)?, &read(&target)?, &names)
                .with_context(|| {
                    format!(
                        "Failed to move marks from {} into {}",
                        source.display(),
                        target.display()
                    )
                })?;
            write(output.as_deref(), &result)
        }
        Command::Strip { document, output } => {
            let catalog = load_catalog(&config)?;
            write(output.as_deref(), &remove(&read(&document)?, &catalog, None))
        }
        Command::Compare { a, b, all, no_context } => {
            let mut options = config.compare_options();
            options.changes_only = !all;
            options.with_context = !no_context;
            let comparer = StringComparer::new(config.diff_adapter(), options);
            for difference in comparer.compare(&read(&a)?, &read(&b)?)? {
                println!("{difference}");
            }
            Ok(())
        }
    }
}

/// Settings from the config file, with command-line flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let loaded = match &cli.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file not found at {}", path.display()))?,
        None => Config::load()?.unwrap_or_else(|| {
            log::debug!(
                "No config file at {}, using defaults",
                Config::config_path().display()
            );
            Config::default()
        }),
    };
    Ok(Config {
        catalog: cli.catalog.clone().or(loaded.catalog),
        token_set: cli.token_set.clone().or(loaded.token_set),
        ..loaded
    })
}

fn load_catalog(config: &Config) -> Result<TokenCatalog> {
    let catalog = config.load_catalog()?;
    log::debug!(
        "Using {} tokens from {}",
        catalog.len(),
        config
            .catalog
            .as_deref()
            .map_or_else(|| "the built-in catalog".to_string(), |p| p.display().to_string())
    );
    Ok(catalog)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
