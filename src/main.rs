use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gem_manifest::config::Config;
use gem_manifest::edit::{DeclarationOptions, PinOperator, QuoteStyle};
use gem_manifest::error::ManifestError;
use gem_manifest::file_types::ManifestKind;
use gem_manifest::parsers::{DEVELOPMENT_GROUP, ManifestDocument, RequireOption};
use gem_manifest::tools::{EditOutcome, ManifestTools};

#[derive(Parser)]
#[command(name = "gem-manifest")]
#[command(about = "Read and edit Gemfile and gemspec dependencies", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that relative manifest paths are resolved against
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct VersionArgs {
    /// Version, optionally with its own operator ("7.1", "~> 7.1")
    #[arg(short, long)]
    version: Option<String>,

    /// Operator to put in front of the version (~>, >=, >, <, <=, =)
    #[arg(short, long)]
    operator: Option<PinOperator>,

    /// Quote style for the written line (single or double)
    #[arg(short, long)]
    quote: Option<QuoteStyle>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the declarations of a manifest as JSON
    Read {
        /// Path to the Gemfile or gemspec
        file: PathBuf,

        /// Treat the file as this kind instead of detecting it
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<ManifestKind>,
    },
    /// Set the version constraint of a gem
    Pin {
        file: PathBuf,
        name: String,
        version: String,

        #[arg(short, long)]
        operator: Option<PinOperator>,

        #[arg(short, long)]
        quote: Option<QuoteStyle>,
    },
    /// Remove the version constraint of a gem
    Unpin { file: PathBuf, name: String },
    /// Add a gem to a Gemfile
    Add {
        file: PathBuf,
        name: String,

        #[command(flatten)]
        version: VersionArgs,

        /// Group to add the gem to (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,

        /// Platform restriction (repeatable)
        #[arg(short, long = "platform")]
        platforms: Vec<String>,

        /// Git URL, local path or gem server
        #[arg(short, long)]
        source: Option<String>,

        /// Custom require path
        #[arg(long, conflicts_with = "no_require")]
        require: Option<String>,

        /// Write `require: false`
        #[arg(long)]
        no_require: bool,
    },
    /// Add a dependency to a gemspec
    AddDependency {
        file: PathBuf,
        name: String,

        #[command(flatten)]
        version: VersionArgs,

        /// Write `add_development_dependency`
        #[arg(short, long)]
        development: bool,
    },
    /// Run a JSON request read from stdin and print the JSON response
    Exec,
}

fn parse_kind(s: &str) -> Result<ManifestKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "gemfile" => Ok(ManifestKind::Gemfile),
        "gemspec" => Ok(ManifestKind::Gemspec),
        other => Err(format!("unknown manifest kind `{other}` (expected gemfile or gemspec)")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(),
    };

    let mut tools = ManifestTools::new(config);
    if let Some(dir) = cli.base_dir {
        tools = tools.with_base_dir(dir);
    }

    match cli.command {
        Commands::Read { file, kind } => print_document(tools.read(&file, kind)),
        Commands::Pin {
            file,
            name,
            version,
            operator,
            quote,
        } => Ok(report(tools.pin(&file, &name, &version, operator, quote))),
        Commands::Unpin { file, name } => Ok(report(tools.unpin(&file, &name))),
        Commands::Add {
            file,
            name,
            version,
            groups,
            platforms,
            source,
            require,
            no_require,
        } => {
            let require = if no_require {
                Some(RequireOption::Disabled)
            } else {
                require.map(RequireOption::Path)
            };
            let opts = DeclarationOptions {
                version: version.version,
                operator: version.operator,
                groups,
                platforms,
                source,
                require,
            };
            Ok(report(tools.add_declaration(
                &file,
                &name,
                &opts,
                version.quote,
            )))
        }
        Commands::AddDependency {
            file,
            name,
            version,
            development,
        } => {
            let opts = DeclarationOptions {
                version: version.version,
                operator: version.operator,
                groups: if development {
                    vec![DEVELOPMENT_GROUP.to_string()]
                } else {
                    Vec::new()
                },
                ..Default::default()
            };
            Ok(report(tools.add_dependency(
                &file,
                &name,
                &opts,
                version.quote,
            )))
        }
        Commands::Exec => run_exec(&tools),
    }
}

fn print_document(document: Result<ManifestDocument, ManifestError>) -> anyhow::Result<ExitCode> {
    match document {
        Ok(document) => {
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize manifest")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report(result: Result<EditOutcome, ManifestError>) -> ExitCode {
    match result {
        Ok(outcome) => {
            println!("{}", outcome.message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_exec(tools: &ManifestTools) -> anyhow::Result<ExitCode> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read request from stdin")?;

    let response = tools.execute_json(&input);
    let json = serde_json::to_string(&response).context("Failed to serialize response")?;
    println!("{json}");

    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
