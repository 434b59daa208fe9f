//! Profile Compiler CLI
//!
//! Entry point for the `profile-compile` command-line tool.

use clap::{Parser, Subcommand};
use profile_compiler::config::{EffectiveSettings, Settings};
use profile_compiler::logging::build_dispatch;
use profile_compiler::redact::redact_secrets;
use profile_compiler::schema::{ConfigTree, ConfigValue, MountPlan, Profile};
use profile_compiler::{load_document, merge_chain, Compiler, Document, StaticAgentLoader};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Dispatch;

#[derive(Parser)]
#[command(name = "profile-compile")]
#[command(about = "Compile layered profiles and agents into session mount plans", version)]
struct Cli {
    /// Settings file (TOML, or JSON with a .json extension)
    #[arg(long, short = 's', global = true)]
    settings: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,

    /// Print secret-looking values as-is
    #[arg(long, global = true)]
    no_redact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a base profile, overlays and agents into a mount plan
    Compile {
        /// Base profile document
        base: PathBuf,

        /// Overlay profile documents, applied in order
        #[arg(long = "overlay", short = 'o')]
        overlays: Vec<PathBuf>,

        /// Agent documents available to the base profile
        #[arg(long = "agent", short = 'a')]
        agents: Vec<PathBuf>,
    },

    /// Merge partial profile documents left to right without validation
    Merge {
        /// Parent document
        parent: PathBuf,

        /// Child documents, each merged over the result so far
        #[arg(required = true)]
        children: Vec<PathBuf>,
    },

    /// Print the session one agent sees once mounted
    Agent {
        /// Base profile document
        base: PathBuf,

        /// Agent to resolve
        #[arg(long)]
        name: String,

        /// Overlay profile documents, applied in order
        #[arg(long = "overlay", short = 'o')]
        overlays: Vec<PathBuf>,

        /// Agent documents available to the base profile
        #[arg(long = "agent", short = 'a')]
        agents: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let effective = match EffectiveSettings::build(cli.settings.as_deref(), cli_overrides(&cli)) {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };
    let settings = effective.settings();

    let dispatch = match build_dispatch(&settings.logging) {
        Ok(dispatch) => dispatch,
        Err(e) => {
            eprintln!("Error configuring logging: {}", e);
            process::exit(1);
        }
    };

    let result = tracing::dispatcher::with_default(&dispatch, || {
        tracing::debug!(sources = effective.sources.len(), "settings loaded");
        let output = run(cli.command, &dispatch)?;
        render(output, settings).map_err(|e| format!("serializing output: {}", e))
    });

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn cli_overrides(cli: &Cli) -> Option<ConfigTree> {
    let mut output = ConfigTree::new();
    if cli.compact {
        output.insert("pretty".to_string(), ConfigValue::Bool(false));
    }
    if cli.no_redact {
        output.insert("redact_secrets".to_string(), ConfigValue::Bool(false));
    }
    if output.is_empty() {
        return None;
    }
    let mut overrides = ConfigTree::new();
    overrides.insert("output".to_string(), ConfigValue::Object(output));
    Some(overrides)
}

fn run(command: Commands, dispatch: &Dispatch) -> Result<ConfigValue, String> {
    match command {
        Commands::Compile {
            base,
            overlays,
            agents,
        } => {
            let plan = compile_plan(&base, &overlays, &agents, dispatch)?;
            Ok(ConfigValue::Object(plan.to_tree()))
        }
        Commands::Merge { parent, children } => {
            let parent = read(&parent)?;
            let children = children
                .iter()
                .map(|path| read(path))
                .collect::<Result<Vec<_>, _>>()?;
            let merged = merge_chain(&parent.tree, children.iter().map(|child| &child.tree))
                .map_err(|e| e.to_string())?;
            Ok(ConfigValue::Object(merged))
        }
        Commands::Agent {
            base,
            name,
            overlays,
            agents,
        } => {
            let plan = compile_plan(&base, &overlays, &agents, dispatch)?;
            let session = Compiler::new()
                .with_dispatch(dispatch.clone())
                .resolve_agent_session(&plan, &name)
                .map_err(|e| e.to_string())?;
            Ok(ConfigValue::Object(session))
        }
    }
}

fn compile_plan(
    base: &Path,
    overlays: &[PathBuf],
    agents: &[PathBuf],
    dispatch: &Dispatch,
) -> Result<MountPlan, String> {
    let base = read_profile(base)?;
    let overlays = overlays
        .iter()
        .map(|path| read_profile(path))
        .collect::<Result<Vec<_>, _>>()?;
    let agent_documents = agents
        .iter()
        .map(|path| read(path))
        .collect::<Result<Vec<_>, _>>()?;
    let loader = StaticAgentLoader::from_documents(&agent_documents);

    let mut compiler = Compiler::new().with_dispatch(dispatch.clone());
    if !loader.is_empty() {
        compiler = compiler.with_agent_loader(&loader);
    }
    Ok(compiler.compile(&base, &overlays))
}

fn read(path: &Path) -> Result<Document, String> {
    load_document(path).map_err(|e| e.to_string())
}

fn read_profile(path: &Path) -> Result<Profile, String> {
    let document = read(path)?;
    Profile::from_tree(document.tree).map_err(|e| format!("{}: {}", path.display(), e))
}

fn render(mut output: ConfigValue, settings: &Settings) -> Result<String, serde_json::Error> {
    if settings.output.redact_secrets {
        let redactions = redact_secrets(&mut output);
        if !redactions.is_empty() {
            tracing::info!(paths = ?redactions, "redacted secret values");
        }
    }
    if settings.output.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
}
