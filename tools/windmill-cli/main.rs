use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use windmill::prelude::*;

/// Project tooling for windmill workflows: scaffold projects, inspect and
/// validate WML files, and query a running backend.
#[derive(Parser)]
#[command(name = "windmill-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new windmill project directory.
    Init {
        /// Name of the project folder.
        #[arg(default_value = ProjectDefaults::PROJECT_NAME)]
        name: String,
    },
    /// Print a summary of a WML file.
    Inspect {
        /// Path to a .wml file.
        file: PathBuf,
    },
    /// Validate a WML file the way the backend will.
    Validate {
        /// Path to a .wml file.
        file: PathBuf,
    },
    /// Fetch and list the operator catalog from a running backend.
    Operators {
        /// Backend base URL.
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init { name } => init(&name),
        Command::Inspect { file } => inspect(&file),
        Command::Validate { file } => validate(&file),
        Command::Operators { server } => operators(server).await,
    }
}

fn init(name: &str) {
    let config = ProjectConfig::named(name);
    match config.scaffold(std::path::Path::new(".")) {
        Ok(root) => println!("Created windmill project at '{}'", root.display()),
        Err(e) => {
            eprintln!("Failed to create project '{}': {}", name, e);
            process::exit(1);
        }
    }
}

fn load_wml(file: &Path) -> WmlFile {
    let raw = match std::fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", file.display(), e);
            process::exit(1);
        }
    };
    match WmlFile::from_json(&raw) {
        Ok(wml) => wml,
        Err(e) => {
            eprintln!("'{}' is not a valid WML file: {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn inspect(file: &Path) {
    let wml = load_wml(file);
    println!("Workflow '{}'", wml.filename);
    if let Some(description) = &wml.dag.description {
        println!("  {}", description);
    }
    println!(
        "  {} nodes, {} links, {} DAG parameters",
        wml.nodes.len(),
        wml.links.len(),
        wml.dag.parameters.len()
    );
    for (id, node) in &wml.nodes {
        let parameters = node
            .properties
            .as_ref()
            .map_or(0, |props| props.parameters.len());
        println!("  - {} ({}): {} parameters", node.op_type, id, parameters);
    }
}

fn validate(file: &Path) {
    let wml = load_wml(file);
    match wml.validate() {
        Ok(()) => println!("'{}' is a valid workflow", file.display()),
        Err(e) => {
            eprintln!("'{}' failed validation: {}", file.display(), e);
            process::exit(1);
        }
    }
}

async fn operators(server: Option<String>) {
    let base_url = server.unwrap_or_else(ServerDefaults::base_url);
    println!("Fetching operator catalog from {}", base_url);
    let api = HttpApi::new(base_url);
    match api.operators().await {
        Ok(catalog) => {
            println!("{} operators available:", catalog.len());
            for operator in catalog {
                let name = operator
                    .properties
                    .name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(operator.op_type.as_str());
                println!(
                    "  - {} ({} parameters)",
                    name,
                    operator.properties.parameters.len()
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to fetch operator catalog: {}", e);
            process::exit(1);
        }
    }
}
