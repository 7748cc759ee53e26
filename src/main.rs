use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use doclens::docgen::{documentable_declarations, DocPolicy};
use doclens::overview::{build_project_tree, Package};
use doclens::server::serve_stdio;
use doclens::syntax::{SyntaxNode, SyntaxTreeResponse};

/// Documentation CodeLens and project overview provider.
#[derive(Parser, Debug)]
#[command(name = "doclens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the language server on stdio (default)
    Serve,
    /// Print the documentable declarations of a syntax tree as JSON
    Lens {
        /// Syntax tree JSON, either a bare node or a `{ "syntaxTree": ... }` response
        tree: PathBuf,
        /// Module name recorded in every declaration
        #[arg(long)]
        module: String,
        /// Only count documented functions inside containers when they are public
        #[arg(long)]
        inner_functions_require_public: bool,
    },
    /// Print the project overview of a package metadata file as JSON
    Overview {
        /// Package metadata JSON, either a package list or a `{ "packages": [...] }` response
        packages: PathBuf,
        #[arg(long)]
        source_root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DOCLENS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve_stdio().await,
        Commands::Lens {
            tree,
            module,
            inner_functions_require_public,
        } => {
            let policy = DocPolicy {
                inner_functions_require_public,
            };
            let declarations = match read_tree(&tree)? {
                Some(root) => documentable_declarations(&root, &module, policy),
                None => Vec::new(),
            };
            println!("{}", serde_json::to_string_pretty(&declarations)?);
        }
        Commands::Overview {
            packages,
            source_root,
        } => {
            let packages = read_packages(&packages)?;
            let tree = build_project_tree(&packages, &source_root);
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_tree(path: &Path) -> anyhow::Result<Option<SyntaxNode>> {
    let value = read_json(path)?;

    let root = if value.get("syntaxTree").is_some() {
        serde_json::from_value::<SyntaxTreeResponse>(value)?.root()?
    } else {
        Some(SyntaxNode::from_json(&value)?)
    };

    Ok(root)
}

fn read_packages(path: &Path) -> anyhow::Result<Vec<Package>> {
    let value = read_json(path)?;

    let packages = match value {
        Value::Object(mut object) => object
            .remove("packages")
            .ok_or(anyhow!("{} has no `packages` field", path.display()))?,
        other => other,
    };

    Ok(serde_json::from_value(packages)?)
}
