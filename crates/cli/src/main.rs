//! polyreg CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a starter manifest
//! - `check`: Validate every registration in the manifest
//! - `types`: List public types and how each resolves
//! - `resolve`: Show where a type gets its default implementation
//! - `views`: List the internal views attached to a type
//! - `create`: Create an instance through a type's factory
//! - `manifest`: Show the manifest path or contents

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "polyreg",
    about = "polyreg: polymorphic type registry checker",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Manifest to load (default: $POLYREG_MANIFEST, then ./polyreg.toml)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter manifest
    Init {
        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Validate every registration in the manifest
    Check {
        /// Print the validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List public types and how each resolves
    Types,

    /// Show where a type gets its default implementation
    Resolve {
        /// The type to resolve
        type_name: String,
    },

    /// List the internal views attached to a type
    Views {
        /// The type to inspect
        type_name: String,
    },

    /// Create an instance through a type's factory
    Create {
        /// The exact type to create
        type_name: String,

        /// Instance name
        #[arg(short, long)]
        name: String,

        /// Parent path the instance is created under
        #[arg(short, long, default_value = "")]
        parent: String,
    },

    /// Manifest helpers
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },
}

#[derive(Subcommand)]
enum ManifestAction {
    /// Print the resolved manifest path
    Path,
    /// Print the parsed manifest as TOML
    Show,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let manifest = cli.manifest.as_deref();
    match cli.command {
        Commands::Init { force } => commands::init::run(manifest, force)?,
        Commands::Check { json } => commands::check::run(manifest, json)?,
        Commands::Types => commands::types::run(manifest)?,
        Commands::Resolve { type_name } => commands::resolve::run(manifest, &type_name)?,
        Commands::Views { type_name } => commands::views::run(manifest, &type_name)?,
        Commands::Create {
            type_name,
            name,
            parent,
        } => commands::create::run(manifest, &type_name, &name, &parent)?,
        Commands::Manifest { action } => match action {
            ManifestAction::Path => commands::manifest_cmd::path(manifest)?,
            ManifestAction::Show => commands::manifest_cmd::show(manifest)?,
        },
    }

    Ok(())
}
