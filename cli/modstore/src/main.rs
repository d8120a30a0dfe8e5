//! modstore — publish versioned modules to an object-storage registry.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{BackendArgs, CliConfig};
use modstore_registry::{PublishOptions, VersionPolicy};

#[derive(Parser)]
#[command(name = "modstore", version, about = "Module registry publisher")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Config file (default: nearest modstore-config.toml upward)
    #[arg(long, global = true, env = "MODSTORE_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive and upload the modules found under a directory
    ///
    /// Every directory holding a modstore.toml is a module. Its descriptor
    /// is parsed, checked against the version constraints, and the
    /// directory is archived and uploaded unless that version is already
    /// stored.
    Upload {
        /// Directory to search for modules (or a single modstore.toml)
        dir: PathBuf,
        #[command(flatten)]
        backend: BackendArgs,
        /// Only upload versions in this semver range (e.g. ">=1.0.0, <2.0.0")
        #[arg(long, env = "MODSTORE_VERSION_CONSTRAINTS_SEMVER")]
        version_constraints_semver: Option<String>,
        /// Only upload versions matching this regex
        #[arg(long, env = "MODSTORE_VERSION_CONSTRAINTS_REGEX")]
        version_constraints_regex: Option<String>,
        /// Search subdirectories for modules [default: true]
        #[arg(
            long,
            env = "MODSTORE_RECURSIVE",
            num_args = 0..=1,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        recursive: Option<bool>,
        /// Skip versions that already exist instead of failing [default: true]
        #[arg(
            long,
            env = "MODSTORE_IGNORE_EXISTING",
            num_args = 0..=1,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        ignore_existing: Option<bool>,
        /// Build archives and report, but upload nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// List the stored versions of a module
    List {
        namespace: String,
        name: String,
        provider: String,
        #[command(flatten)]
        backend: BackendArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let file = CliConfig::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Upload {
            dir,
            backend,
            version_constraints_semver,
            version_constraints_regex,
            recursive,
            ignore_existing,
            dry_run,
        } => {
            let semver = version_constraints_semver.or(file.upload.version_constraints_semver);
            let regex = version_constraints_regex.or(file.upload.version_constraints_regex);
            // Bad constraints fail here, before the registry is touched.
            let policy = VersionPolicy::new(semver.as_deref(), regex.as_deref())
                .context("invalid version constraints")?;

            let options = PublishOptions {
                recursive: recursive.or(file.upload.recursive).unwrap_or(true),
                ignore_existing: ignore_existing
                    .or(file.upload.ignore_existing)
                    .unwrap_or(true),
                dry_run,
                policy,
            };
            let backend = backend.resolve(file.registry.as_ref())?;
            commands::upload::run(&dir, &backend, &options).await
        }

        Commands::List {
            namespace,
            name,
            provider,
            backend,
            json,
        } => {
            let backend = backend.resolve(file.registry.as_ref())?;
            commands::list::run(&backend, &namespace, &name, &provider, json).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bool_flags_accept_explicit_values() {
        let cli = Cli::try_parse_from([
            "modstore",
            "upload",
            "modules/",
            "--type",
            "s3",
            "--s3-bucket",
            "b",
            "--recursive=false",
            "--ignore-existing",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload {
                recursive,
                ignore_existing,
                backend,
                ..
            } => {
                assert_eq!(recursive, Some(false));
                assert_eq!(ignore_existing, Some(true));
                assert_eq!(backend.s3_bucket.as_deref(), Some("b"));
            }
            Commands::List { .. } => panic!("expected upload"),
        }
    }

    #[test]
    fn list_takes_three_positionals() {
        let cli = Cli::try_parse_from([
            "modstore", "list", "acme", "vpc", "aws", "--type", "local", "--local-root", "/tmp/r",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::List { json: false, .. }));
    }
}
