use anyhow::Result;
use clap::{Parser, Subcommand};
use dependency_linkage::app::engine::LinkageEngine;
use dependency_linkage::app::settings::{CLASSPATH_ENV, REPOSITORY_ENV, Settings};
use dependency_linkage::cli;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "deplink",
    version,
    about = "Static linkage checks and dependency graphs for JVM artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maven-layout local repository (default: ~/.m2/repository)
    #[arg(long, global = true, env = REPOSITORY_ENV)]
    repository: Option<PathBuf>,

    /// Resolution-only classpath entry searched after the checked archives (repeatable)
    #[arg(long, global = true, env = CLASSPATH_ENV, value_delimiter = ':')]
    classpath: Vec<PathBuf>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report method references that resolve to nothing across the given archives
    Linkage {
        /// Jar files or class directories; they also form the classpath, in order
        #[arg(required = true)]
        jars: Vec<PathBuf>,
        /// Resolution-only classpath entry appended after the archives (repeatable)
        #[arg(long = "resolve-against")]
        resolve_against: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },

    /// Breadth-first dependency graph of one or more artifacts
    Graph {
        /// Coordinates: group:artifact[:extension[:classifier]]:version
        #[arg(required = true)]
        artifacts: Vec<String>,
        /// Keep every path instead of nearest-wins mediation
        #[arg(long)]
        complete: bool,
        /// Only print artifacts reached at more than one version
        #[arg(long)]
        conflicts: bool,
        #[arg(long)]
        json: bool,
    },

    /// Declared dependencies of an artifact
    Direct {
        artifact: String,
        #[arg(long)]
        json: bool,
    },

    /// Compile-scope dependency tree of an artifact, with located files
    Tree {
        artifact: String,
        #[arg(long)]
        json: bool,
    },

    /// Resolve an artifact's compile-time classpath and check its linkage
    CheckArtifact {
        artifact: String,
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server
    Serve {
        #[arg(long, default_value_t = 8787)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let Cli {
        command,
        repository,
        classpath,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    let settings = Settings::new(repository).with_extra_classpath(classpath);
    let engine = LinkageEngine::new(settings);

    match command {
        Commands::Linkage {
            jars,
            resolve_against,
            json,
        } => {
            let unresolved = cli::run_linkage(&engine, &jars, &resolve_against, json)?;
            Ok(exit_code(unresolved))
        }
        Commands::Graph {
            artifacts,
            complete,
            conflicts,
            json,
        } => {
            cli::print_graph(&engine, &artifacts, complete, conflicts, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Direct { artifact, json } => {
            cli::print_direct(&engine, &artifact, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Tree { artifact, json } => {
            cli::print_tree(&engine, &artifact, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckArtifact { artifact, json } => {
            let unresolved = cli::check_artifact(&engine, &artifact, json)?;
            Ok(exit_code(unresolved))
        }
        Commands::Serve { port, host } => {
            let addr: SocketAddr = format!("{host}:{port}").parse()?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(dependency_linkage::server::http::serve(engine, addr))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 0 when every reference resolved, 1 otherwise.
fn exit_code(unresolved: usize) -> ExitCode {
    if unresolved == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
