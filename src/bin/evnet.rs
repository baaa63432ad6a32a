//! evnet CLI tool
//!
//! Command-line interface for inspecting evidence networks stored in the JSON exchange format.
//!
//! ## Commands
//!
//! - `report <file>`: node and edge tables
//! - `tables <file>`: truth tables per connected component
//! - `normalize <file>`: validate, prune stale parameters and re-export
//! - `extract <narrative>`: structure free text through the configured extractor

use clap::{Parser, Subcommand};
use evidence_net::{
    codec::json::NetworkData,
    config::{ConfigProvider, EvidenceNetConfig, TomlConfigProvider},
    engine::TableOutcome,
    report::{EDGE_HEADER, NODE_HEADER},
    session::Session,
    EvidenceNetError,
};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "evnet")]
#[command(author, version, about = "Inspect and compute evidence/hypothesis networks", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node and edge tables of a network
    Report {
        /// Network JSON file
        path: PathBuf,

        /// Fill unset parameters with the configured defaults first
        #[arg(short, long)]
        seed: bool,
    },

    /// Print the truth table of every connected component
    Tables {
        /// Network JSON file
        path: PathBuf,

        /// Fill unset parameters with the configured defaults first
        #[arg(short, long)]
        seed: bool,
    },

    /// Validate a network and write it back in canonical form
    Normalize {
        /// Network JSON file
        path: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn a narrative text file into a network with the configured extractor
    Extract {
        /// Narrative text file
        path: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<EvidenceNetConfig, EvidenceNetError> {
    match path {
        Some(path) => TomlConfigProvider::new(path).get_config(),
        None => Ok(EvidenceNetConfig::default()),
    }
}

fn load_session(
    path: &Path,
    config: EvidenceNetConfig,
    seed: bool,
) -> Result<Session, EvidenceNetError> {
    let mut session = Session::from_data(NetworkData::from_path(path)?, config)?;
    if seed {
        session.seed_defaults()?;
    }
    Ok(session)
}

fn emit(data: &NetworkData, output: Option<PathBuf>) -> Result<(), EvidenceNetError> {
    match output {
        Some(out) => {
            data.write_path(&out)?;
            println!("Wrote {}", out.display());
        }
        None => println!("{}", data.to_json_string_pretty()?),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Report { path, seed } => {
            let session = load_session(&path, config, seed)?;
            println!("=== Nodes ===");
            println!("{NODE_HEADER}");
            for row in session.node_table() {
                println!("{row}");
            }
            println!("\n=== Edges ===");
            println!("{EDGE_HEADER}");
            for row in session.edge_table() {
                println!("{row}");
            }
        }

        Commands::Tables { path, seed } => {
            let session = load_session(&path, config, seed)?;
            if session.graph().is_empty() {
                println!("No nodes in the network.");
            }
            for component in session.truth_tables() {
                let members = component
                    .nodes
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                match component.outcome {
                    Ok(TableOutcome::NoHypotheses) => {}
                    Ok(TableOutcome::NoInputs { hypothesis, depth }) => {
                        println!("=== Component {} ({members}) ===", component.index);
                        println!("Deepest hypothesis {hypothesis} (depth {depth}) has no ancestors.\n");
                    }
                    Ok(TableOutcome::Table(table)) => {
                        println!("=== Component {} ({members}) ===", component.index);
                        println!(
                            "Deepest hypothesis: {} (depth {})",
                            table.hypothesis, table.depth
                        );
                        println!("{table}");
                    }
                    Err(e) => {
                        println!("=== Component {} ({members}) ===", component.index);
                        println!("Not computable: {e}\n");
                    }
                }
            }
        }

        Commands::Normalize { path, output } => {
            let session = load_session(&path, config, false)?;
            emit(&session.export(), output)?;
        }

        Commands::Extract { path, output } => {
            let extractor = config.extractor.clone().ok_or_else(|| {
                EvidenceNetError::Command(
                    "no [extractor] section in the configuration".to_string(),
                )
            })?;
            let narrative = read_to_string(&path)?;
            let mut session = Session::new(config);
            session.import_extracted(&extractor.generator(), &narrative)?;
            emit(&session.export(), output)?;
        }
    }

    Ok(())
}
