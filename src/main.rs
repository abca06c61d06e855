//! seedrank CLI - the batch command surface over the ranking pipeline.
//!
//! Subcommands map onto the two pipeline phases plus downstream export:
//! - `run-pipeline`: the expensive once-per-snapshot phase; writes the
//!   score table and the frozen state document
//! - `rank-issue`: cheap re-selection against a state document
//! - `export-audience`: expand a seed CSV into the follower audience
//! - `serve`: the same re-rank surface over HTTP
//!
//! Results print as JSON or CSV to stdout unless an output path is given,
//! so commands compose in shell pipelines.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seedrank::pipeline::{self, PipelineState};
use seedrank::{audience, ingest, AppConfig};

/// Rank social-graph accounts by issue relevance and select diverse seed
/// sets for audience expansion.
#[derive(Parser, Debug)]
#[command(name = "seedrank")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: graph analytics, tagging, scoring.
    ///
    /// Writes issue_scores.csv and state.json to the output directory.
    /// The state document makes later rank-issue calls cheap.
    RunPipeline {
        /// Path to the accounts CSV (columns: id, handle, ...)
        #[arg(long)]
        users: PathBuf,
        /// Path to the follow-edge CSV (columns: src_id, dst_id)
        #[arg(long)]
        edges: PathBuf,
        /// Path to the posts CSV (columns: id, author_id, text, ...)
        #[arg(long)]
        posts: PathBuf,
        /// Path to the issue taxonomy YAML
        #[arg(long)]
        taxonomy: PathBuf,
        /// Output directory
        #[arg(long, default_value = "./out")]
        out: PathBuf,
        /// Optional config TOML
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Re-rank one issue from a persisted state document.
    RankIssue {
        /// Issue key present in the state's issue list
        #[arg(long)]
        issue: String,
        /// Path to state.json from run-pipeline
        #[arg(long)]
        state: PathBuf,
        /// Number of seeds to select
        #[arg(long, default_value = "25")]
        top_k: usize,
        /// Enforce community-diverse selection
        #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
        diverse: bool,
        /// Optional CSV output path (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Expand a seed CSV into the audience of accounts following any seed.
    ExportAudience {
        /// CSV of seeds from rank-issue
        #[arg(long)]
        seeds: PathBuf,
        /// Path to the follow-edge CSV
        #[arg(long)]
        edges: PathBuf,
        /// Optional CSV output path (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Serve the re-rank API over HTTP.
    Serve {
        /// Path to state.json from run-pipeline
        #[arg(long)]
        state: PathBuf,
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::RunPipeline {
            users,
            edges,
            posts,
            taxonomy,
            out,
            config,
        } => {
            let cfg = AppConfig::load(config.as_deref())?;
            let output = pipeline::run_pipeline(&users, &edges, &posts, &taxonomy, &out, &cfg)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::RankIssue {
            issue,
            state,
            top_k,
            diverse,
            out,
        } => {
            let state = PipelineState::load(&state)?;
            let seeds = state.rank_issue(&issue, top_k, diverse)?;
            match out {
                Some(path) => {
                    pipeline::write_scores_csv(&path, &seeds)?;
                    println!("wrote {} seeds to {}", seeds.len(), path.display());
                }
                None => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    for row in &seeds {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                }
            }
        }

        Command::ExportAudience { seeds, edges, out } => {
            let seed_rows = pipeline::read_scores_csv(&seeds)?;
            let edge_rows = ingest::load_edges(&edges)?;
            let audience_ids = audience::build_audience(&seed_rows, &edge_rows);
            match out {
                Some(path) => {
                    write_audience_csv(&path, &audience_ids)?;
                    println!(
                        "wrote audience of {} to {}",
                        audience_ids.len(),
                        path.display()
                    );
                }
                None => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    writer.write_record(["audience_id"])?;
                    for id in &audience_ids {
                        writer.write_record([id])?;
                    }
                    writer.flush()?;
                }
            }
        }

        Command::Serve { state, addr } => {
            seedrank::server::serve(addr, state).await?;
        }
    }
    Ok(())
}

fn write_audience_csv(path: &PathBuf, audience_ids: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create audience file: {}", path.display()))?;
    writer.write_record(["audience_id"])?;
    for id in audience_ids {
        writer.write_record([id])?;
    }
    writer.flush().context("failed to flush audience file")?;
    Ok(())
}
