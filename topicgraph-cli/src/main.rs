// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Topicgraph CLI
//!
//! Runs the knowledge-graph pipeline over JSON files of extracted entities
//! and relationships.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use topicgraph_community::Algorithm;
use topicgraph_core::MetricCalculator;
use topicgraph_engine::{EngineConfig, GraphInput, TopicGraphEngine};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "topicgraph")]
#[command(about = "Topicgraph - entity/topic knowledge graph layout", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, cluster and lay out a graph; writes elements, communities and diagnostics
    Layout {
        /// Input JSON with nodes, edges and optional options
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export viewport half-size
        #[arg(long)]
        viewport: Option<f64>,

        /// Community detection algorithm
        #[arg(long)]
        algorithm: Option<Algorithm>,
    },

    /// Detect communities only
    Communities {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        algorithm: Option<Algorithm>,

        /// Roll communities up one level
        #[arg(long)]
        hierarchical: bool,
    },

    /// Bounded neighborhood of one node
    Neighborhood {
        #[arg(short, long)]
        input: PathBuf,

        /// Center node ID
        #[arg(long)]
        node: String,

        #[arg(long, default_value = "2")]
        depth: usize,

        /// Adjacency entries examined per expanded node
        #[arg(long, default_value = "50")]
        fanout: usize,
    },

    /// Graph statistics after building
    Stats {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn read_input(path: &Path) -> Result<GraphInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {:?}", path))?;
    GraphInput::from_json_str(&raw).with_context(|| format!("Invalid input file {:?}", path))
}

fn write_json(value: &serde_json::Value, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_filter = if cli.verbose {
        "topicgraph=debug"
    } else {
        "topicgraph=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = EngineConfig::load(cli.config.clone()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Layout {
            input,
            output,
            viewport,
            algorithm,
        } => {
            if let Some(v) = viewport {
                config.export.viewport = v;
            }
            if let Some(a) = algorithm {
                config.community.algorithm = a;
            }
            let input = read_input(&input)?;
            let result = TopicGraphEngine::new(config).run(&input)?;
            write_json(&serde_json::to_value(&result)?, output.as_deref())?;
        }

        Commands::Communities {
            input,
            algorithm,
            hierarchical,
        } => {
            if let Some(a) = algorithm {
                config.community.algorithm = a;
            }
            config.community.hierarchical |= hierarchical;
            let input = read_input(&input)?;
            let (_, result) = TopicGraphEngine::new(config).detect(&input)?;
            write_json(&serde_json::to_value(&result)?, None)?;
        }

        Commands::Neighborhood {
            input,
            node,
            depth,
            fanout,
        } => {
            let input = read_input(&input)?;
            let (graph, _) = TopicGraphEngine::new(config).build_graph(&input)?;
            let neighborhood = MetricCalculator::new().neighborhood(&graph, &node, depth, fanout)?;
            if neighborhood.truncated {
                tracing::info!("Fanout cap of {} hit; neighborhood is sampled", fanout);
            }
            write_json(&serde_json::to_value(&neighborhood)?, None)?;
        }

        Commands::Stats { input } => {
            let input = read_input(&input)?;
            let (graph, report) = TopicGraphEngine::new(config).build_graph(&input)?;
            let top = MetricCalculator::new().top_by_importance(&graph, 10);
            write_json(
                &serde_json::json!({
                    "stats": graph.stats(),
                    "build": report,
                    "topByImportance": top,
                }),
                None,
            )?;
        }
    }

    Ok(())
}
