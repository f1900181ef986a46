//! vegahcd — the Vega health-check daemon.
//!
//! Probes a Vega core node, and optionally a data node and block explorer,
//! on a fixed interval and serves the latest verdict on `GET /`.
//!
//! # Usage
//!
//! ```text
//! vegahcd vega --core-url http://localhost:3003
//! vegahcd data-node --core-url http://localhost:3003 --api-url http://localhost:3008
//! vegahcd blockexplorer --blockexplorer-api-url http://localhost:1515 --config vegahc.toml
//! ```

mod commands;
mod config;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Service;
use crate::config::{
    parse_duration_arg, resolve_url, FileConfig, Overrides, Settings, DEFAULT_CORE_URL,
    DEFAULT_DATA_NODE_URL, DEFAULT_EXPLORER_URL,
};

#[derive(Parser, Debug)]
#[command(name = "vegahcd", about = "Health check service for vega", version)]
struct Cli {
    /// TOML config file. Flags override values from the file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
struct CommonArgs {
    /// Port serving the health verdict [default: 8080].
    #[arg(long)]
    http_port: Option<u16>,

    /// Time between check cycles, e.g. "30s" [default: 30s].
    #[arg(long, value_parser = parse_duration_arg)]
    check_interval: Option<Duration>,

    /// Minimum time between block height samples [default: 30s].
    #[arg(long, value_parser = parse_duration_arg)]
    block_increase_period: Option<Duration>,

    /// Sample block height twice per cycle, sleeping for the block increase period in between.
    #[arg(long, overrides_with = "no_blocking_block_check")]
    blocking_block_check: bool,

    /// Use the stateful block check even if the config file enables the blocking one.
    #[arg(long, overrides_with = "blocking_block_check")]
    no_blocking_block_check: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monitor a vega core node.
    Vega {
        #[command(flatten)]
        common: CommonArgs,

        /// Core REST endpoint [default: http://localhost:3003].
        #[arg(long)]
        core_url: Option<String>,
    },

    /// Monitor a data node and the core node it follows.
    DataNode {
        #[command(flatten)]
        common: CommonArgs,

        /// Core REST endpoint [default: http://localhost:3003].
        #[arg(long)]
        core_url: Option<String>,

        /// Data node REST endpoint [default: http://localhost:3008].
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Monitor a block explorer and the core node it indexes.
    #[command(name = "blockexplorer")]
    BlockExplorer {
        #[command(flatten)]
        common: CommonArgs,

        /// Block explorer REST endpoint [default: http://localhost:1515].
        #[arg(long)]
        blockexplorer_api_url: Option<String>,

        /// Core REST endpoint [default: http://localhost:3003].
        #[arg(long)]
        core_url: Option<String>,

        /// Data node REST endpoint; enables the data node checks when set.
        #[arg(long)]
        data_node_api_url: Option<String>,
    },
}

impl CommonArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            port: self.http_port,
            check_interval: self.check_interval,
            block_increase_period: self.block_increase_period,
            blocking_block_check: match (self.blocking_block_check, self.no_blocking_block_check) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}

impl Command {
    fn common(&self) -> &CommonArgs {
        match self {
            Command::Vega { common, .. }
            | Command::DataNode { common, .. }
            | Command::BlockExplorer { common, .. } => common,
        }
    }

    /// Resolve endpoints against the config file and defaults.
    fn service(&self, file: &FileConfig) -> Service {
        let targets = &file.targets;
        let core = |flag: &Option<String>| {
            resolve_url(flag.as_deref(), targets.core_url.as_deref(), DEFAULT_CORE_URL)
        };

        match self {
            Command::Vega { core_url, .. } => Service::Vega {
                core_url: core(core_url),
            },
            Command::DataNode {
                core_url, api_url, ..
            } => Service::DataNode {
                core_url: core(core_url),
                data_node_url: resolve_url(
                    api_url.as_deref(),
                    targets.data_node_url.as_deref(),
                    DEFAULT_DATA_NODE_URL,
                ),
            },
            Command::BlockExplorer {
                blockexplorer_api_url,
                core_url,
                data_node_api_url,
                ..
            } => Service::BlockExplorer {
                core_url: core(core_url),
                explorer_url: resolve_url(
                    blockexplorer_api_url.as_deref(),
                    targets.explorer_url.as_deref(),
                    DEFAULT_EXPLORER_URL,
                ),
                data_node_url: data_node_api_url
                    .clone()
                    .or_else(|| targets.data_node_url.clone()),
            },
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vegahcd=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let file = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&file, &cli.command.common().overrides())?;
    let service = cli.command.service(&file);

    commands::run(service, settings).await
}
