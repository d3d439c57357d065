//! subnet-cli: create subnets, add validators and launch blockchains on
//! the platform chain.

mod commands;
mod wizard;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use subnet_client::ClientConfig;
use subnet_confirmation::{CancelController, PollContext};
use subnet_utils::LogFormat;

use crate::commands::{Command, Dispatch};

#[derive(Parser)]
#[command(name = "subnet-cli", about = "Subnet management for the platform chain")]
struct Cli {
    /// Node base URI, e.g. "http://127.0.0.1:9650".
    /// When a config file is provided, defaults to the file's value.
    #[arg(long, env = "SUBNET_CLI_URI")]
    uri: Option<String>,

    /// Private key file (hex or "PrivateKey-" form).
    #[arg(long, default_value = ".subnet-cli.pk", env = "SUBNET_CLI_PRIVATE_KEY_PATH")]
    private_key_path: PathBuf,

    /// Interval between status checks, in milliseconds.
    #[arg(long, env = "SUBNET_CLI_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Timeout for each RPC request, in milliseconds.
    #[arg(long, env = "SUBNET_CLI_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Stop waiting for confirmation after this many seconds.
    #[arg(long, env = "SUBNET_CLI_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "SUBNET_CLI_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "SUBNET_CLI_LOG_FORMAT")]
    log_format: LogFormat,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let config = ClientConfig::from_toml_file(path)?;
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            None => ClientConfig::default(),
        };
        if let Some(uri) = &self.uri {
            config.uri = uri.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    subnet_utils::init_tracing(&cli.log_level, cli.log_format)?;

    // Local commands ignore node settings, so a config error only matters
    // once a node is needed.
    let config = cli.client_config();
    let command = match cli.command.dispatch()? {
        Dispatch::Local(local) => return commands::run_local(local, &cli.private_key_path),
        Dispatch::Node(command) => command,
    };
    let config = config?;

    let cancel = Arc::new(CancelController::new());
    let mut ctx = PollContext::new().with_cancel(cancel.token());
    if let Some(secs) = cli.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    tokio::spawn({
        let cancel = cancel.clone();
        async move { cancel.cancel_on_ctrl_c().await }
    });

    let session = commands::Session::open(&config, &cli.private_key_path, ctx).await?;
    session.run(command).await
}
