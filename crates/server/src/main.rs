use anyhow::Context as _;
use bitrise_mcp::config::{Config, LogFormat, Mode};
use bitrise_mcp::server::BitriseServer;
use bitrise_mcp::transport;
use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    config.validate().context("invalid configuration")?;
    let server = BitriseServer::from_config(&config).context("build tool catalog")?;

    tracing::info!(
        api_base_url = %config.api_base_url,
        mode = ?config.mode(),
        "starting bitrise-mcp"
    );

    match config.mode() {
        Mode::Stdio => transport::serve_stdio(server)
            .await
            .context("stdio transport")?,
        Mode::Http(addr) => transport::serve_http(addr, server, transport::shutdown_signal())
            .await
            .context("http transport")?,
    }
    Ok(())
}

/// Logs go to stderr: stdout carries the stdio transport.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
