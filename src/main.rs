//! Run with:  `RUST_LOG=info sensorhub [port] [baud]`

use std::env;

use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sensorhub::console::BoxedSource;
use sensorhub::serial::SerialPort;
use sensorhub::{parse_config, Console};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logs go to stderr so they don't tangle with the menu on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("sensorhub v{} starting", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = env::args().collect();
    let config = parse_config(&args)?;

    let source = match SerialPort::open(&config.port, config.baud, config.read_timeout) {
        Ok(port) => Some(Box::new(port) as BoxedSource),
        Err(err) => {
            warn!(%err, "continuing without serial input");
            None
        }
    };

    let mut console = Console::new(&config, source);
    let mut stdout = std::io::stdout();
    console.run(BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    info!(sensors = console.registry().len(), "shutting down");
    Ok(())
}
