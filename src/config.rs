#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 115_200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid baud rate {0:?}")]
    BadBaud(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: PathBuf,
    pub baud: u32,
    /// How long one serial read may block before reporting a timeout.
    pub read_timeout: Duration,
    /// Pause before reading, while the board resets after the port opens.
    pub settle_delay: Duration,
    /// Continuous monitoring runs a processing pass every this many frames.
    pub process_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: PathBuf::from(DEFAULT_PORT),
            baud: DEFAULT_BAUD,
            read_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            process_every: 5,
        }
    }
}

// usage: sensorhub [port] [baud]
// args[0] is the command name; anything after the baud is ignored
pub fn parse_config(args: &[String]) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(port) = args.get(1) {
        config.port = PathBuf::from(port);
    }
    if let Some(baud) = args.get(2) {
        config.baud = match baud.parse::<u32>() {
            Ok(b) if b > 0 => b,
            _ => return Err(ConfigError::BadBaud(baud.clone())),
        };
    }

    Ok(config)
}
