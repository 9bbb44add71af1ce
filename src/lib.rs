//! Sensor hub: a registry of named temperature and pressure instruments fed
//! from manual entry or text frames on a serial line, with a per-kind
//! analysis pass.

pub mod config;
pub mod console;
pub mod frame;
pub mod history;
pub mod registry;
pub mod sensor;
pub mod serial;

pub use config::{parse_config, Config};
pub use console::Console;
pub use registry::{RegistryError, SensorRegistry};
pub use sensor::{Sensor, SensorKind};
