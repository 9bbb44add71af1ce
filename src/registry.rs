
/***
 * SensorRegistry
 *
 *  Owns every sensor, in the order they were registered. Names are unique:
 *  a second insert under an existing name is rejected, so lookup by name
 *  is unambiguous.
 *
 *  Sensors are created either explicitly (menu) or on the first frame
 *  seen for an unknown id, and live until the process exits.
 */
use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::frame::Frame;
use crate::sensor::{Analysis, Sensor, SensorKind, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown sensor kind {0:?}")]
    UnknownKind(String),

    #[error("sensor {0:?} is already registered")]
    DuplicateName(String),

    #[error("sensor name must not be empty")]
    EmptyName,

    #[error("sensor {0:?} not found")]
    NotFound(String),
}

/// Result of routing one frame into the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub sensor: String,
    pub created: bool,
    pub value: Value,
}

/// Output of `describe_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Empty,
    Entries(Vec<String>),
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::Empty => write!(f, "Registry is empty."),
            Listing::Entries(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}

#[derive(Debug, Default)]
pub struct SensorRegistry {
    sensors: Vec<Sensor>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn insert(&mut self, sensor: Sensor) -> Result<&mut Sensor, RegistryError> {
        if sensor.name().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.position(sensor.name()).is_some() {
            return Err(RegistryError::DuplicateName(sensor.name().to_owned()));
        }

        let idx = self.sensors.len();
        self.sensors.push(sensor);
        Ok(&mut self.sensors[idx])
    }

    /// Builds a sensor of the kind named by `tag` and registers it.
    pub fn create(&mut self, tag: char, name: &str) -> Result<&mut Sensor, RegistryError> {
        let kind = SensorKind::from_tag(tag)?;
        let sensor = self.insert(Sensor::new(kind, name))?;
        info!(sensor = %name, kind = kind.label(), "sensor created");
        Ok(sensor)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.name() == name)
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Sensor> {
        self.sensors.iter_mut().find(|s| s.name() == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sensors.iter().position(|s| s.name() == name)
    }

    /// Records a reading for an existing sensor.
    pub fn record(&mut self, name: &str, raw: &str) -> Result<Value, RegistryError> {
        self.find_by_name_mut(name)
            .map(|s| s.ingest_text(raw))
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    /// Records the frame's value, creating the sensor from the frame's kind
    /// tag when the id hasn't been seen before. An existing sensor keeps its
    /// kind whatever the tag says.
    pub fn ingest_frame(&mut self, frame: &Frame) -> Result<Ingested, RegistryError> {
        let (idx, created) = match self.position(&frame.id) {
            Some(idx) => (idx, false),
            None => {
                info!(sensor = %frame.id, "unknown sensor, creating");
                let tag = frame.tag.ok_or_else(|| {
                    warn!(sensor = %frame.id, "frame carries no kind tag");
                    RegistryError::UnknownKind(String::new())
                })?;
                self.create(tag, &frame.id)?;
                (self.sensors.len() - 1, true)
            }
        };

        let sensor = &mut self.sensors[idx];
        let value = sensor.ingest_text(&frame.value);
        Ok(Ingested {
            sensor: sensor.name().to_owned(),
            created,
            value,
        })
    }

    pub fn process_all(&mut self) -> Vec<Analysis> {
        self.sensors.iter_mut().map(Sensor::process).collect()
    }

    pub fn describe_all(&self) -> Listing {
        if self.sensors.is_empty() {
            return Listing::Empty;
        }
        Listing::Entries(self.sensors.iter().map(Sensor::describe).collect())
    }
}
