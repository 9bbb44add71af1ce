#[cfg(test)]
mod tests;

/***
 * Sensor
 *
 *  A named instrument of a fixed kind. Each kind owns a history of its own
 *  numeric type and decides how that history is analysed:
 *      - pressure (i32) reports the plain mean; processing leaves the
 *        history untouched
 *      - temperature (f32) drops the single lowest reading before taking
 *        the mean, to suppress one anomalous low outlier, so every pass
 *        consumes a reading
 *
 *  Reading text that isn't a number is recorded as zero.
 */
use std::fmt;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::history::{ReadingHistory, Sample};
use crate::registry::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Pressure,
}

impl SensorKind {
    /// Maps a frame/menu kind tag (`T` or `P`) to a kind.
    pub fn from_tag(tag: char) -> Result<Self, RegistryError> {
        match tag {
            'T' => Ok(SensorKind::Temperature),
            'P' => Ok(SensorKind::Pressure),
            _ => Err(RegistryError::UnknownKind(tag.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Pressure => "pressure",
        }
    }
}

/// A single reading value, tagged by the history it went into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Temperature(f32),
    Pressure(i32),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temperature(v) => write!(f, "{v:.1}"),
            Value::Pressure(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Readings {
    Temperature(ReadingHistory<f32>),
    Pressure(ReadingHistory<i32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NoReadings,
    Mean { value: Value, samples: usize },
}

/// Summary of one processing pass over a sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub name: String,
    pub kind: SensorKind,
    pub outcome: Outcome,
}

impl Analysis {
    pub fn mean(&self) -> Option<Value> {
        match self.outcome {
            Outcome::Mean { value, .. } => Some(value),
            Outcome::NoReadings => None,
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, kind) = (&self.name, self.kind.label());
        writeln!(f, "-> Processing sensor {name} ({kind})")?;

        let Outcome::Mean { value, samples } = &self.outcome else {
            return write!(f, "   No readings.");
        };
        let label = match self.kind {
            SensorKind::Temperature => "Mean after dropping the lowest reading",
            SensorKind::Pressure => "Mean of readings",
        };
        write!(f, "   {label}: {value} ({samples} readings)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    name: String,
    readings: Readings,
    last_update: Option<DateTime<Local>>,
}

impl Sensor {
    pub fn new(kind: SensorKind, name: impl Into<String>) -> Self {
        let readings = match kind {
            SensorKind::Temperature => Readings::Temperature(ReadingHistory::new()),
            SensorKind::Pressure => Readings::Pressure(ReadingHistory::new()),
        };
        Self {
            name: name.into(),
            readings,
            last_update: None,
        }
    }

    pub fn temperature(name: impl Into<String>) -> Self {
        Self::new(SensorKind::Temperature, name)
    }

    pub fn pressure(name: impl Into<String>) -> Self {
        Self::new(SensorKind::Pressure, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SensorKind {
        match self.readings {
            Readings::Temperature(_) => SensorKind::Temperature,
            Readings::Pressure(_) => SensorKind::Pressure,
        }
    }

    pub fn reading_count(&self) -> usize {
        match &self.readings {
            Readings::Temperature(h) => h.len(),
            Readings::Pressure(h) => h.len(),
        }
    }

    /// Parses `raw` as this sensor's numeric type and appends it. Never
    /// fails: malformed text is recorded as zero.
    pub fn ingest_text(&mut self, raw: &str) -> Value {
        let value = match &mut self.readings {
            Readings::Temperature(h) => Value::Temperature(append_lenient(&self.name, h, raw)),
            Readings::Pressure(h) => Value::Pressure(append_lenient(&self.name, h, raw)),
        };
        self.last_update = Some(Local::now());
        info!(sensor = %self.name, %value, "reading recorded");
        value
    }

    pub fn process(&mut self) -> Analysis {
        let outcome = match &mut self.readings {
            Readings::Temperature(h) if !h.is_empty() => {
                if let Some(dropped) = h.remove_smallest() {
                    debug!(sensor = %self.name, dropped, "lowest reading discarded");
                }
                Outcome::Mean {
                    value: Value::Temperature(h.mean()),
                    samples: h.len(),
                }
            }
            Readings::Pressure(h) if !h.is_empty() => Outcome::Mean {
                value: Value::Pressure(h.mean()),
                samples: h.len(),
            },
            _ => Outcome::NoReadings,
        };

        let analysis = Analysis {
            name: self.name.clone(),
            kind: self.kind(),
            outcome,
        };
        match analysis.mean() {
            Some(mean) => info!(sensor = %self.name, %mean, "processed"),
            None => info!(sensor = %self.name, "processed, no readings"),
        }
        analysis
    }

    pub fn describe(&self) -> String {
        let tag = match self.kind() {
            SensorKind::Temperature => "TemperatureSensor",
            SensorKind::Pressure => "PressureSensor",
        };
        let mut line = format!("[{tag}] ID={} readings={}", self.name, self.reading_count());
        if let Some(at) = self.last_update {
            line.push_str(&format!(" last={}", at.format("%d %b %H:%M")));
        }
        line
    }
}

fn append_lenient<T: Sample>(name: &str, history: &mut ReadingHistory<T>, raw: &str) -> T {
    let value = T::parse_strict(raw).unwrap_or_else(|err| {
        warn!(sensor = %name, %err, "recording zero");
        T::default()
    });
    history.append(value);
    value
}
