use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use serde::Deserialize;
use wayfarer::{Coordinate, PermissionState, Placemark, SessionConfig};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default = "enabled")]
    pub services_enabled: bool,
    #[serde(default)]
    pub initial_authorization: PermissionState,
    #[serde(default)]
    pub last_known_location: Option<Coordinate>,
    #[serde(default)]
    pub map_center: Coordinate,
    #[serde(default)]
    pub placemarks: Vec<KnownPlacemark>,
    #[serde(default = "default_latency")]
    pub geocode_latency_ms: u64,
    #[serde(default = "default_latency")]
    pub route_latency_ms: u64,
    /// Make every route computation fail with this message.
    #[serde(default)]
    pub route_failure: Option<String>,
    pub steps: Vec<Step>,
}

fn enabled() -> bool {
    true
}

fn default_latency() -> u64 {
    200
}

#[derive(Clone, Debug, Deserialize)]
pub struct KnownPlacemark {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub placemark: Placemark,
}

impl KnownPlacemark {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    /// Delay after the previous step.
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Action {
    Authorization { state: PermissionState },
    Location { latitude: f64, longitude: f64 },
    Center { latitude: f64, longitude: f64 },
    Go,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
        let scenario = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse scenario '{}'", path.display()))?;
        Ok(scenario)
    }

    pub fn from_reader(reader: impl std::io::Read) -> anyhow::Result<Self> {
        let scenario: Scenario = serde_json::from_reader(reader)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// Longest time any simulated lookup can take.
    pub fn max_latency_ms(&self) -> u64 {
        self.geocode_latency_ms.max(self.route_latency_ms)
    }
}
