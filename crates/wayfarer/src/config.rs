use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::TransportMode,
};

/// Minimum map-center displacement before a new reverse-geocode is issued.
pub const DEFAULT_MIN_DISPLACEMENT_METERS: f64 = 50.0;
pub const DEFAULT_REGION_SPAN_METERS: f64 = 10_000.0;

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub min_displacement_meters: f64,
    /// Side length of the region shown when centering on the user.
    pub region_span_meters: f64,
    pub transport: TransportMode,
    pub alternate_routes: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_displacement_meters: DEFAULT_MIN_DISPLACEMENT_METERS,
            region_span_meters: DEFAULT_REGION_SPAN_METERS,
            transport: TransportMode::Automobile,
            alternate_routes: true,
        }
    }
}

impl SessionConfig {
    /// Distances must be finite and non-negative. A NaN threshold would let
    /// every center change through.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_displacement_meters", self.min_displacement_meters),
            ("region_span_meters", self.region_span_meters),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite, non-negative distance, got {value}"
                )));
            }
        }
        Ok(())
    }
}
