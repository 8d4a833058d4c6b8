use thiserror::Error;

use crate::types::PermissionState;

#[derive(Clone, PartialEq, Debug, Error)]
pub enum Error {
    #[error("location services are disabled on this device")]
    LocationServicesDisabled,
    #[error("location permission is {0}")]
    PermissionDenied(PermissionState),
    #[error("reverse geocoding failed: {0}")]
    GeocodeFailed(String),
    #[error("route computation failed: {0}")]
    RouteComputationFailed(String),
    #[error("no location fix available yet")]
    NoLocationAvailable,
    #[error("event channel closed")]
    ChannelClosed,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether a later event can succeed without the user acting outside the app.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::GeocodeFailed(_) | Self::RouteComputationFailed(_) | Self::NoLocationAvailable
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
