//! Location-aware map screen logic: permission gating of the live location
//! feed, distance-throttled reverse geocoding of the map center, and driving
//! directions with stale-request cancellation.

pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod geocode;
pub mod route;
pub mod services;
pub mod session;
pub mod types;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use events::{Event, EventHandler, EventSender};
pub use session::{Collaborators, MapSession};
pub use types::{Coordinate, PermissionState, Placemark, Route};
