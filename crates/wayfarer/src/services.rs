//! Traits for everything outside the controllers: the platform location
//! feed, the map display, the lookup providers and the output sinks.
//!
//! Providers with asynchronous completions do not return results. They post
//! an [`Event`](crate::events::Event) back onto the session's event queue,
//! tagged with the identifier they were handed.

use geo::{LineString, Rect};

use crate::{
    error::Error,
    types::{
        Coordinate, GeocodeRequestId, LocationSubscription, PermissionState, Region,
        RouteHandle, RouteQuery, RouteRequestId,
    },
};

pub trait LocationService {
    /// Whether location services are enabled device-wide.
    fn services_enabled(&self) -> bool;

    fn authorization_status(&self) -> PermissionState;

    /// Ask the user for foreground location permission. The answer arrives
    /// as an authorization-changed event.
    fn request_authorization(&mut self);

    fn start_updates(&mut self) -> LocationSubscription;

    fn stop_updates(&mut self, subscription: LocationSubscription);

    fn last_known_location(&self) -> Option<Coordinate>;
}

pub trait MapDisplay {
    fn center_coordinate(&self) -> Coordinate;

    fn set_shows_user_location(&mut self, shows: bool);

    fn set_region(&mut self, region: Region);

    fn set_visible_rect(&mut self, rect: Rect<f64>);

    fn add_overlay(&mut self, polyline: &LineString<f64>);

    fn clear_overlays(&mut self);
}

pub trait ReverseGeocoder {
    /// Start resolving `coordinate`. The service offers no cancellation.
    fn reverse_geocode(&mut self, id: GeocodeRequestId, coordinate: Coordinate);
}

pub trait RouteProvider {
    fn request_routes(&mut self, id: RouteRequestId, query: &RouteQuery) -> RouteHandle;

    /// Best effort. A completion may still be delivered afterwards.
    fn cancel(&mut self, handle: RouteHandle);
}

pub trait AddressSink {
    fn address_resolved(&mut self, address: &str);

    fn address_failed(&mut self, error: &Error);
}

/// Error-alert UI.
pub trait AlertPresenter {
    fn present(&mut self, error: &Error);
}
