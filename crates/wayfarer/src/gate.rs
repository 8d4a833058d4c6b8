use log::{debug, info, warn};
use tracing::instrument;

use crate::{
    error::Error,
    services::{AlertPresenter, LocationService, MapDisplay},
    types::{Coordinate, LocationSubscription, PermissionState, Region},
};

/// Owns the location-permission state machine and the live location feed.
#[derive(Debug)]
pub struct LocationAuthorizationGate {
    state: Option<PermissionState>,
    subscription: Option<LocationSubscription>,
    latest_fix: Option<Coordinate>,
    permission_requested: bool,
    region_span_meters: f64,
}

impl LocationAuthorizationGate {
    pub fn new(region_span_meters: f64) -> Self {
        Self {
            state: None,
            subscription: None,
            latest_fix: None,
            permission_requested: false,
            region_span_meters,
        }
    }

    /// Check that location services are available at all, then evaluate the
    /// current authorization status.
    pub fn start(
        &mut self,
        location: &mut dyn LocationService,
        map: &mut dyn MapDisplay,
        alerts: &mut dyn AlertPresenter,
    ) {
        if !location.services_enabled() {
            warn!("Location services are disabled");
            alerts.present(&Error::LocationServicesDisabled);
            return;
        }

        let status = location.authorization_status();
        self.on_authorization_changed(status, location, map, alerts);
    }

    #[instrument(skip(self, location, map, alerts))]
    pub fn on_authorization_changed(
        &mut self,
        state: PermissionState,
        location: &mut dyn LocationService,
        map: &mut dyn MapDisplay,
        alerts: &mut dyn AlertPresenter,
    ) {
        let previous = self.state.replace(state);
        let transitioned = previous != Some(state);
        if transitioned {
            info!("Location permission {:?} -> {}", previous, state);
        }

        match state {
            PermissionState::AuthorizedForeground | PermissionState::AuthorizedAlways => {
                self.permission_requested = false;
                if !self.is_tracking() {
                    self.start_tracking(location, map);
                }
            }
            PermissionState::Undetermined => {
                self.stop_tracking(location, map);
                // Once per transition into Undetermined.
                if !self.permission_requested {
                    debug!("Requesting location permission");
                    location.request_authorization();
                    self.permission_requested = true;
                }
            }
            PermissionState::Denied | PermissionState::Restricted => {
                self.permission_requested = false;
                self.stop_tracking(location, map);
                if transitioned {
                    alerts.present(&Error::PermissionDenied(state));
                }
            }
        }
    }

    /// Record a fix from the live feed. Fixes arriving while not tracking are dropped.
    pub fn on_location_update(&mut self, fix: Coordinate) {
        if !self.is_tracking() {
            debug!("Ignoring location fix {:?} while not tracking", fix);
            return;
        }
        self.latest_fix = Some(fix);
    }

    /// Most recent fix delivered by the live feed since tracking started.
    pub fn current_location(&self) -> Option<Coordinate> {
        self.latest_fix
    }

    pub fn permission_state(&self) -> Option<PermissionState> {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.subscription.is_some()
    }

    fn start_tracking(&mut self, location: &mut dyn LocationService, map: &mut dyn MapDisplay) {
        map.set_shows_user_location(true);

        // The platform's cached location only positions the map. Routing
        // waits for a fix from the live feed.
        if let Some(center) = location.last_known_location() {
            map.set_region(Region::new(center, self.region_span_meters));
        }

        self.subscription = Some(location.start_updates());
        info!("Started tracking user location");
    }

    fn stop_tracking(&mut self, location: &mut dyn LocationService, map: &mut dyn MapDisplay) {
        if let Some(subscription) = self.subscription.take() {
            location.stop_updates(subscription);
            map.set_shows_user_location(false);
            self.latest_fix = None;
            info!("Stopped tracking user location");
        }
    }
}
