use log::warn;

use crate::{
    config::SessionConfig,
    error::Result,
    gate::LocationAuthorizationGate,
    geocode::GeocodeThrottleController,
    route::RouteRequestController,
    services::{
        AddressSink, AlertPresenter, LocationService, MapDisplay, ReverseGeocoder, RouteProvider,
    },
    types::{Coordinate, GeocodeRequestId, PermissionState, Placemark, Route, RouteRequestId},
};

pub struct Collaborators {
    pub location: Box<dyn LocationService>,
    pub map: Box<dyn MapDisplay>,
    pub geocoder: Box<dyn ReverseGeocoder>,
    pub router: Box<dyn RouteProvider>,
    pub addresses: Box<dyn AddressSink>,
    pub alerts: Box<dyn AlertPresenter>,
}

/// The map screen: the three controllers plus the collaborators they drive.
pub struct MapSession {
    gate: LocationAuthorizationGate,
    geocode: GeocodeThrottleController,
    routes: RouteRequestController,
    services: Collaborators,
}

impl MapSession {
    pub fn new(config: SessionConfig, services: Collaborators) -> Self {
        Self {
            gate: LocationAuthorizationGate::new(config.region_span_meters),
            geocode: GeocodeThrottleController::new(config.min_displacement_meters),
            routes: RouteRequestController::new(config.transport, config.alternate_routes),
            services,
        }
    }

    pub fn start(&mut self) {
        self.gate.start(
            self.services.location.as_mut(),
            self.services.map.as_mut(),
            self.services.alerts.as_mut(),
        );
    }

    pub fn authorization_changed(&mut self, state: PermissionState) {
        self.gate.on_authorization_changed(
            state,
            self.services.location.as_mut(),
            self.services.map.as_mut(),
            self.services.alerts.as_mut(),
        );
    }

    pub fn location_updated(&mut self, fix: Coordinate) {
        self.gate.on_location_update(fix);
    }

    pub fn center_changed(&mut self, center: Coordinate) -> Option<GeocodeRequestId> {
        self.geocode
            .on_center_changed(center, self.services.geocoder.as_mut())
    }

    pub fn geocode_resolved(
        &mut self,
        id: GeocodeRequestId,
        result: Result<Option<Placemark>>,
    ) -> bool {
        self.geocode
            .on_geocode_result(id, result, self.services.addresses.as_mut())
    }

    /// Request directions from the latest fix to the current map center.
    pub fn go(&mut self) -> Result<RouteRequestId> {
        let destination = self.services.map.center_coordinate();
        self.routes
            .on_go_triggered(
                self.gate.current_location(),
                destination,
                self.services.router.as_mut(),
                self.services.map.as_mut(),
            )
            .inspect_err(|err| {
                warn!("Go rejected: {}", err);
                self.services.alerts.present(err);
            })
    }

    pub fn route_resolved(&mut self, id: RouteRequestId, result: Result<Vec<Route>>) -> bool {
        self.routes.on_route_result(
            id,
            result,
            self.services.map.as_mut(),
            self.services.alerts.as_mut(),
        )
    }

    pub fn gate(&self) -> &LocationAuthorizationGate {
        &self.gate
    }

    pub fn geocode(&self) -> &GeocodeThrottleController {
        &self.geocode
    }

    pub fn routes(&self) -> &RouteRequestController {
        &self.routes
    }
}
