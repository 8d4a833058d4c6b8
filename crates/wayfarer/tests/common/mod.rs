#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use geo::{LineString, Rect};
use wayfarer::{
    Collaborators, Coordinate, Error, PermissionState,
    services::{
        AddressSink, AlertPresenter, LocationService, MapDisplay, ReverseGeocoder, RouteProvider,
    },
    types::{GeocodeRequestId, LocationSubscription, Region, RouteHandle, RouteQuery, RouteRequestId},
};

#[derive(Debug, Default)]
pub struct LocationLog {
    pub services_enabled: bool,
    pub status: PermissionState,
    pub last_known: Option<Coordinate>,
    pub authorization_requests: usize,
    pub started: Vec<LocationSubscription>,
    pub stopped: Vec<LocationSubscription>,
}

#[derive(Clone, Default)]
pub struct FakeLocation(pub Rc<RefCell<LocationLog>>);

impl FakeLocation {
    pub fn enabled(status: PermissionState, last_known: Option<Coordinate>) -> Self {
        Self(Rc::new(RefCell::new(LocationLog {
            services_enabled: true,
            status,
            last_known,
            ..Default::default()
        })))
    }
}

impl LocationService for FakeLocation {
    fn services_enabled(&self) -> bool {
        self.0.borrow().services_enabled
    }

    fn authorization_status(&self) -> PermissionState {
        self.0.borrow().status
    }

    fn request_authorization(&mut self) {
        self.0.borrow_mut().authorization_requests += 1;
    }

    fn start_updates(&mut self) -> LocationSubscription {
        let mut log = self.0.borrow_mut();
        let subscription = LocationSubscription(log.started.len() as u64 + 1);
        log.started.push(subscription);
        subscription
    }

    fn stop_updates(&mut self, subscription: LocationSubscription) {
        self.0.borrow_mut().stopped.push(subscription);
    }

    fn last_known_location(&self) -> Option<Coordinate> {
        self.0.borrow().last_known
    }
}

#[derive(Debug, Default)]
pub struct MapLog {
    pub center: Coordinate,
    pub shows_user_location: bool,
    pub regions: Vec<Region>,
    pub visible_rects: Vec<Rect<f64>>,
    pub overlays: Vec<LineString<f64>>,
    pub overlays_added: usize,
    pub clears: usize,
}

#[derive(Clone, Default)]
pub struct FakeMap(pub Rc<RefCell<MapLog>>);

impl MapDisplay for FakeMap {
    fn center_coordinate(&self) -> Coordinate {
        self.0.borrow().center
    }

    fn set_shows_user_location(&mut self, shows: bool) {
        self.0.borrow_mut().shows_user_location = shows;
    }

    fn set_region(&mut self, region: Region) {
        self.0.borrow_mut().regions.push(region);
    }

    fn set_visible_rect(&mut self, rect: Rect<f64>) {
        self.0.borrow_mut().visible_rects.push(rect);
    }

    fn add_overlay(&mut self, polyline: &LineString<f64>) {
        let mut log = self.0.borrow_mut();
        log.overlays.push(polyline.clone());
        log.overlays_added += 1;
    }

    fn clear_overlays(&mut self) {
        let mut log = self.0.borrow_mut();
        log.overlays.clear();
        log.clears += 1;
    }
}

#[derive(Clone, Default)]
pub struct FakeGeocoder(pub Rc<RefCell<Vec<(GeocodeRequestId, Coordinate)>>>);

impl FakeGeocoder {
    pub fn calls(&self) -> Vec<(GeocodeRequestId, Coordinate)> {
        self.0.borrow().clone()
    }
}

impl ReverseGeocoder for FakeGeocoder {
    fn reverse_geocode(&mut self, id: GeocodeRequestId, coordinate: Coordinate) {
        self.0.borrow_mut().push((id, coordinate));
    }
}

#[derive(Debug, Default)]
pub struct RouterLog {
    pub requests: Vec<(RouteRequestId, RouteQuery, RouteHandle)>,
    pub cancelled: Vec<RouteHandle>,
}

#[derive(Clone, Default)]
pub struct FakeRouter(pub Rc<RefCell<RouterLog>>);

impl RouteProvider for FakeRouter {
    fn request_routes(&mut self, id: RouteRequestId, query: &RouteQuery) -> RouteHandle {
        let mut log = self.0.borrow_mut();
        let handle = RouteHandle(100 + log.requests.len() as u64);
        log.requests.push((id, *query, handle));
        handle
    }

    fn cancel(&mut self, handle: RouteHandle) {
        self.0.borrow_mut().cancelled.push(handle);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    Address(String),
    Failure(Error),
}

#[derive(Clone, Default)]
pub struct FakeAddressSink(pub Rc<RefCell<Vec<Published>>>);

impl FakeAddressSink {
    pub fn published(&self) -> Vec<Published> {
        self.0.borrow().clone()
    }
}

impl AddressSink for FakeAddressSink {
    fn address_resolved(&mut self, address: &str) {
        self.0.borrow_mut().push(Published::Address(address.to_owned()));
    }

    fn address_failed(&mut self, error: &Error) {
        self.0.borrow_mut().push(Published::Failure(error.clone()));
    }
}

#[derive(Clone, Default)]
pub struct FakeAlerts(pub Rc<RefCell<Vec<Error>>>);

impl FakeAlerts {
    pub fn presented(&self) -> Vec<Error> {
        self.0.borrow().clone()
    }
}

impl AlertPresenter for FakeAlerts {
    fn present(&mut self, error: &Error) {
        self.0.borrow_mut().push(error.clone());
    }
}

/// Shared handles onto every fake wired into a session.
#[derive(Clone, Default)]
pub struct Fakes {
    pub location: FakeLocation,
    pub map: FakeMap,
    pub geocoder: FakeGeocoder,
    pub router: FakeRouter,
    pub addresses: FakeAddressSink,
    pub alerts: FakeAlerts,
}

impl Fakes {
    pub fn new(status: PermissionState, last_known: Option<Coordinate>) -> Self {
        Self {
            location: FakeLocation::enabled(status, last_known),
            ..Default::default()
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            location: Box::new(self.location.clone()),
            map: Box::new(self.map.clone()),
            geocoder: Box::new(self.geocoder.clone()),
            router: Box::new(self.router.clone()),
            addresses: Box::new(self.addresses.clone()),
            alerts: Box::new(self.alerts.clone()),
        }
    }
}
