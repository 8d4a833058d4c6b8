//! In-process stand-ins for the platform collaborators.
//!
//! Lookups complete on spawned tasks after a fixed latency and post their
//! results back through the session's event queue, like a platform SDK
//! delivering callbacks onto the main thread.

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use geo::{Coord, LineString, Rect};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::task::JoinHandle;
use wayfarer::{
    Coordinate, Error, Event, EventSender, PermissionState, Route,
    services::{
        AddressSink, AlertPresenter, LocationService, MapDisplay, ReverseGeocoder, RouteProvider,
    },
    types::{
        GeocodeRequestId, LocationSubscription, Region, RouteHandle, RouteQuery, RouteRequestId,
    },
};

use crate::scenario::KnownPlacemark;

/// Placemarks further away than this do not match a lookup.
const PLACEMARK_RADIUS_METERS: f64 = 100.0;

/// Everything the collaborators observed, printed after the replay.
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub addresses: Vec<String>,
    pub address_errors: Vec<String>,
    pub alerts: Vec<String>,
    pub geocode_requests: usize,
    pub route_requests: usize,
    pub cancelled_routes: usize,
    pub tracking: bool,
    /// Route overlays currently on the map, as `[longitude, latitude]` pairs.
    pub overlays: Vec<Vec<[f64; 2]>>,
    /// `[[min_lon, min_lat], [max_lon, max_lat]]` of the last fitted rect.
    pub visible_rect: Option<[[f64; 2]; 2]>,
    pub map_center: Option<Coordinate>,
}

pub type SharedSummary = Rc<RefCell<Summary>>;

pub struct SimulatedLocation {
    services_enabled: bool,
    status: PermissionState,
    last_known: Option<Coordinate>,
    next_subscription: u64,
    summary: SharedSummary,
}

impl SimulatedLocation {
    pub fn new(
        services_enabled: bool,
        status: PermissionState,
        last_known: Option<Coordinate>,
        summary: SharedSummary,
    ) -> Self {
        Self {
            services_enabled,
            status,
            last_known,
            next_subscription: 0,
            summary,
        }
    }
}

impl LocationService for SimulatedLocation {
    fn services_enabled(&self) -> bool {
        self.services_enabled
    }

    fn authorization_status(&self) -> PermissionState {
        self.status
    }

    fn request_authorization(&mut self) {
        info!("[location] Permission prompt shown");
    }

    fn start_updates(&mut self) -> LocationSubscription {
        self.next_subscription += 1;
        self.summary.borrow_mut().tracking = true;
        debug!("[location] Subscription {} started", self.next_subscription);
        LocationSubscription(self.next_subscription)
    }

    fn stop_updates(&mut self, subscription: LocationSubscription) {
        self.summary.borrow_mut().tracking = false;
        debug!("[location] Subscription {} stopped", subscription.0);
    }

    fn last_known_location(&self) -> Option<Coordinate> {
        self.last_known
    }
}

/// Moving the visible region reports a center change, as a real map view does.
pub struct SimulatedMap {
    center: Rc<RefCell<Coordinate>>,
    sender: EventSender,
    summary: SharedSummary,
}

impl SimulatedMap {
    pub fn new(
        center: Rc<RefCell<Coordinate>>,
        sender: EventSender,
        summary: SharedSummary,
    ) -> Self {
        Self {
            center,
            sender,
            summary,
        }
    }

    fn move_to(&mut self, center: Coordinate) {
        *self.center.borrow_mut() = center;
        self.summary.borrow_mut().map_center = Some(center);
        if let Err(err) = self.sender.try_send(Event::CenterChanged(center)) {
            warn!("[map] Dropped center change: {err}");
        }
    }
}

impl MapDisplay for SimulatedMap {
    fn center_coordinate(&self) -> Coordinate {
        *self.center.borrow()
    }

    fn set_shows_user_location(&mut self, shows: bool) {
        debug!("[map] User location marker visible: {shows}");
    }

    fn set_region(&mut self, region: Region) {
        info!(
            "[map] Region {:?} spanning {}m",
            region.center, region.span_meters
        );
        self.move_to(region.center);
    }

    fn set_visible_rect(&mut self, rect: Rect<f64>) {
        info!("[map] Fitting {:?}", rect);
        self.summary.borrow_mut().visible_rect =
            Some([[rect.min().x, rect.min().y], [rect.max().x, rect.max().y]]);
        self.move_to(Coordinate::from(rect.center()));
    }

    fn add_overlay(&mut self, polyline: &LineString<f64>) {
        self.summary
            .borrow_mut()
            .overlays
            .push(polyline.coords().map(|c| [c.x, c.y]).collect());
    }

    fn clear_overlays(&mut self) {
        self.summary.borrow_mut().overlays.clear();
    }
}

pub struct SimulatedGeocoder {
    placemarks: Vec<KnownPlacemark>,
    latency: Duration,
    sender: EventSender,
    summary: SharedSummary,
}

impl SimulatedGeocoder {
    pub fn new(
        placemarks: Vec<KnownPlacemark>,
        latency: Duration,
        sender: EventSender,
        summary: SharedSummary,
    ) -> Self {
        Self {
            placemarks,
            latency,
            sender,
            summary,
        }
    }

    fn lookup(&self, coordinate: &Coordinate) -> Result<Option<wayfarer::Placemark>, Error> {
        let nearest = self
            .placemarks
            .iter()
            .map(|known| (known.coordinate().distance_to(coordinate), known))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match nearest {
            Some((distance, known)) if distance <= PLACEMARK_RADIUS_METERS => {
                Ok(Some(known.placemark.clone()))
            }
            Some(_) => Ok(None),
            None => Err(Error::GeocodeFailed("no placemark data loaded".to_owned())),
        }
    }
}

impl ReverseGeocoder for SimulatedGeocoder {
    fn reverse_geocode(&mut self, id: GeocodeRequestId, coordinate: Coordinate) {
        self.summary.borrow_mut().geocode_requests += 1;
        let result = self.lookup(&coordinate);
        let sender = self.sender.clone();
        let latency = self.latency;

        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            if sender
                .send(Event::GeocodeResolved { id, result })
                .await
                .is_err()
            {
                debug!("[geocoder] Session gone before {:?} resolved", id);
            }
        });
    }
}

pub struct SimulatedRouter {
    latency: Duration,
    failure: Option<String>,
    sender: EventSender,
    next_handle: u64,
    tasks: HashMap<RouteHandle, JoinHandle<()>>,
    summary: SharedSummary,
}

impl SimulatedRouter {
    pub fn new(
        latency: Duration,
        failure: Option<String>,
        sender: EventSender,
        summary: SharedSummary,
    ) -> Self {
        Self {
            latency,
            failure,
            sender,
            next_handle: 0,
            tasks: HashMap::new(),
            summary,
        }
    }

    fn compute(&self, query: &RouteQuery) -> Result<Vec<Route>, Error> {
        if let Some(message) = &self.failure {
            return Err(Error::RouteComputationFailed(message.clone()));
        }

        let source = query.source.as_coord();
        let destination = query.destination.as_coord();
        let mut routes = vec![Route::new(
            "Direct",
            LineString::new(vec![source, destination]),
        )];

        if query.alternate_routes {
            let delta = destination - source;
            let detour = Coord {
                x: (source.x + destination.x) / 2.0 + delta.y * 0.25,
                y: (source.y + destination.y) / 2.0 - delta.x * 0.25,
            };
            routes.push(Route::new(
                "Detour",
                LineString::new(vec![source, detour, destination]),
            ));
        }

        Ok(routes)
    }
}

impl RouteProvider for SimulatedRouter {
    fn request_routes(&mut self, id: RouteRequestId, query: &RouteQuery) -> RouteHandle {
        self.tasks.retain(|_, task| !task.is_finished());
        self.summary.borrow_mut().route_requests += 1;

        let result = self.compute(query);
        let sender = self.sender.clone();
        let latency = self.latency;
        let task = tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            if sender
                .send(Event::RouteResolved { id, result })
                .await
                .is_err()
            {
                debug!("[router] Session gone before {:?} resolved", id);
            }
        });

        self.next_handle += 1;
        let handle = RouteHandle(self.next_handle);
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: RouteHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            self.summary.borrow_mut().cancelled_routes += 1;
            debug!("[router] Aborted computation {:?}", handle);
        }
    }
}

/// Address label and alert UI.
pub struct Console {
    summary: SharedSummary,
}

impl Console {
    pub fn new(summary: SharedSummary) -> Self {
        Self { summary }
    }
}

impl AddressSink for Console {
    fn address_resolved(&mut self, address: &str) {
        info!("[address] '{address}'");
        self.summary.borrow_mut().addresses.push(address.to_owned());
    }

    fn address_failed(&mut self, error: &Error) {
        warn!("[address] {error}");
        self.summary
            .borrow_mut()
            .address_errors
            .push(error.to_string());
    }
}

impl AlertPresenter for Console {
    fn present(&mut self, error: &Error) {
        warn!("[alert] {error}");
        self.summary.borrow_mut().alerts.push(error.to_string());
    }
}
