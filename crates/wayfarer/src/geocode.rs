use log::{debug, info, trace, warn};
use tracing::instrument;

use crate::{
    error::Error,
    services::{AddressSink, ReverseGeocoder},
    types::{Coordinate, GeocodeRequestId, Placemark},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GeocodeState {
    Pending,
    Completed,
    Superseded,
    Failed,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GeocodeRequest {
    pub id: GeocodeRequestId,
    pub coordinate: Coordinate,
    pub state: GeocodeState,
}

/// Turns map-center changes into reverse-geocode lookups, at most one acted
/// upon at a time.
///
/// Events closer than `min_displacement_meters` to the last accepted center
/// are dropped. Results are matched by sequence number; anything but the
/// latest issued request is stale and never reaches the sink.
#[derive(Debug)]
pub struct GeocodeThrottleController {
    min_displacement_meters: f64,
    last_known_center: Option<Coordinate>,
    next_sequence: u64,
    latest: Option<GeocodeRequest>,
    issued: usize,
}

impl GeocodeThrottleController {
    pub fn new(min_displacement_meters: f64) -> Self {
        Self {
            min_displacement_meters,
            last_known_center: None,
            next_sequence: 0,
            latest: None,
            issued: 0,
        }
    }

    /// Returns the id of the issued request, or `None` if the event was throttled.
    #[instrument(skip(self, geocoder))]
    pub fn on_center_changed(
        &mut self,
        new_center: Coordinate,
        geocoder: &mut dyn ReverseGeocoder,
    ) -> Option<GeocodeRequestId> {
        if let Some(last) = self.last_known_center {
            let distance = new_center.distance_to(&last);
            if distance <= self.min_displacement_meters {
                trace!("Center moved {distance:.1}m, below threshold");
                return None;
            }
        }

        if let Some(request) = self.latest.as_mut().filter(|r| r.state == GeocodeState::Pending) {
            request.state = GeocodeState::Superseded;
            debug!("Superseded geocode request {:?}", request.id);
        }

        self.last_known_center = Some(new_center);
        self.next_sequence += 1;
        let id = GeocodeRequestId(self.next_sequence);
        self.latest = Some(GeocodeRequest {
            id,
            coordinate: new_center,
            state: GeocodeState::Pending,
        });
        self.issued += 1;

        debug!("Issuing geocode request {:?} for {:?}", id, new_center);
        geocoder.reverse_geocode(id, new_center);

        Some(id)
    }

    /// Returns whether anything was published to `sink`.
    #[instrument(skip(self, result, sink))]
    pub fn on_geocode_result(
        &mut self,
        id: GeocodeRequestId,
        result: Result<Option<Placemark>, Error>,
        sink: &mut dyn AddressSink,
    ) -> bool {
        let Some(request) = self
            .latest
            .as_mut()
            .filter(|r| r.id == id && r.state == GeocodeState::Pending)
        else {
            debug!("Discarding stale geocode result {:?}", id);
            return false;
        };

        match result.and_then(|placemark| {
            placemark.ok_or_else(|| Error::GeocodeFailed("no placemark".to_owned()))
        }) {
            Ok(placemark) => {
                request.state = GeocodeState::Completed;
                let address = placemark.street_address();
                info!("Resolved {:?} to '{}'", request.coordinate, address);
                sink.address_resolved(&address);
            }
            Err(err) => {
                request.state = GeocodeState::Failed;
                warn!("Geocode request {:?} failed: {}", id, err);
                sink.address_failed(&err);
            }
        }

        true
    }

    /// The center the last issued request was made for.
    pub fn last_known_center(&self) -> Option<Coordinate> {
        self.last_known_center
    }

    pub fn latest_request(&self) -> Option<&GeocodeRequest> {
        self.latest.as_ref()
    }

    /// Total number of requests issued since creation.
    pub fn issued_count(&self) -> usize {
        self.issued
    }
}
