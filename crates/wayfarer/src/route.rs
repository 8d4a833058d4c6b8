use log::{debug, info, warn};
use tracing::instrument;

use crate::{
    error::{Error, Result},
    services::{AlertPresenter, MapDisplay, RouteProvider},
    types::{
        Coordinate, Route, RouteHandle, RouteQuery, RouteRequestId, TransportMode, union_bounds,
    },
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RouteState {
    Pending,
    Completed,
    Cancelled,
    Failed,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RouteRequest {
    pub id: RouteRequestId,
    pub source: Coordinate,
    pub destination: Coordinate,
    pub handle: RouteHandle,
    pub state: RouteState,
}

/// Issues driving-direction requests, keeping at most one pending.
#[derive(Debug)]
pub struct RouteRequestController {
    transport: TransportMode,
    alternate_routes: bool,
    next_id: u64,
    retained: Vec<RouteRequest>,
}

impl RouteRequestController {
    pub fn new(transport: TransportMode, alternate_routes: bool) -> Self {
        Self {
            transport,
            alternate_routes,
            next_id: 0,
            retained: Vec::new(),
        }
    }

    /// Cancel whatever is pending, clear the route overlays and request
    /// directions from `current_location` to `destination`.
    #[instrument(skip(self, provider, map))]
    pub fn on_go_triggered(
        &mut self,
        current_location: Option<Coordinate>,
        destination: Coordinate,
        provider: &mut dyn RouteProvider,
        map: &mut dyn MapDisplay,
    ) -> Result<RouteRequestId> {
        let source = current_location.ok_or(Error::NoLocationAvailable)?;

        self.cancel_pending(provider);
        map.clear_overlays();

        self.next_id += 1;
        let id = RouteRequestId(self.next_id);
        let query = RouteQuery {
            source,
            destination,
            transport: self.transport,
            alternate_routes: self.alternate_routes,
        };
        let handle = provider.request_routes(id, &query);
        self.retained.push(RouteRequest {
            id,
            source,
            destination,
            handle,
            state: RouteState::Pending,
        });

        info!("Requested routes {:?} from {:?} to {:?}", id, source, destination);
        Ok(id)
    }

    /// Returns whether the result belonged to a retained request.
    #[instrument(skip(self, result, map, alerts))]
    pub fn on_route_result(
        &mut self,
        id: RouteRequestId,
        result: Result<Vec<Route>>,
        map: &mut dyn MapDisplay,
        alerts: &mut dyn AlertPresenter,
    ) -> bool {
        let Some(position) = self.retained.iter().position(|r| r.id == id) else {
            debug!("Discarding result for cancelled route request {:?}", id);
            return false;
        };
        let mut request = self.retained.remove(position);

        let routes = result.and_then(|routes| {
            if routes.is_empty() {
                Err(Error::RouteComputationFailed("no routes returned".to_owned()))
            } else {
                Ok(routes)
            }
        });

        match routes {
            Ok(routes) => {
                request.state = RouteState::Completed;
                for route in &routes {
                    map.add_overlay(&route.polyline);
                }
                if let Some(bounds) = union_bounds(&routes) {
                    map.set_visible_rect(bounds);
                }
                info!("Route request {:?} returned {} route(s)", id, routes.len());
            }
            Err(err) => {
                request.state = RouteState::Failed;
                warn!("Route request {:?} failed: {}", id, err);
                alerts.present(&err);
            }
        }
        debug!("Route request {:?} finished as {:?}", id, request.state);

        true
    }

    /// Requests issued and not yet resolved or cancelled.
    pub fn retained(&self) -> &[RouteRequest] {
        &self.retained
    }

    fn cancel_pending(&mut self, provider: &mut dyn RouteProvider) {
        for request in self
            .retained
            .iter_mut()
            .filter(|r| r.state == RouteState::Pending)
        {
            provider.cancel(request.handle);
            request.state = RouteState::Cancelled;
            debug!("Route request {:?} finished as {:?}", request.id, request.state);
        }

        self.retained.clear();
    }
}
