use std::fmt::{Debug, Display};

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::instrument;

use crate::{
    error::{Error, Result},
    session::MapSession,
    types::{Coordinate, GeocodeRequestId, PermissionState, Placemark, Route, RouteRequestId},
};

pub const EVENT_CHANNEL_CAPACITY: usize = 64;

pub type EventSender = mpsc::Sender<Event>;

pub fn channel() -> (EventSender, EventHandler) {
    let (send, recv) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    (send, EventHandler::new(recv))
}

pub enum Event {
    AuthorizationChanged(PermissionState),
    LocationUpdated(Coordinate),
    CenterChanged(Coordinate),
    GeocodeResolved {
        id: GeocodeRequestId,
        result: Result<Option<Placemark>>,
    },
    GoTriggered,
    RouteResolved {
        id: RouteRequestId,
        result: Result<Vec<Route>>,
    },
}

impl Event {
    #[instrument(skip(session))]
    pub fn handle(self, session: &mut MapSession) {
        match self {
            Self::AuthorizationChanged(state) => session.authorization_changed(state),
            Self::LocationUpdated(fix) => session.location_updated(fix),
            Self::CenterChanged(center) => {
                session.center_changed(center);
            }
            Self::GeocodeResolved { id, result } => {
                session.geocode_resolved(id, result);
            }
            Self::GoTriggered => {
                // Already presented to the user by the session.
                if let Err(err) = session.go() {
                    log::trace!("[event] GoTriggered rejected: {err}");
                }
            }
            Self::RouteResolved { id, result } => {
                session.route_resolved(id, result);
            }
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::AuthorizationChanged(_) => "AuthorizationChanged",
                Self::LocationUpdated(_) => "LocationUpdated",
                Self::CenterChanged(_) => "CenterChanged",
                Self::GeocodeResolved { .. } => "GeocodeResolved",
                Self::GoTriggered => "GoTriggered",
                Self::RouteResolved { .. } => "RouteResolved",
            }
        )
    }
}

impl Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event::{self}")
    }
}

/// Delivers queued events to the session, one at a time, on the calling task.
pub struct EventHandler {
    recv: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(recv: mpsc::Receiver<Event>) -> Self {
        Self { recv }
    }

    /// Handle every event that is already queued without waiting for more.
    ///
    /// Returns the number of events handled, or [`Error::ChannelClosed`] once
    /// the queue is empty and every sender is gone.
    pub fn handle_events(&mut self, session: &mut MapSession) -> Result<usize> {
        let mut handled = 0;

        loop {
            match self.recv.try_recv() {
                Ok(event) => {
                    event.handle(session);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if handled == 0 {
                        return Err(Error::ChannelClosed);
                    }
                    break;
                }
            }
        }

        log::trace!("[event] Handled {} events", handled);
        Ok(handled)
    }

    /// Handle events until every sender has been dropped.
    pub async fn run(&mut self, session: &mut MapSession) {
        while let Some(event) = self.recv.recv().await {
            log::trace!("[event] Received {}", event);
            event.handle(session);
        }
        log::debug!("Event channel closed");
    }
}
