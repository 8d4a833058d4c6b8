use geo::line_string;
use wayfarer::{
    Coordinate, Error, Event, MapSession, PermissionState, Placemark, Route, SessionConfig,
    events,
    types::{GeocodeRequestId, RouteRequestId},
};

mod common;

use common::{Fakes, Published};

const FIX: Coordinate = Coordinate::new(0.0, 0.0);

fn session(status: PermissionState) -> (MapSession, Fakes) {
    let fakes = Fakes::new(status, Some(FIX));
    let session = MapSession::new(SessionConfig::default(), fakes.collaborators());
    (session, fakes)
}

fn route() -> Route {
    Route::new("Direct", line_string![(x: 0.0, y: 0.0), (x: 0.01, y: 0.01)])
}

#[test]
fn go_before_any_fix_alerts() {
    let fakes = Fakes::new(PermissionState::Undetermined, None);
    let mut session = MapSession::new(SessionConfig::default(), fakes.collaborators());

    session.start();

    assert_eq!(session.go(), Err(Error::NoLocationAvailable));
    assert_eq!(fakes.alerts.presented(), vec![Error::NoLocationAvailable]);
    assert!(fakes.router.0.borrow().requests.is_empty());
}

#[test]
fn go_before_live_fix_ignores_cached_location() {
    let (mut session, fakes) = session(PermissionState::AuthorizedForeground);

    session.start();
    assert!(session.gate().is_tracking());
    assert_eq!(fakes.map.0.borrow().regions[0].center, FIX);

    assert_eq!(session.go(), Err(Error::NoLocationAvailable));
    assert!(fakes.router.0.borrow().requests.is_empty());
    assert!(session.routes().retained().is_empty());
    assert_eq!(fakes.alerts.presented(), vec![Error::NoLocationAvailable]);
}

#[test]
fn go_routes_from_fix_to_map_center() {
    let (mut session, fakes) = session(PermissionState::AuthorizedForeground);
    let center = Coordinate::new(0.01, 0.01);
    fakes.map.0.borrow_mut().center = center;

    session.start();
    let fix = Coordinate::new(0.001, 0.0);
    session.location_updated(fix);
    session.go().unwrap();

    let log = fakes.router.0.borrow();
    assert_eq!(log.requests[0].1.source, fix);
    assert_eq!(log.requests[0].1.destination, center);
}

#[tokio::test]
async fn queued_events_are_handled_in_order() {
    let (mut session, fakes) = session(PermissionState::AuthorizedForeground);
    let (sender, mut handler) = events::channel();
    session.start();

    sender
        .send(Event::CenterChanged(Coordinate::new(0.0, 0.0)))
        .await
        .unwrap();
    sender
        .send(Event::CenterChanged(Coordinate::new(0.0, 0.0003)))
        .await
        .unwrap();
    sender
        .send(Event::CenterChanged(Coordinate::new(0.0, 0.0006)))
        .await
        .unwrap();
    assert_eq!(handler.handle_events(&mut session), Ok(3));
    assert_eq!(session.geocode().issued_count(), 2);

    // Request 1 was superseded by request 2.
    sender
        .send(Event::GeocodeResolved {
            id: GeocodeRequestId(2),
            result: Ok(Some(Placemark::new(Some("5"), Some("Elm St")))),
        })
        .await
        .unwrap();
    sender
        .send(Event::GeocodeResolved {
            id: GeocodeRequestId(1),
            result: Ok(Some(Placemark::new(Some("1"), Some("Old Rd")))),
        })
        .await
        .unwrap();
    sender.send(Event::LocationUpdated(FIX)).await.unwrap();
    sender.send(Event::GoTriggered).await.unwrap();
    sender.send(Event::GoTriggered).await.unwrap();
    sender
        .send(Event::RouteResolved {
            id: RouteRequestId(1),
            result: Ok(vec![route()]),
        })
        .await
        .unwrap();
    sender
        .send(Event::RouteResolved {
            id: RouteRequestId(2),
            result: Ok(vec![route()]),
        })
        .await
        .unwrap();
    drop(sender);

    handler.run(&mut session).await;

    assert_eq!(
        fakes.addresses.published(),
        vec![Published::Address("5 Elm St".to_owned())]
    );
    assert_eq!(fakes.map.0.borrow().overlays_added, 1);
    assert!(session.routes().retained().is_empty());
    assert!(fakes.alerts.presented().is_empty());
    assert_eq!(handler.handle_events(&mut session), Err(Error::ChannelClosed));
}

#[test]
fn permission_flow_through_events() {
    let fakes = Fakes::new(PermissionState::Undetermined, None);
    let mut session = MapSession::new(SessionConfig::default(), fakes.collaborators());
    let (sender, mut handler) = events::channel();

    session.start();
    assert_eq!(fakes.location.0.borrow().authorization_requests, 1);

    sender
        .try_send(Event::AuthorizationChanged(PermissionState::AuthorizedForeground))
        .unwrap();
    sender.try_send(Event::LocationUpdated(FIX)).unwrap();
    handler.handle_events(&mut session).unwrap();

    assert!(session.gate().is_tracking());
    assert_eq!(session.gate().current_location(), Some(FIX));

    sender
        .try_send(Event::AuthorizationChanged(PermissionState::Restricted))
        .unwrap();
    handler.handle_events(&mut session).unwrap();

    assert!(!session.gate().is_tracking());
    assert_eq!(
        fakes.alerts.presented(),
        vec![Error::PermissionDenied(PermissionState::Restricted)]
    );
}

#[test]
fn rejected_go_event_keeps_loop_running() {
    let (mut session, fakes) = session(PermissionState::AuthorizedForeground);
    let (sender, mut handler) = events::channel();
    session.start();

    sender.try_send(Event::GoTriggered).unwrap();
    sender.try_send(Event::LocationUpdated(FIX)).unwrap();
    sender.try_send(Event::GoTriggered).unwrap();

    assert_eq!(handler.handle_events(&mut session), Ok(3));
    assert_eq!(fakes.alerts.presented(), vec![Error::NoLocationAvailable]);
    assert_eq!(fakes.router.0.borrow().requests.len(), 1);
}
