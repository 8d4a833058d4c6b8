use std::fmt::Display;

use geo::{BoundingRect, HaversineDistance, LineString, Point, Rect};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// A WGS84 position. Equality is by value.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        Point::from(*self).haversine_distance(&Point::from(*other))
    }

    pub fn as_coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(value: Coordinate) -> Self {
        Point::new(value.longitude, value.latitude)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(value: Point<f64>) -> Self {
        Self::new(value.y(), value.x())
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(value: Coord<f64>) -> Self {
        Self::new(value.y, value.x)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    #[default]
    Undetermined,
    Denied,
    Restricted,
    AuthorizedForeground,
    AuthorizedAlways,
}

impl PermissionState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::AuthorizedForeground | Self::AuthorizedAlways)
    }
}

impl Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Undetermined => "undetermined",
                Self::Denied => "denied",
                Self::Restricted => "restricted",
                Self::AuthorizedForeground => "authorized_foreground",
                Self::AuthorizedAlways => "authorized_always",
            }
        )
    }
}

/// Structured reverse-geocoding result.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Placemark {
    /// Street number.
    pub sub_thoroughfare: Option<String>,
    /// Street name.
    pub thoroughfare: Option<String>,
}

impl Placemark {
    pub fn new(sub_thoroughfare: Option<&str>, thoroughfare: Option<&str>) -> Self {
        Self {
            sub_thoroughfare: sub_thoroughfare.map(str::to_owned),
            thoroughfare: thoroughfare.map(str::to_owned),
        }
    }

    /// `"<number> <name>"`, where a missing part is dropped along with the separator.
    pub fn street_address(&self) -> String {
        let number = self.sub_thoroughfare.as_deref().unwrap_or_default();
        let name = self.thoroughfare.as_deref().unwrap_or_default();

        match (number.is_empty(), name.is_empty()) {
            (false, false) => format!("{number} {name}"),
            (false, true) => number.to_owned(),
            (true, _) => name.to_owned(),
        }
    }
}

/// Square map region around `center`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Region {
    pub center: Coordinate,
    pub span_meters: f64,
}

impl Region {
    pub fn new(center: Coordinate, span_meters: f64) -> Self {
        Self {
            center,
            span_meters,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Automobile,
    Walking,
    Transit,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RouteQuery {
    pub source: Coordinate,
    pub destination: Coordinate,
    pub transport: TransportMode,
    pub alternate_routes: bool,
}

/// One route returned by a route provider.
#[derive(Clone, PartialEq, Debug)]
pub struct Route {
    pub name: String,
    pub polyline: LineString<f64>,
}

impl Route {
    pub fn new(name: impl Into<String>, polyline: LineString<f64>) -> Self {
        Self {
            name: name.into(),
            polyline,
        }
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.polyline.bounding_rect()
    }
}

/// Smallest rectangle containing the bounding rectangles of all `routes`.
pub fn union_bounds(routes: &[Route]) -> Option<Rect<f64>> {
    routes
        .iter()
        .filter_map(Route::bounding_rect)
        .reduce(|acc, rect| {
            Rect::new(
                Coord {
                    x: acc.min().x.min(rect.min().x),
                    y: acc.min().y.min(rect.min().y),
                },
                Coord {
                    x: acc.max().x.max(rect.max().x),
                    y: acc.max().y.max(rect.max().y),
                },
            )
        })
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GeocodeRequestId(pub u64);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RouteRequestId(pub u64);

/// Provider-owned handle to an in-flight route computation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RouteHandle(pub u64);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LocationSubscription(pub u64);
