use std::fmt;

use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6371e3;

/// A (longitude, latitude) pair in decimal degrees. Nothing checks the range; whatever the source
/// says passes through.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// The arithmetic mean of each axis. This is not the geodesic midpoint, and it ignores the
    /// antimeridian.
    pub fn midpoint(self, other: Coordinate) -> Coordinate {
        Coordinate::new(
            (self.longitude + other.longitude) / 2.0,
            (self.latitude + other.latitude) / 2.0,
        )
    }

    /// GeoJSON position order
    pub fn to_position(self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }

    /// Great-circle distance in meters
    pub fn haversine_distance(self, other: Coordinate) -> f64 {
        let phi_1 = self.latitude.to_radians();
        let phi_2 = other.latitude.to_radians();
        let delta_phi = (other.latitude - self.latitude).to_radians();
        let delta_lambda = (other.longitude - self.longitude).to_radians();
        let a = (delta_phi / 2.0).sin().powi(2)
            + phi_1.cos() * phi_2.cos() * (delta_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}
