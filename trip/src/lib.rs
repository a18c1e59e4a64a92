#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod config;
pub mod destination;
pub mod geolocation;
pub mod map;
mod view;

pub use catalog::{Catalog, City, CityID, Coordinate};

pub use self::config::MapConfig;
pub use self::geolocation::{Geolocator, LocateError, LocateFailure, PendingLocation};
pub use self::view::{Outcome, Phase, Trip, TripView, ROUTE_LAYER};
