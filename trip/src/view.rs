use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use rand::rngs::StdRng;
use rand::SeedableRng;

use catalog::{Catalog, City, Coordinate};

use crate::config::MapConfig;
use crate::destination::pick_destination;
use crate::geolocation::{Geolocator, LocateError, LocateResult, PendingLocation};
use crate::map::{LngLatBounds, MapHandle, MapOptions, MapWidget};

/// The ID of the route source and layer on the map
pub const ROUTE_LAYER: &str = "route";

/// Where the user is, and where they're going
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub origin: Coordinate,
    pub destination: City,
}

impl Trip {
    pub fn new(origin: Coordinate, destination: City) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn center(&self) -> Coordinate {
        self.origin.midpoint(self.destination.coordinate)
    }

    pub fn bounds(&self) -> LngLatBounds {
        LngLatBounds::from_points(&[self.origin, self.destination.coordinate])
    }

    /// A straight line from origin to destination
    pub fn route(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(vec![
                self.origin.to_position(),
                self.destination.coordinate.to_position(),
            ]))),
            id: None,
            properties: Some(serde_json::Map::new()),
            foreign_members: None,
        }
    }

    /// As the crow flies, in meters
    pub fn distance(&self) -> f64 {
        self.origin.haversine_distance(self.destination.coordinate)
    }

    pub fn to_geojson(&self) -> GeoJson {
        let endpoint = |pt: Coordinate, name: &str| {
            let mut properties = serde_json::Map::new();
            properties.insert(
                "name".to_string(),
                serde_json::Value::String(name.to_string()),
            );
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(pt.to_position()))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        };
        GeoJson::FeatureCollection(FeatureCollection {
            features: vec![
                self.route(),
                endpoint(self.origin, "Your location"),
                endpoint(self.destination.coordinate, &self.destination.name),
            ],
            bbox: None,
            foreign_members: None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Locating,
    Showing,
}

/// What happened during a `poll`
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Nothing,
    /// The trip is known and the map was just created
    Showing,
    /// Back to idle; the error should be shown to the user
    Failed(LocateError),
}

enum State<M> {
    Idle,
    Locating(PendingLocation),
    Showing(Showing<M>),
}

struct Showing<M> {
    trip: Trip,
    map: M,
    drawn: bool,
}

/// Finds the user, picks a destination, and draws the trip between them. At most one map is ever
/// alive, and only while showing a trip.
pub struct TripView<W: MapWidget> {
    catalog: Catalog,
    config: MapConfig,
    widget: W,
    rng: StdRng,
    state: State<W::Map>,
}

impl<W: MapWidget> TripView<W> {
    pub fn new(catalog: Catalog, config: MapConfig, widget: W) -> Self {
        Self {
            catalog,
            config,
            widget,
            rng: StdRng::from_entropy(),
            state: State::Idle,
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Locating(_) => Phase::Locating,
            State::Showing(_) => Phase::Showing,
        }
    }

    pub fn trip(&self) -> Option<&Trip> {
        match self.state {
            State::Showing(ref showing) => Some(&showing.trip),
            _ => None,
        }
    }

    pub fn map(&self) -> Option<&W::Map> {
        match self.state {
            State::Showing(ref showing) => Some(&showing.map),
            _ => None,
        }
    }

    pub fn map_mut(&mut self) -> Option<&mut W::Map> {
        match self.state {
            State::Showing(ref mut showing) => Some(&mut showing.map),
            _ => None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// True once the route, markers and fit have been handed to the current map
    pub fn is_drawn(&self) -> bool {
        match self.state {
            State::Showing(ref showing) => showing.drawn,
            _ => false,
        }
    }

    /// Starts finding the user. Only does something when idle, so there's never more than one
    /// request in flight. If the platform can't locate at all, this stays idle and returns the
    /// error.
    pub fn request_trip(&mut self, geolocator: &dyn Geolocator) -> Result<(), LocateError> {
        if !matches!(self.state, State::Idle) {
            debug!("Ignoring a trip request while {:?}", self.phase());
            return Ok(());
        }
        let pending = geolocator.request_location()?;
        info!("Finding the user");
        self.state = State::Locating(pending);
        Ok(())
    }

    /// Call every so often. While locating, checks for an answer. While showing, finishes drawing
    /// once the map is ready.
    pub fn poll(&mut self) -> Result<Outcome> {
        let result = match self.state {
            State::Idle => {
                return Ok(Outcome::Nothing);
            }
            State::Locating(ref mut pending) => match pending.try_resolve() {
                Some(result) => result,
                None => {
                    return Ok(Outcome::Nothing);
                }
            },
            State::Showing(_) => {
                self.draw_when_ready()?;
                return Ok(Outcome::Nothing);
            }
        };
        self.resolve(result)
    }

    /// Suspends until the outstanding location request is answered, then acts like `poll`.
    pub async fn finish_locating(&mut self) -> Result<Outcome> {
        let result = match self.state {
            State::Locating(ref mut pending) => pending.await,
            _ => {
                return self.poll();
            }
        };
        self.resolve(result)
    }

    /// Handles the answer to the location request. Origin and destination become known together,
    /// so there's no way to show a trip missing either one.
    pub fn resolve(&mut self, result: LocateResult) -> Result<Outcome> {
        if !matches!(self.state, State::Locating(_)) {
            warn!("Got a location while {:?}; ignoring it", self.phase());
            return Ok(Outcome::Nothing);
        }
        match result {
            Ok(origin) => {
                let destination = pick_destination(&self.catalog, &mut self.rng).clone();
                self.show(Trip::new(origin, destination))?;
                Ok(Outcome::Showing)
            }
            Err(err) => {
                warn!("Couldn't find the user: {:?}", err);
                self.state = State::Idle;
                Ok(Outcome::Failed(err))
            }
        }
    }

    /// Keeps the origin, but rolls a new destination and rebuilds the map
    pub fn change_destination(&mut self) -> Result<()> {
        let origin = match self.state {
            State::Showing(ref showing) => showing.trip.origin,
            _ => bail!("There's no trip to change"),
        };
        let destination = pick_destination(&self.catalog, &mut self.rng).clone();
        self.show(Trip::new(origin, destination))
    }

    /// Releases the map, if there is one, and goes back to idle.
    pub fn teardown(&mut self) {
        if let State::Showing(showing) = std::mem::replace(&mut self.state, State::Idle) {
            debug!("Releasing the map for {}", showing.trip.destination.name);
            showing.map.remove();
        }
    }

    fn show(&mut self, trip: Trip) -> Result<()> {
        // The old map has to go before the new one exists
        self.teardown();

        info!(
            "Taking the user from {} to {} at {} ({:.0} km)",
            trip.origin,
            trip.destination.name,
            trip.destination.coordinate,
            trip.distance() / 1000.0
        );
        debug!("Trip: {}", serde_json::to_string(&trip.to_geojson())?);

        let map = self.widget.construct(&MapOptions {
            container: self.config.container.clone(),
            style_url: self.config.style_url(),
            center: trip.center(),
            zoom: self.config.initial_zoom,
        })?;
        self.state = State::Showing(Showing {
            trip,
            map,
            drawn: false,
        });
        self.draw_when_ready()
    }

    fn draw_when_ready(&mut self) -> Result<()> {
        let config = &self.config;
        if let State::Showing(ref mut showing) = self.state {
            if showing.drawn || !showing.map.is_loaded() {
                return Ok(());
            }
            showing.drawn = true;

            let trip = &showing.trip;
            let map = &mut showing.map;
            map.add_route(ROUTE_LAYER, &trip.route(), &config.route)?;
            map.add_marker(trip.origin, &config.origin_marker)?;
            map.add_marker(trip.destination.coordinate, &config.destination_marker)?;
            map.fit_bounds(&trip.bounds(), &config.fit)?;
        }
        Ok(())
    }
}

impl<W: MapWidget> Drop for TripView<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}
