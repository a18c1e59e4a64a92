//! The surface a trip is drawn on. A real implementation wraps some map widget; the view only
//! talks to these traits, so it can run against anything.

use std::f64::consts::PI;

use anyhow::Result;
use geojson::Feature;
use serde::{Deserialize, Serialize};

use catalog::Coordinate;

/// Width in pixels of the whole world at zoom 0
pub const TILE_SIZE: f64 = 512.0;

const MAX_MERCATOR_LATITUDE: f64 = 85.051129;

/// Creates map instances
pub trait MapWidget {
    type Map: MapHandle;

    fn construct(&mut self, options: &MapOptions) -> Result<Self::Map>;
}

/// One live map
pub trait MapHandle {
    /// True once the widget is ready for layers and markers
    fn is_loaded(&self) -> bool;

    fn add_route(&mut self, id: &str, route: &Feature, style: &LineStyle) -> Result<()>;

    fn add_marker(&mut self, pt: Coordinate, style: &MarkerStyle) -> Result<()>;

    fn fit_bounds(&mut self, bounds: &LngLatBounds, options: &FitOptions) -> Result<()>;

    /// Releases everything attached to the map: layers, markers, listeners.
    fn remove(self);
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapOptions {
    /// The DOM element or other place the widget renders into
    pub container: String,
    pub style_url: String,
    pub center: Coordinate,
    pub zoom: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub join: LineJoin,
    pub cap: LineCap,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LineJoin {
    Bevel,
    Round,
    Miter,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineJoin {
    pub fn as_str(self) -> &'static str {
        match self {
            LineJoin::Bevel => "bevel",
            LineJoin::Round => "round",
            LineJoin::Miter => "miter",
        }
    }
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// None uses the widget's default marker
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// In pixels, on every side
    pub padding: f64,
    pub max_zoom: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LngLatBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl LngLatBounds {
    pub fn new() -> Self {
        Self {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    pub fn from_points(pts: &[Coordinate]) -> Self {
        let mut b = Self::new();
        for pt in pts {
            b.extend(*pt);
        }
        b
    }

    pub fn extend(&mut self, pt: Coordinate) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    pub fn contains(&self, pt: Coordinate) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }

    pub fn south_west(&self) -> Coordinate {
        Coordinate::new(self.min_lon, self.min_lat)
    }

    pub fn north_east(&self) -> Coordinate {
        Coordinate::new(self.max_lon, self.max_lat)
    }

    /// The Web Mercator zoom that fits these bounds into a viewport, leaving the padding free on
    /// every side. Never exceeds `max_zoom`; a single point zooms exactly to it.
    pub fn fit_zoom(&self, width: f64, height: f64, options: &FitOptions) -> f64 {
        let (x1, y1) = mercator(Coordinate::new(self.min_lon, self.max_lat));
        let (x2, y2) = mercator(Coordinate::new(self.max_lon, self.min_lat));
        let dx = (x2 - x1).abs() * TILE_SIZE;
        let dy = (y2 - y1).abs() * TILE_SIZE;
        let available_width = (width - 2.0 * options.padding).max(1.0);
        let available_height = (height - 2.0 * options.padding).max(1.0);

        let mut zoom = options.max_zoom;
        if dx > 0.0 {
            zoom = zoom.min((available_width / dx).log2());
        }
        if dy > 0.0 {
            zoom = zoom.min((available_height / dy).log2());
        }
        zoom.max(0.0).min(options.max_zoom)
    }
}

impl Default for LngLatBounds {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized Web Mercator coordinates. Both axes span [0, 1]; y grows southwards.
pub fn mercator(pt: Coordinate) -> (f64, f64) {
    let x = (pt.longitude + 180.0) / 360.0;
    let lat = pt
        .latitude
        .max(-MAX_MERCATOR_LATITUDE)
        .min(MAX_MERCATOR_LATITUDE)
        .to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}
