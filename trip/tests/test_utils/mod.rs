use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{bail, Result};
use geojson::{Feature, Value};

use trip::map::{FitOptions, LineStyle, LngLatBounds, MapHandle, MapOptions, MapWidget, MarkerStyle};
use trip::{Catalog, City, Coordinate};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Construct(MapOptions),
    AddRoute {
        map: usize,
        id: String,
        line: Vec<Vec<f64>>,
        style: LineStyle,
    },
    AddMarker {
        map: usize,
        pt: Coordinate,
        style: MarkerStyle,
    },
    FitBounds {
        map: usize,
        bounds: LngLatBounds,
        options: FitOptions,
    },
    Remove(usize),
}

#[derive(Default)]
pub struct Record {
    pub calls: Vec<Call>,
    pub live: usize,
    pub max_live: usize,
    pub constructed: usize,
}

/// A map widget that remembers everything asked of it
#[derive(Clone)]
pub struct RecordingWidget {
    pub record: Rc<RefCell<Record>>,
    /// Shared by every map this creates; flip it to fire the ready event
    pub loaded: Rc<Cell<bool>>,
    pub broken: bool,
}

pub struct RecordingMap {
    id: usize,
    record: Rc<RefCell<Record>>,
    loaded: Rc<Cell<bool>>,
}

impl RecordingWidget {
    pub fn new() -> Self {
        Self {
            record: Rc::new(RefCell::new(Record::default())),
            loaded: Rc::new(Cell::new(true)),
            broken: false,
        }
    }

    pub fn loading_slowly() -> Self {
        let widget = Self::new();
        widget.loaded.set(false);
        widget
    }

    pub fn calls(&self) -> Vec<Call> {
        self.record.borrow().calls.clone()
    }

    pub fn live(&self) -> usize {
        self.record.borrow().live
    }

    pub fn max_live(&self) -> usize {
        self.record.borrow().max_live
    }

    pub fn constructed(&self) -> usize {
        self.record.borrow().constructed
    }
}

impl MapWidget for RecordingWidget {
    type Map = RecordingMap;

    fn construct(&mut self, options: &MapOptions) -> Result<RecordingMap> {
        if self.broken {
            bail!("no WebGL here");
        }
        let mut record = self.record.borrow_mut();
        record.calls.push(Call::Construct(options.clone()));
        record.live += 1;
        record.max_live = record.max_live.max(record.live);
        record.constructed += 1;
        Ok(RecordingMap {
            id: record.constructed,
            record: self.record.clone(),
            loaded: self.loaded.clone(),
        })
    }
}

impl MapHandle for RecordingMap {
    fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    fn add_route(&mut self, id: &str, route: &Feature, style: &LineStyle) -> Result<()> {
        let line = match route.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(pts)) => pts.clone(),
            x => bail!("route isn't a LineString: {:?}", x),
        };
        self.record.borrow_mut().calls.push(Call::AddRoute {
            map: self.id,
            id: id.to_string(),
            line,
            style: style.clone(),
        });
        Ok(())
    }

    fn add_marker(&mut self, pt: Coordinate, style: &MarkerStyle) -> Result<()> {
        self.record.borrow_mut().calls.push(Call::AddMarker {
            map: self.id,
            pt,
            style: style.clone(),
        });
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: &LngLatBounds, options: &FitOptions) -> Result<()> {
        self.record.borrow_mut().calls.push(Call::FitBounds {
            map: self.id,
            bounds: *bounds,
            options: options.clone(),
        });
        Ok(())
    }

    fn remove(self) {
        let mut record = self.record.borrow_mut();
        record.calls.push(Call::Remove(self.id));
        record.live -= 1;
    }
}

pub fn catalog(cities: &[(&str, f64, f64)]) -> Catalog {
    Catalog::new(
        cities
            .iter()
            .map(|(name, lon, lat)| City::new(*name, Coordinate::new(*lon, *lat)))
            .collect(),
    )
    .unwrap()
}
