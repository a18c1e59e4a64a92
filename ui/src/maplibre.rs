//! On the web, trips are drawn by a MapLibre map living underneath the widgetry canvas. The
//! functions it calls are defined on `window` by `web/walkabout.js`.

use std::cell::RefCell;

use anyhow::Result;
use geojson::Feature;
use wasm_bindgen::prelude::*;
use widgetry::{EventCtx, GfxCtx};

use trip::geolocation::{self, LocationResolver};
use trip::map::{FitOptions, LineStyle, LngLatBounds, MapHandle, MapOptions, MapWidget, MarkerStyle};
use trip::{Coordinate, Geolocator, LocateError, LocateFailure, PendingLocation};

use crate::Present;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_geolocation_supported() -> bool;
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_request_location();

    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_create_map(container: &str, style_url: &str, lon: f64, lat: f64, zoom: f64)
        -> u32;
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_map_loaded(map: u32) -> bool;
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_add_route(
        map: u32,
        id: &str,
        geojson: &str,
        color: &str,
        width: f64,
        join: &str,
        cap: &str,
    );
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_add_marker(map: u32, lon: f64, lat: f64, color: Option<String>);
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_fit_bounds(
        map: u32,
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        padding: f64,
        max_zoom: f64,
    );
    #[wasm_bindgen(js_namespace = window)]
    fn walkabout_remove_map(map: u32);
}

pub struct MaplibreWidget;

impl MaplibreWidget {
    pub fn new() -> Self {
        Self
    }
}

impl MapWidget for MaplibreWidget {
    type Map = MaplibreMap;

    fn construct(&mut self, options: &MapOptions) -> Result<MaplibreMap> {
        let handle = walkabout_create_map(
            &options.container,
            &options.style_url,
            options.center.longitude,
            options.center.latitude,
            options.zoom,
        );
        // The glue hands out IDs starting from 1
        if handle == 0 {
            bail!("Couldn't create a map in #{}", options.container);
        }
        Ok(MaplibreMap { handle })
    }
}

pub struct MaplibreMap {
    handle: u32,
}

impl MapHandle for MaplibreMap {
    fn is_loaded(&self) -> bool {
        walkabout_map_loaded(self.handle)
    }

    fn add_route(&mut self, id: &str, route: &Feature, style: &LineStyle) -> Result<()> {
        let geojson = serde_json::to_string(route)?;
        walkabout_add_route(
            self.handle,
            id,
            &geojson,
            &style.color,
            style.width,
            style.join.as_str(),
            style.cap.as_str(),
        );
        Ok(())
    }

    fn add_marker(&mut self, pt: Coordinate, style: &MarkerStyle) -> Result<()> {
        walkabout_add_marker(self.handle, pt.longitude, pt.latitude, style.color.clone());
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: &LngLatBounds, options: &FitOptions) -> Result<()> {
        walkabout_fit_bounds(
            self.handle,
            bounds.min_lon,
            bounds.min_lat,
            bounds.max_lon,
            bounds.max_lat,
            options.padding,
            options.max_zoom,
        );
        Ok(())
    }

    fn remove(self) {
        walkabout_remove_map(self.handle);
    }
}

// MapLibre handles its own input and rendering
impl Present for MaplibreMap {
    fn event(&mut self, _: &mut EventCtx) {}
    fn draw(&self, _: &mut GfxCtx) {}
    fn is_dirty(&self) -> bool {
        false
    }
}

thread_local! {
    // At most one request is outstanding; the browser calls back into one of the functions below
    static PENDING: RefCell<Option<LocationResolver>> = RefCell::new(None);
}

/// Asks `navigator.geolocation` where the user is
pub struct BrowserGeolocator;

impl Geolocator for BrowserGeolocator {
    fn request_location(&self) -> Result<PendingLocation, LocateError> {
        if !walkabout_geolocation_supported() {
            return Err(LocateError::CapabilityUnavailable);
        }
        let (resolver, pending) = geolocation::channel();
        PENDING.with(|slot| {
            if slot.borrow_mut().replace(resolver).is_some() {
                warn!("Abandoning an earlier location request");
            }
        });
        walkabout_request_location();
        Ok(pending)
    }
}

fn answer(result: Result<Coordinate, LocateError>) {
    match PENDING.with(|slot| slot.borrow_mut().take()) {
        Some(resolver) => resolver.resolve(result),
        None => warn!("The browser answered a location request nobody made: {:?}", result),
    }
}

#[wasm_bindgen]
pub fn walkabout_location_found(lon: f64, lat: f64) {
    answer(Ok(Coordinate::new(lon, lat)));
}

/// `code` is from the browser's GeolocationPositionError
#[wasm_bindgen]
pub fn walkabout_location_failed(code: u32, message: String) {
    warn!("Geolocation failed with code {code}: {message}");
    answer(Err(LocateError::LocationUnavailable(
        LocateFailure::from_code(code, message),
    )));
}
