#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

#[cfg(not(target_arch = "wasm32"))]
mod canvas;
mod components;
mod locating;
#[cfg(target_arch = "wasm32")]
mod maplibre;
mod title;
mod trip_viewer;

use anyhow::Result;
use structopt::StructOpt;
use widgetry::{Color, EventCtx, GfxCtx, Settings, SharedAppState};

use catalog::{Catalog, Format};
use trip::{Geolocator, MapConfig, TripView};

#[cfg(not(target_arch = "wasm32"))]
pub type MapBackend = canvas::CanvasWidget;
#[cfg(target_arch = "wasm32")]
pub type MapBackend = maplibre::MaplibreWidget;

#[derive(StructOpt)]
struct Args {
    /// A JSON or CSV file of cities, each with `city`, `lat`, and `lng`. Defaults to the bundled
    /// list of Australian cities.
    #[structopt(long)]
    catalog: Option<String>,
    /// Where you are, as "longitude,latitude". Without this, native builds can't find you.
    #[structopt(long)]
    origin: Option<String>,
    /// A MapTiler API key. Defaults to $MAPTILER_API_KEY
    #[structopt(long)]
    api_key: Option<String>,
}

impl Args {
    fn load(mut self) -> Result<(Catalog, MapConfig, Box<dyn Geolocator>)> {
        let catalog = match self.catalog.take() {
            Some(path) => load_catalog(&path)?,
            None => Catalog::australia()?,
        };

        let config = match self.api_key.take() {
            Some(key) => MapConfig::from_key(Some(key))?,
            None => default_config()?,
        };

        let geolocator = self.geolocator()?;
        Ok((catalog, config, geolocator))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn geolocator(&self) -> Result<Box<dyn Geolocator>> {
        let origin = match self.origin {
            Some(ref x) => Some(parse_origin(x)?),
            None => {
                warn!("No --origin given, so there's no way to find you");
                None
            }
        };
        Ok(Box::new(trip::geolocation::FixedLocation(origin)))
    }

    #[cfg(target_arch = "wasm32")]
    fn geolocator(&self) -> Result<Box<dyn Geolocator>> {
        if self.origin.is_some() {
            warn!("Ignoring --origin; the browser knows where you are");
        }
        Ok(Box::new(maplibre::BrowserGeolocator))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_catalog(path: &str) -> Result<Catalog> {
    let format = Format::from_path(path)?;
    let bytes = fs_err::read(path)?;
    Catalog::load(format, &bytes).map_err(|err| anyhow!("{path}: {err}"))
}

#[cfg(target_arch = "wasm32")]
fn load_catalog(path: &str) -> Result<Catalog> {
    // Only to make sure the format would be understood
    Format::from_path(path)?;
    bail!("Can't read {path} on the web; only the bundled catalog is available")
}

#[cfg(not(target_arch = "wasm32"))]
fn default_config() -> Result<MapConfig> {
    MapConfig::from_env()
}

// The page can't see environment variables, so the key is baked in at build time
#[cfg(target_arch = "wasm32")]
fn default_config() -> Result<MapConfig> {
    MapConfig::from_key(option_env!("MAPTILER_API_KEY").map(|key| key.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_origin(x: &str) -> Result<catalog::Coordinate> {
    let parts: Vec<&str> = x.split(',').map(|part| part.trim()).collect();
    if parts.len() != 2 {
        bail!("--origin should look like \"151.2,-33.9\", not {x}");
    }
    let lon = parts[0]
        .parse::<f64>()
        .map_err(|err| anyhow!("bad longitude in --origin {x}: {err}"))?;
    let lat = parts[1]
        .parse::<f64>()
        .map_err(|err| anyhow!("bad latitude in --origin {x}: {err}"))?;
    Ok(catalog::Coordinate::new(lon, lat))
}

fn run(settings: Settings) {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    let (catalog, config, geolocator) = match args.load() {
        Ok(x) => x,
        Err(err) => {
            error!("Couldn't start: {err}");
            return;
        }
    };

    widgetry::run(settings, move |ctx| {
        let app = App::new(catalog, config, geolocator);
        let states = vec![title::TitleScreen::new_state(ctx)];
        (app, states)
    });
}

pub fn main() {
    let settings = Settings::new("Walkabout");
    run(settings);
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_wasm() {
    run(Settings::new("Walkabout").root_dom_element_id("loading".to_string()));
}

pub struct App {
    view: TripView<MapBackend>,
    geolocator: Box<dyn Geolocator>,
}

impl SharedAppState for App {
    fn draw_default(&self, g: &mut GfxCtx) {
        // On the web, the map underneath shows through
        if cfg!(not(target_arch = "wasm32")) {
            g.clear(Color::BLACK);
        }
    }
}

pub type Transition = widgetry::Transition<App>;

impl App {
    pub fn new(catalog: Catalog, config: MapConfig, geolocator: Box<dyn Geolocator>) -> Self {
        Self {
            view: TripView::new(catalog, config, MapBackend::new()),
            geolocator,
        }
    }

    /// Kicks off finding the user. Without any way to do that, this just tells the user.
    pub fn start_trip(&mut self, ctx: &mut EventCtx) -> Transition {
        match self.view.request_trip(self.geolocator.as_ref()) {
            Ok(()) => Transition::Replace(locating::Locating::new_state(ctx)),
            Err(err) => Transition::Push(widgetry::tools::PopupMsg::new_state(
                ctx,
                "Error",
                vec![err.to_string()],
            )),
        }
    }
}

/// Each platform's map gets a chance to react to events and draw, alongside the widgetry panels.
pub trait Present {
    fn event(&mut self, ctx: &mut EventCtx);
    fn draw(&self, g: &mut GfxCtx);
    /// Something was added that `event` hasn't turned into geometry yet
    fn is_dirty(&self) -> bool;
}
