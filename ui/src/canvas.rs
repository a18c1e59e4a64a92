//! Draws trips straight onto the widgetry canvas. There are no tiles underneath, just the route
//! and markers.

use std::f64::consts::PI;

use anyhow::Result;
use geojson::{Feature, Value};
use geom::{Circle, Distance, PolyLine, Pt2D};
use widgetry::{Color, Drawable, EventCtx, GeomBatch, GfxCtx};

use trip::map::{
    mercator, FitOptions, LineStyle, LngLatBounds, MapHandle, MapOptions, MapWidget, MarkerStyle,
    TILE_SIZE,
};
use trip::Coordinate;

use crate::Present;

// The circumference of the Web Mercator world, in meters
const WORLD_METERS: f64 = 2.0 * PI * 6_378_137.0;

// In pixels
const MARKER_RADIUS: f64 = 8.0;
const MARKER_OUTLINE: f64 = 2.0;
const DEFAULT_MARKER_COLOR: &str = "#3FB1CE";

pub struct CanvasWidget {
    maps_created: usize,
}

impl CanvasWidget {
    pub fn new() -> Self {
        Self { maps_created: 0 }
    }
}

impl MapWidget for CanvasWidget {
    type Map = CanvasMap;

    fn construct(&mut self, options: &MapOptions) -> Result<CanvasMap> {
        self.maps_created += 1;
        debug!(
            "Canvas map #{} centered at {}; tiles from {} aren't drawn natively",
            self.maps_created, options.center, options.style_url
        );
        Ok(CanvasMap {
            center: options.center,
            zoom: options.zoom,
            routes: Vec::new(),
            markers: Vec::new(),
            fit: None,
            draw: None,
            dirty: true,
        })
    }
}

/// Remembers what's been added, and turns it into geometry on the next event
pub struct CanvasMap {
    center: Coordinate,
    zoom: f64,
    routes: Vec<(Vec<Coordinate>, LineStyle)>,
    markers: Vec<(Coordinate, MarkerStyle)>,
    fit: Option<(LngLatBounds, FitOptions)>,

    draw: Option<Drawable>,
    dirty: bool,
}

impl MapHandle for CanvasMap {
    fn is_loaded(&self) -> bool {
        true
    }

    fn add_route(&mut self, id: &str, route: &Feature, style: &LineStyle) -> Result<()> {
        let pts = match route.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(pts)) => pts
                .iter()
                .map(|pt| {
                    if pt.len() < 2 {
                        bail!("{id} has a position with {} values", pt.len());
                    }
                    Ok(Coordinate::new(pt[0], pt[1]))
                })
                .collect::<Result<Vec<_>>>()?,
            _ => bail!("{id} isn't a LineString"),
        };
        self.routes.push((pts, style.clone()));
        self.dirty = true;
        Ok(())
    }

    fn add_marker(&mut self, pt: Coordinate, style: &MarkerStyle) -> Result<()> {
        self.markers.push((pt, style.clone()));
        self.dirty = true;
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: &LngLatBounds, options: &FitOptions) -> Result<()> {
        self.fit = Some((*bounds, options.clone()));
        self.dirty = true;
        Ok(())
    }

    fn remove(self) {
        // Dropping the Drawable frees the GPU buffers
        debug!(
            "Removing a canvas map with {} routes and {} markers",
            self.routes.len(),
            self.markers.len()
        );
    }
}

impl Present for CanvasMap {
    fn event(&mut self, ctx: &mut EventCtx) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let mut pts = vec![self.center];
        for (line, _) in &self.routes {
            pts.extend(line.iter().cloned());
        }
        pts.extend(self.markers.iter().map(|(pt, _)| *pt));
        let projection = Projection::new(&pts);

        // Start at the requested camera, then let the fit override it
        let mut zoom = self.zoom;
        let mut center = projection.project(self.center);
        if let Some((ref bounds, ref options)) = self.fit {
            zoom = bounds.fit_zoom(ctx.canvas.window_width, ctx.canvas.window_height, options);
            let sw = projection.project(bounds.south_west());
            let ne = projection.project(bounds.north_east());
            center = Pt2D::new((sw.x() + ne.x()) / 2.0, (sw.y() + ne.y()) / 2.0);
        }
        ctx.canvas.map_dims = projection.dims();
        ctx.canvas.cam_zoom = projection.cam_zoom(zoom);
        ctx.canvas.center_on_map_pt(center);

        // Styles are in pixels, but the batch is in map-space
        let meters_per_pixel = 1.0 / ctx.canvas.cam_zoom;
        let mut batch = GeomBatch::new();
        for (line, style) in &self.routes {
            let pts: Vec<Pt2D> = line.iter().map(|pt| projection.project(*pt)).collect();
            match PolyLine::new(pts) {
                Ok(pl) => {
                    batch.push(
                        color(&style.color),
                        pl.make_polygons(Distance::meters(style.width * meters_per_pixel)),
                    );
                }
                // Both ends at the same spot
                Err(err) => {
                    debug!("Not drawing a degenerate route: {err}");
                }
            }
        }
        for (pt, style) in &self.markers {
            let pt = projection.project(*pt);
            batch.push(
                Color::WHITE,
                Circle::new(
                    pt,
                    Distance::meters((MARKER_RADIUS + MARKER_OUTLINE) * meters_per_pixel),
                )
                .to_polygon(),
            );
            batch.push(
                color(style.color.as_deref().unwrap_or(DEFAULT_MARKER_COLOR)),
                Circle::new(pt, Distance::meters(MARKER_RADIUS * meters_per_pixel)).to_polygon(),
            );
        }
        self.draw = Some(ctx.upload(batch));
    }

    fn draw(&self, g: &mut GfxCtx) {
        if let Some(ref draw) = self.draw {
            g.redraw(draw);
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn color(hex: &str) -> Color {
    Color::hex(hex)
}

/// Web Mercator, scaled to meters at the equator and shifted so everything lands at positive
/// coordinates
struct Projection {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Projection {
    fn new(pts: &[Coordinate]) -> Self {
        let mut p = Self {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        };
        for pt in pts {
            let (x, y) = mercator(*pt);
            p.min_x = p.min_x.min(x);
            p.min_y = p.min_y.min(y);
            p.max_x = p.max_x.max(x);
            p.max_y = p.max_y.max(y);
        }
        p
    }

    fn project(&self, pt: Coordinate) -> Pt2D {
        let (x, y) = mercator(pt);
        Pt2D::new(
            (x - self.min_x) * WORLD_METERS,
            (y - self.min_y) * WORLD_METERS,
        )
    }

    fn dims(&self) -> (f64, f64) {
        (
            ((self.max_x - self.min_x) * WORLD_METERS).max(1.0),
            ((self.max_y - self.min_y) * WORLD_METERS).max(1.0),
        )
    }

    /// widgetry zooms in pixels per meter
    fn cam_zoom(&self, web_zoom: f64) -> f64 {
        TILE_SIZE * 2.0_f64.powf(web_zoom) / WORLD_METERS
    }
}
