use anyhow::Result;
use url::Url;

use crate::map::{FitOptions, LineCap, LineJoin, LineStyle, MarkerStyle};

pub const API_KEY_VAR: &str = "MAPTILER_API_KEY";

const STYLE_URL: &str = "https://api.maptiler.com/maps/streets/style.json";

/// How the trip map looks. Only the API key varies between deployments.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub api_key: String,
    pub container: String,
    pub initial_zoom: f64,
    pub route: LineStyle,
    pub origin_marker: MarkerStyle,
    pub destination_marker: MarkerStyle,
    pub fit: FitOptions,
}

impl MapConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            container: "map".to_string(),
            initial_zoom: 3.0,
            route: LineStyle {
                color: "#FF0000".to_string(),
                width: 3.0,
                join: LineJoin::Round,
                cap: LineCap::Round,
            },
            origin_marker: MarkerStyle::default(),
            destination_marker: MarkerStyle {
                color: Some("#FF0000".to_string()),
            },
            fit: FitOptions {
                padding: 50.0,
                max_zoom: 15.0,
            },
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_key(std::env::var(API_KEY_VAR).ok())
    }

    /// The key is required; None or blank is an error.
    pub fn from_key(key: Option<String>) -> Result<Self> {
        match key {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => bail!("Set {API_KEY_VAR} to a MapTiler API key"),
        }
    }

    pub fn style_url(&self) -> String {
        match Url::parse_with_params(STYLE_URL, &[("key", &self.api_key)]) {
            Ok(url) => url.to_string(),
            // STYLE_URL is a constant and always parses
            Err(_) => format!("{STYLE_URL}?key={}", self.api_key),
        }
    }
}
