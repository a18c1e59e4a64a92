use anyhow::Result;
use serde::Deserialize;

use crate::{City, Coordinate};

/// One entry of a catalog file, before anything is checked. Other fields (country, population,
/// ...) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub lat: Option<RawNumber>,
    #[serde(default)]
    pub lng: Option<RawNumber>,
}

/// Coordinates show up both as JSON numbers and as text
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn parse(&self) -> Option<f64> {
        let x = match self {
            RawNumber::Number(x) => *x,
            RawNumber::Text(x) => x.trim().parse::<f64>().ok()?,
        };
        if x.is_finite() {
            Some(x)
        } else {
            None
        }
    }
}

// CSV fields are always text, so this avoids leaning on untagged enums there
#[derive(Deserialize)]
struct CsvRecord {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lng: Option<String>,
}

impl From<CsvRecord> for RawRecord {
    fn from(rec: CsvRecord) -> Self {
        Self {
            city: rec.city,
            lat: rec.lat.map(RawNumber::Text),
            lng: rec.lng.map(RawNumber::Text),
        }
    }
}

pub fn read_json<R: std::io::Read>(reader: R) -> Result<Vec<RawRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: CsvRecord = rec?;
        records.push(rec.into());
    }
    Ok(records)
}

/// Drops records without a name, and parses the coordinates of everything else. Returns the
/// cities and how many records were dropped.
pub fn to_cities(records: Vec<RawRecord>) -> Result<(Vec<City>, usize)> {
    let mut cities = Vec::new();
    let mut nameless = 0;
    for rec in records {
        let name = match rec.city {
            Some(name) if !name.is_empty() => name,
            _ => {
                nameless += 1;
                continue;
            }
        };
        let lng = parse_field(&name, "lng", rec.lng.as_ref())?;
        let lat = parse_field(&name, "lat", rec.lat.as_ref())?;
        cities.push(City::new(name, Coordinate::new(lng, lat)));
    }
    Ok((cities, nameless))
}

fn parse_field(name: &str, field: &str, value: Option<&RawNumber>) -> Result<f64> {
    match value {
        Some(raw) => match raw.parse() {
            Some(x) => Ok(x),
            None => bail!("{name} has an invalid {field}: {raw:?}"),
        },
        None => bail!("{name} is missing {field}"),
    }
}
