#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod coordinate;
mod records;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use coordinate::Coordinate;
pub use records::{RawNumber, RawRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityID(pub usize);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityID,
    pub name: String,
    pub coordinate: Coordinate,
}

impl City {
    /// The ID is assigned once the city belongs to a `Catalog`
    pub fn new<S: Into<String>>(name: S, coordinate: Coordinate) -> Self {
        Self {
            id: CityID(0),
            name: name.into(),
            coordinate,
        }
    }
}

/// Every candidate destination. Never empty, and every city has a name.
#[derive(Clone, Debug)]
pub struct Catalog {
    cities: Vec<City>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    pub fn from_path(path: &str) -> Result<Self> {
        let lower = path.to_lowercase();
        if lower.ends_with(".json") {
            Ok(Format::Json)
        } else if lower.ends_with(".csv") {
            Ok(Format::Csv)
        } else {
            bail!("Don't know how to read {path}; expected a .json or .csv file")
        }
    }
}

impl Catalog {
    pub fn new(mut cities: Vec<City>) -> Result<Self> {
        if cities.is_empty() {
            bail!("A catalog needs at least one city");
        }
        for (idx, city) in cities.iter_mut().enumerate() {
            if city.name.is_empty() {
                bail!("City #{idx} at {} has no name", city.coordinate);
            }
            if !city.coordinate.longitude.is_finite() || !city.coordinate.latitude.is_finite() {
                bail!("{} has an invalid coordinate {}", city.name, city.coordinate);
            }
            city.id = CityID(idx);
        }
        Ok(Self { cities })
    }

    pub fn from_records(records: Vec<RawRecord>) -> Result<Self> {
        let (cities, nameless) = records::to_cities(records)?;
        if nameless > 0 {
            warn!("Skipped {nameless} catalog records without a city name");
        }
        let catalog = Self::new(cities)?;
        info!("Loaded {} cities", catalog.len());
        Ok(catalog)
    }

    pub fn load_json<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::from_records(records::read_json(reader)?)
    }

    pub fn load_csv<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::from_records(records::read_csv(reader)?)
    }

    pub fn load(format: Format, bytes: &[u8]) -> Result<Self> {
        match format {
            Format::Json => Self::load_json(bytes),
            Format::Csv => Self::load_csv(bytes),
        }
    }

    /// The cities bundled with the app
    pub fn australia() -> Result<Self> {
        Self::load_json(&include_bytes!("../data/au.json")[..])
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn get(&self, id: CityID) -> Option<&City> {
        self.cities.get(id.0)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn contains(&self, city: &City) -> bool {
        self.cities.get(city.id.0) == Some(city)
    }
}
