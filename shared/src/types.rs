//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Mango growing season
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Season {
    Summer,
    Monsoon,
    Winter,
}

impl Season {
    /// Parse a TitleCased season label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Summer" => Some(Season::Summer),
            "Monsoon" => Some(Season::Monsoon),
            "Winter" => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Monsoon => "Monsoon",
            Season::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Mango-growing districts of Karnataka with approximate centroids
const DISTRICT_COORDS: &[(&str, f64, f64)] = &[
    ("Tumkur", 13.34, 77.1),
    ("Kolar", 13.14, 78.13),
    ("Mandya", 12.52, 76.9),
    ("Hassan", 13.0, 76.1),
    ("Chikkaballapur", 13.43, 77.73),
    ("Ramanagara", 12.72, 77.28),
    ("Bangalore", 12.97, 77.59),
    ("Mysore", 12.2958, 76.6394),
];

/// Look up the coordinates of a known district.
///
/// Matching is exact after trimming surrounding whitespace.
pub fn district_coordinates(district: &str) -> Option<GpsCoordinates> {
    let key = district.trim();
    DISTRICT_COORDS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, lat, lon)| GpsCoordinates::new(*lat, *lon))
}

/// Names of every district in the coordinate table
pub fn known_districts() -> impl Iterator<Item = &'static str> {
    DISTRICT_COORDS.iter().map(|(name, _, _)| *name)
}
