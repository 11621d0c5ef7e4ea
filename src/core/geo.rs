use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Renders as `lat,lng`, the form the web services accept for locations.
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A viewport or bounding box as the provider reports it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    #[serde(rename = "southwest")]
    pub south_west: LatLng,
    #[serde(rename = "northeast")]
    pub north_east: LatLng,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_display() {
        assert_eq!(LatLng::new(1.5, -2.25).to_string(), "1.5,-2.25");
    }

    #[test]
    fn test_bounds_wire_names() {
        let json = r#"{"northeast":{"lat":41.0,"lng":-73.0},"southwest":{"lat":40.0,"lng":-75.0}}"#;
        let bounds: LatLngBounds = serde_json::from_str(json).unwrap();
        assert_eq!(
            bounds,
            LatLngBounds {
                south_west: LatLng::new(40.0, -75.0),
                north_east: LatLng::new(41.0, -73.0),
            }
        );

        let rendered = serde_json::to_value(bounds).unwrap();
        assert_eq!(rendered["southwest"]["lat"], 40.0);
    }
}
