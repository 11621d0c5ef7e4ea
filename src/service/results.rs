use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;
use crate::provider::{GeocoderAddressComponent, GeocoderResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

impl From<GeocoderAddressComponent> for AddressComponent {
    fn from(component: GeocoderAddressComponent) -> Self {
        Self {
            long_name: component.long_name,
            short_name: component.short_name,
            types: component.types,
        }
    }
}

/// A geocoding match in the facade's own shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodingResult {
    pub address: String,
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_components: Option<Vec<AddressComponent>>,
}

impl GeocodingResult {
    /// Forward lookups echo the queried address and report the matched
    /// location
    pub(crate) fn from_address_lookup(query: &str, raw: GeocoderResult) -> Self {
        Self {
            address: query.to_string(),
            location: raw.geometry.location,
            place_id: raw.place_id,
            formatted_address: raw.formatted_address,
            address_components: convert_components(raw.address_components),
        }
    }

    /// Reverse lookups report the matched address and echo the queried
    /// location
    pub(crate) fn from_location_lookup(location: LatLng, raw: GeocoderResult) -> Self {
        Self {
            address: raw.formatted_address.clone().unwrap_or_default(),
            location,
            place_id: raw.place_id,
            formatted_address: raw.formatted_address,
            address_components: convert_components(raw.address_components),
        }
    }
}

fn convert_components(
    components: Option<Vec<GeocoderAddressComponent>>,
) -> Option<Vec<AddressComponent>> {
    components.map(|list| list.into_iter().map(AddressComponent::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GeocoderGeometry;

    fn raw() -> GeocoderResult {
        GeocoderResult {
            formatted_address: Some("1600 Amphitheatre Pkwy, Mountain View, CA".to_string()),
            place_id: Some("pid".to_string()),
            address_components: Some(vec![GeocoderAddressComponent {
                long_name: "Mountain View".to_string(),
                short_name: "MV".to_string(),
                types: vec!["locality".to_string()],
            }]),
            geometry: GeocoderGeometry {
                location: LatLng::new(37.422, -122.084),
                location_type: None,
                viewport: None,
                bounds: None,
            },
            types: vec![],
            partial_match: None,
        }
    }

    #[test]
    fn test_forward_lookup_shape() {
        let result = GeocodingResult::from_address_lookup("googleplex", raw());
        assert_eq!(result.address, "googleplex");
        assert_eq!(result.location, LatLng::new(37.422, -122.084));
        assert_eq!(result.place_id.as_deref(), Some("pid"));
        assert_eq!(result.address_components.unwrap()[0].short_name, "MV");
    }

    #[test]
    fn test_reverse_lookup_shape() {
        let queried = LatLng::new(37.4, -122.1);
        let result = GeocodingResult::from_location_lookup(queried, raw());
        assert_eq!(result.address, "1600 Amphitheatre Pkwy, Mountain View, CA");
        assert_eq!(result.location, queried);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(GeocodingResult::from_address_lookup("q", raw())).unwrap();
        assert_eq!(json["placeId"], "pid");
        assert_eq!(json["addressComponents"][0]["longName"], "Mountain View");
    }
}
