//! The typed facade over the provider runtime
//!
//! Every operation waits on the load gate, delegates to the loaded
//! [`MapsProvider`](crate::provider::MapsProvider), translates the provider
//! status into [`GeoError`](crate::GeoError), and reshapes the payload.

pub mod facade;
pub mod markers;
pub mod results;

pub use facade::{MapsService, MapsServiceBuilder};
pub use markers::MarkerRegistry;
pub use results::{AddressComponent, GeocodingResult};
