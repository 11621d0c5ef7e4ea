//! Opaque handles to objects living inside the provider runtime

use serde::{Deserialize, Serialize};

/// Defines a copyable handle newtype around a provider-assigned id
macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn id(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// A map constructed on a host element
    MapHandle,
    "map"
);
define_handle!(
    /// A marker overlay
    MarkerHandle,
    "marker"
);
define_handle!(
    /// A renderer drawing a route on a map
    RendererHandle,
    "renderer"
);
define_handle!(
    /// Place autocompletion attached to an input element
    AutocompleteHandle,
    "autocomplete"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        assert_eq!(MarkerHandle(7).to_string(), "marker#7");
        assert_eq!(MapHandle(1).id(), 1);
    }
}
