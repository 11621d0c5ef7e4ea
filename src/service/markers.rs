use crate::provider::MarkerHandle;

/// Insertion-ordered set of markers created through the facade
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<MarkerHandle>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a marker. Returns false if it was already registered.
    pub fn insert(&mut self, marker: MarkerHandle) -> bool {
        if self.markers.contains(&marker) {
            return false;
        }
        self.markers.push(marker);
        true
    }

    /// Unregisters a marker. Unknown markers are ignored.
    pub fn remove(&mut self, marker: MarkerHandle) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| *m != marker);
        self.markers.len() != before
    }

    /// Empties the registry, yielding markers in insertion order
    pub fn drain(&mut self) -> Vec<MarkerHandle> {
        std::mem::take(&mut self.markers)
    }

    pub fn contains(&self, marker: MarkerHandle) -> bool {
        self.markers.contains(&marker)
    }

    pub fn handles(&self) -> &[MarkerHandle] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
