use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::prelude::HashMap;

/// A node in the host document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    pub node_id: u64,
    pub tag: String,
    pub id: Option<String>,
}

/// Either an element already in hand or the id of one to look up
#[derive(Debug, Clone, PartialEq)]
pub enum ElementTarget {
    Id(String),
    Element(Element),
}

impl ElementTarget {
    /// Human readable form used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Id(id) => id.clone(),
            Self::Element(element) => match &element.id {
                Some(id) => id.clone(),
                None => format!("<{}#{}>", element.tag, element.node_id),
            },
        }
    }
}

impl From<&str> for ElementTarget {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ElementTarget {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Element> for ElementTarget {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&Element> for ElementTarget {
    fn from(element: &Element) -> Self {
        Self::Element(element.clone())
    }
}

/// A `<script>` inserted into the document head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub is_async: bool,
    pub defer: bool,
}

impl ScriptTag {
    /// An async, deferred script, the way the provider asks to be loaded
    pub fn deferred(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            is_async: true,
            defer: true,
        }
    }
}

#[derive(Debug, Default)]
struct DocumentInner {
    next_node_id: u64,
    attached: HashMap<String, Element>,
    scripts: Vec<ScriptTag>,
}

impl DocumentInner {
    fn allocate(&mut self, tag: &str, id: Option<String>) -> Element {
        self.next_node_id += 1;
        Element {
            node_id: self.next_node_id,
            tag: tag.to_string(),
            id,
        }
    }
}

/// In-memory host document. Clones share the same underlying tree.
#[derive(Debug, Clone, Default)]
pub struct Document {
    inner: Arc<Mutex<DocumentInner>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a detached element that is not reachable by id
    pub fn create_element(&self, tag: &str) -> Element {
        self.lock().allocate(tag, None)
    }

    /// Creates an element with the given id and attaches it to the body.
    /// An element previously attached under the same id is replaced.
    pub fn append_element(&self, tag: &str, id: &str) -> Element {
        let mut inner = self.lock();
        let element = inner.allocate(tag, Some(id.to_string()));
        inner.attached.insert(id.to_string(), element.clone());
        element
    }

    /// Detaches the element with the given id, returning it if present
    pub fn remove_element(&self, id: &str) -> Option<Element> {
        self.lock().attached.remove(id)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.lock().attached.get(id).cloned()
    }

    /// Resolves a target to an attached element. Elements passed directly
    /// are returned as-is, ids are looked up.
    pub fn resolve(&self, target: &ElementTarget) -> Option<Element> {
        match target {
            ElementTarget::Id(id) => self.get_element_by_id(id),
            ElementTarget::Element(element) => Some(element.clone()),
        }
    }

    /// Inserts a script into the head. A script with the same `src` is
    /// replaced rather than duplicated.
    pub fn append_script(&self, script: ScriptTag) {
        let mut inner = self.lock();
        inner.scripts.retain(|existing| existing.src != script.src);
        inner.scripts.push(script);
    }

    /// Finds the first script whose `src` contains `needle`
    pub fn query_script(&self, needle: &str) -> Option<ScriptTag> {
        self.lock()
            .scripts
            .iter()
            .find(|script| script.src.contains(needle))
            .cloned()
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.lock().scripts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_lookup() {
        let document = Document::new();
        assert!(document.get_element_by_id("map").is_none());

        let element = document.append_element("div", "map");
        assert_eq!(document.get_element_by_id("map"), Some(element.clone()));
        assert_eq!(document.resolve(&"map".into()), Some(element));
        assert_eq!(document.resolve(&"missing".into()), None);
    }

    #[test]
    fn test_detached_elements_are_not_reachable() {
        let document = Document::new();
        let div = document.create_element("div");
        assert_eq!(div.id, None);
        assert_eq!(document.resolve(&div.clone().into()), Some(div));
        assert!(document.get_element_by_id("").is_none());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let document = Document::new();
        let a = document.create_element("div");
        let b = document.append_element("input", "search");
        assert_ne!(a.node_id, b.node_id);
    }

    #[test]
    fn test_scripts_are_not_duplicated() {
        let document = Document::new();
        document.append_script(ScriptTag::deferred("https://example.test/a.js"));
        document.append_script(ScriptTag::deferred("https://example.test/a.js"));
        document.append_script(ScriptTag::deferred("https://example.test/b.js"));

        assert_eq!(document.scripts().len(), 2);
        assert!(document.query_script("b.js").is_some());
        assert!(document.query_script("c.js").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let document = Document::new();
        let clone = document.clone();
        clone.append_element("div", "map");
        assert!(document.get_element_by_id("map").is_some());
    }

    #[test]
    fn test_describe_target() {
        assert_eq!(ElementTarget::from("no-such-id").describe(), "no-such-id");
        let document = Document::new();
        let div = document.create_element("div");
        assert_eq!(ElementTarget::from(&div).describe(), format!("<div#{}>", div.node_id));
    }
}
