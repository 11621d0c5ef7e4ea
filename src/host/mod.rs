//! The host document the provider runtime is loaded into
//!
//! Rendering is out of scope, so the document is an in-memory stand-in for
//! a browser DOM: it resolves element ids, hands out detached elements, and
//! records the loader scripts inserted into its head.

pub mod document;

pub use document::{Document, Element, ElementTarget, ScriptTag};
