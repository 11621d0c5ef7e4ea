//! Lazy, single-flight loading of the provider runtime
//!
//! [`LoadGate`] guarantees the runtime is bootstrapped at most once per
//! successful attempt and parks every caller that arrives while a load is
//! in flight. The actual fetch is delegated to a [`ScriptLoader`], which
//! reports back through the one-shot [`LoadSignal`] it is handed.

pub mod gate;
pub mod script;

pub use gate::{LoadFailure, LoadGate, LoadSignal, LoadState};
pub use script::{HttpLoader, ReadyLoader, ScriptLoader};
