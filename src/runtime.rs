//! Runtime abstraction for background work
//!
//! Loaders and providers settle their completion signals from spawned tasks
//! rather than from the caller's task. Everything goes through the global
//! [`AsyncSpawner`].

use std::sync::OnceLock;

use crate::prelude::{Future, Pin};

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future that runs to completion in the background
    fn spawn_boxed(&self, future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>);
}

/// Spawn a future on the global runtime
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use ::tokio::runtime::{Builder, Handle};

    /// Spawns onto the ambient tokio runtime. Outside of one, each task gets
    /// a dedicated thread driving a current-thread runtime.
    pub struct TokioSpawner;

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>) {
            match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(future);
                }
                Err(_) => ThreadSpawner.spawn_boxed(future),
            }
        }
    }

    /// Runs every task to completion on its own OS thread
    pub struct ThreadSpawner;

    impl AsyncSpawner for ThreadSpawner {
        fn spawn_boxed(&self, future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>) {
            let spawned = std::thread::Builder::new()
                .name("geotype-task".to_string())
                .spawn(move || match Builder::new_current_thread().enable_all().build() {
                    Ok(rt) => rt.block_on(future),
                    Err(e) => log::error!("failed to build task runtime: {}", e),
                });

            if let Err(e) = spawned {
                log::error!("failed to spawn task thread: {}", e);
            }
        }
    }
}

/// Global runtime instance
static RUNTIME: OnceLock<Box<dyn AsyncSpawner>> = OnceLock::new();

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| Box::new(spawners::TokioSpawner))
        .as_ref()
}
