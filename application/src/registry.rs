//! Process-wide tool registry
//!
//! A name → factory table that lets adapter kinds register themselves at
//! startup without the orchestrator knowing every concrete type:
//!
//! ```ignore
//! use crosslint_application::registry::ToolRegistry;
//!
//! ToolRegistry::register("cppcheck", || Ok(Arc::new(CppcheckAdapter::new()) as _));
//!
//! let adapter = ToolRegistry::create("cppcheck").expect("registered");
//! ```
//!
//! Prefer injecting adapter instances straight into the
//! [`AnalysisOrchestrator`](crate::AnalysisOrchestrator) where the call site
//! can build them; the registry is for code that only knows names.
//!
//! Registration order between independent registrants is unspecified. The
//! table is guarded by a mutex; factories are invoked outside the lock.

use crate::ports::tool_adapter::{AdapterError, ToolAdapter};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Builds a fresh adapter instance.
pub type AdapterFactory =
    Arc<dyn Fn() -> Result<Arc<dyn ToolAdapter>, AdapterError> + Send + Sync>;

static FACTORIES: LazyLock<Mutex<HashMap<String, AdapterFactory>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn factories() -> MutexGuard<'static, HashMap<String, AdapterFactory>> {
    FACTORIES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Global adapter factory table
pub struct ToolRegistry;

impl ToolRegistry {
    /// Register a factory under `name`. A later registration for the same
    /// name replaces the earlier one.
    pub fn register<F>(name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn ToolAdapter>, AdapterError> + Send + Sync + 'static,
    {
        let name = name.into();
        let replaced = factories().insert(name.clone(), Arc::new(factory)).is_some();
        debug!(tool = %name, replaced, "Registered adapter factory");
    }

    /// Build a new adapter. `None` when the name is unknown or the factory
    /// fails.
    pub fn create(name: &str) -> Option<Arc<dyn ToolAdapter>> {
        let factory = factories().get(name).cloned()?;
        match factory() {
            Ok(adapter) => Some(adapter),
            Err(e) => {
                warn!(tool = name, error = %e, "Adapter factory failed");
                None
            }
        }
    }

    /// All registered names, sorted.
    pub fn list() -> Vec<String> {
        let mut names: Vec<String> = factories().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a factory exists for `name`. Says nothing about whether the
    /// adapter's external program is installed.
    pub fn is_registered(name: &str) -> bool {
        factories().contains_key(name)
    }

    /// Remove every registration.
    pub fn clear() {
        factories().clear();
    }
}
