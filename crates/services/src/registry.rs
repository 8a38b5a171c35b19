use std::{collections::HashMap, fmt, sync::Arc};

use shared::domain::is_reserved_subsystem;
use thiserror::Error;
use tracing::warn;

use crate::dispatcher::Dispatcher;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("subsystem name must not be empty")]
    EmptyName,
    #[error("a dispatcher is already registered for subsystem '{0}'")]
    Duplicate(String),
}

/// One subsystem's dispatcher plus its caching policy.
#[derive(Clone)]
pub struct Registration {
    name: String,
    dispatcher: Arc<dyn Dispatcher>,
    never_cache: bool,
}

impl Registration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    pub fn never_cache(&self) -> bool {
        self.never_cache
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("never_cache", &self.never_cache)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ServiceRegistryBuilder {
    entries: HashMap<String, Registration>,
}

impl ServiceRegistryBuilder {
    pub fn register(
        self,
        name: impl Into<String>,
        dispatcher: impl Dispatcher + 'static,
    ) -> Result<Self, RegistryError> {
        self.insert(name.into(), Arc::new(dispatcher), false)
    }

    pub fn register_never_cache(
        self,
        name: impl Into<String>,
        dispatcher: impl Dispatcher + 'static,
    ) -> Result<Self, RegistryError> {
        self.insert(name.into(), Arc::new(dispatcher), true)
    }

    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            entries: self.entries,
        }
    }

    fn insert(
        mut self,
        name: String,
        dispatcher: Arc<dyn Dispatcher>,
        never_cache: bool,
    ) -> Result<Self, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.entries.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        if is_reserved_subsystem(&name) {
            warn!(subsystem = %name, "reserved subsystem name registered; it will never be routed");
        }
        self.entries.insert(
            name.clone(),
            Registration {
                name,
                dispatcher,
                never_cache,
            },
        );
        Ok(self)
    }
}

/// Read-only mapping from subsystem name to dispatcher, built once at startup.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    entries: HashMap<String, Registration>,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    pub fn get(&self, subsystem: &str) -> Option<&Registration> {
        self.entries.get(subsystem)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
