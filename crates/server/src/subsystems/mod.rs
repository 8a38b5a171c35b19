//! Subsystems that answer `__service__` calls.

pub mod forum;
pub mod ikhaya;
pub mod portal;
pub mod wiki;

use services::{RegistryError, ServiceRegistry, SimpleDispatcher};
use tracing::debug;

use crate::config::Settings;

pub fn build_registry(settings: &Settings) -> Result<ServiceRegistry, RegistryError> {
    let portal = announce(
        "portal",
        portal::dispatcher(settings.autocomplete_users.clone()),
    );
    let forum = announce("forum", forum::dispatcher());
    let wiki = announce("wiki", wiki::dispatcher());
    let ikhaya = announce(
        "ikhaya",
        ikhaya::dispatcher(ikhaya::SuggestionBoard::seeded(
            settings.autocomplete_users.clone(),
        )),
    );

    let registry = ServiceRegistry::builder()
        .register("portal", portal)?
        .register("forum", forum)?
        .register_never_cache("wiki", wiki)?
        .register("ikhaya", ikhaya)?
        .build();
    Ok(registry)
}

fn announce(subsystem: &str, dispatcher: SimpleDispatcher) -> SimpleDispatcher {
    debug!(subsystem, actions = ?dispatcher.actions(), "service actions");
    dispatcher
}
