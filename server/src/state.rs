use alloc::sync::Arc;
use core::time::Duration;

use crate::{dispatch::Dispatcher, registry::ToolRegistry};

/// Application state shared across request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registered tools, injected so handlers never reach for global state.
    pub registry: ToolRegistry,
    /// Spawns the scripts of registered tools.
    pub dispatcher: Arc<Dispatcher>,
    /// Deadline for the run request a socket client sends after the upgrade.
    pub socket_request_timeout: Duration,
}

impl AppState {
    pub fn new(registry: ToolRegistry, dispatcher: Dispatcher, socket_request_timeout: Duration) -> Self {
        Self {
            registry,
            dispatcher: Arc::new(dispatcher),
            socket_request_timeout,
        }
    }
}
