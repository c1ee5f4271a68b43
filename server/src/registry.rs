//! Tool registry: the handle tools are registered with and dispatch requests look tools up in.

use alloc::sync::Arc;
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use coverage_common::ToolDescriptor;
use tracing::info;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
    #[error("tool name must not be empty")]
    EmptyName,
}

/// Shared, cloneable registry of tool descriptors keyed by name.
///
/// Written during startup, read by every dispatch request afterwards.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<RwLock<BTreeMap<String, Arc<ToolDescriptor>>>>,
}

impl ToolRegistry {
    /// Registers a descriptor. The registry owns it for the rest of the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or a tool with the same name exists.
    pub fn register(&self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if descriptor.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }
        info!(
            tool = %descriptor.name,
            path = %descriptor.path,
            api_version = %descriptor.api_version,
            "Registered tool"
        );
        tools.insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<ToolDescriptor>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// All registered tools, ordered by name.
    pub fn list(&self) -> Vec<Arc<ToolDescriptor>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
