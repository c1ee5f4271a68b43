//! Tool descriptor: the static record a tool registers with the dispatcher.

use serde::{Deserialize, Serialize};

/// Schema version of [`ToolDescriptor`] understood by the dispatcher.
pub const DESCRIPTOR_API_VERSION: &str = "0.1";

/// Metadata advertising one invokable capability.
///
/// Field names serialize in camelCase, the shape the `/help` surface returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub api_version: String,
    /// Unique name within the registry, also the route segment clients call.
    pub name: String,
    /// Script path, relative to the tools directory.
    pub path: String,
    /// Shown on the help surface.
    pub description: String,
    #[serde(default)]
    pub example_url: String,
}

impl ToolDescriptor {
    /// The descriptor for the coverage tool served by this service.
    #[must_use]
    pub fn coverage() -> Self {
        Self {
            api_version: DESCRIPTOR_API_VERSION.to_string(),
            name: "coverage".to_string(),
            path: "coverage.sh".to_string(),
            description: "coverage service".to_string(),
            example_url: String::new(),
        }
    }
}
