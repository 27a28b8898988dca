use serde::Deserialize;

use crate::error::MapError;

/// Root configuration: parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// How documents are rendered to text.
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Multi-line output instead of compact.
    #[serde(default)]
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    2
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: default_indent(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, MapError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MapError::Config(e.to_string()).with_context(path))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, MapError> {
        toml::from_str(toml_str).map_err(|e| MapError::Config(e.to_string()))
    }
}
