//! InvocationConfig - dispatcher が invocation task を作る時の設定
//!
//! JSON で読み込みます。全フィールドに既定値があるので `{}` でも有効です。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::value::DEFAULT_MAX_DEPTH;
use crate::typed::codec::DEFAULT_MAX_MESSAGE_BYTES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationConfig {
    /// Append (creds, transaction, environment) to every local call.
    pub inject_session_context: bool,

    /// Upper bound for any single encoded argument or response.
    pub max_message_bytes: u64,

    /// Deepest `Value` nesting accepted when decoding a binary argument.
    pub max_nesting_depth: usize,

    /// Default environment the CLI assigns to scripted calls that name none.
    pub environment: String,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            inject_session_context: false,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
            environment: "default".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_message_bytes must be greater than zero")]
    ZeroMessageLimit,

    #[error("max_nesting_depth must be greater than zero")]
    ZeroNestingDepth,
}

impl InvocationConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_bytes == 0 {
            return Err(ConfigError::ZeroMessageLimit);
        }
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ZeroNestingDepth);
        }
        Ok(())
    }
}
