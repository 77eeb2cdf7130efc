//! Declaration parsing and validation error types

use thiserror::Error;

pub type DeclResult<T> = Result<T, DeclError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclError {
    #[error("Unknown context value '{token}' in predicate (expected a platform, target kind, or build environment)")]
    UnknownContextValue { token: String },

    #[error("Predicate syntax error at offset {offset}: {message}")]
    PredicateSyntax { offset: usize, message: String },

    #[error("Invalid module name: {0}")]
    InvalidModuleName(String),

    #[error("Invalid target name: {0}")]
    InvalidTargetName(String),

    #[error("Target '{target}' lists unknown extra module '{module}'")]
    UnknownExtraModule { target: String, module: String },

    #[error("Failed to parse declarations: {0}")]
    Parse(String),
}

impl DeclError {
    /// Create an unknown context value error
    pub fn unknown_token(token: impl Into<String>) -> Self {
        Self::UnknownContextValue {
            token: token.into(),
        }
    }

    /// Create a predicate syntax error
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::PredicateSyntax {
            offset,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for DeclError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for DeclError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
