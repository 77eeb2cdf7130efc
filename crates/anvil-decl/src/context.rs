//! Build context vocabulary: platforms, target kinds, build environments
//!
//! These enums are the closed vocabulary that applicability predicates are
//! evaluated against. Keeping them enumerated (rather than free strings)
//! makes unknown-token detection exhaustive at declaration parse time.

use crate::error::DeclError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a module or target can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Win64,
    Mac,
    Linux,
    Android,
    Ios,
}

impl Platform {
    /// All known platforms, in declaration-stable order
    pub const ALL: [Platform; 5] = [
        Platform::Win64,
        Platform::Mac,
        Platform::Linux,
        Platform::Android,
        Platform::Ios,
    ];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win64 => write!(f, "win64"),
            Self::Mac => write!(f, "mac"),
            Self::Linux => write!(f, "linux"),
            Self::Android => write!(f, "android"),
            Self::Ios => write!(f, "ios"),
        }
    }
}

impl FromStr for Platform {
    type Err = DeclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "win64" => Ok(Self::Win64),
            "mac" => Ok(Self::Mac),
            "linux" => Ok(Self::Linux),
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            _ => Err(DeclError::unknown_token(s)),
        }
    }
}

/// Kind of build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Standalone game / primary application
    Game,
    /// Networked client without server code
    Client,
    /// Dedicated server
    Server,
    /// Editor / tooling host
    Editor,
    /// Standalone utility program
    Program,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game => write!(f, "game"),
            Self::Client => write!(f, "client"),
            Self::Server => write!(f, "server"),
            Self::Editor => write!(f, "editor"),
            Self::Program => write!(f, "program"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = DeclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "game" => Ok(Self::Game),
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            "editor" => Ok(Self::Editor),
            "program" => Ok(Self::Program),
            _ => Err(DeclError::unknown_token(s)),
        }
    }
}

/// Build environment mode for a target
///
/// `Shared` targets may share precompiled headers and intermediates with
/// other shared targets; `Unique` targets are fully isolated builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildEnvironment {
    Shared,
    Unique,
}

impl fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Unique => write!(f, "unique"),
        }
    }
}

impl FromStr for BuildEnvironment {
    type Err = DeclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "unique" => Ok(Self::Unique),
            _ => Err(DeclError::unknown_token(s)),
        }
    }
}

/// Concrete build context a resolution run is performed against
///
/// Every applicability predicate is a pure, total function of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildContext {
    pub platform: Platform,
    pub target_kind: TargetKind,
    pub build_env: BuildEnvironment,
}

impl BuildContext {
    /// Create a new build context
    pub fn new(platform: Platform, target_kind: TargetKind, build_env: BuildEnvironment) -> Self {
        Self {
            platform,
            target_kind,
            build_env,
        }
    }
}

impl fmt::Display for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.platform, self.target_kind, self.build_env
        )
    }
}
