//! Error types for descriptor loading, graph construction and generation.

use std::path::PathBuf;
use thiserror::Error;

pub type GenResult<T> = Result<T, GenError>;

#[derive(Debug, Error)]
pub enum GenError {
    #[error(
        "Could not find module definition for '{dependency}' which is required for '{module}'. \
         Add it to `system_libraries` if it is a system library."
    )]
    UnresolvedDependency { dependency: String, module: String },

    #[error("No toolchain module found.")]
    NoToolchain,

    #[error("Unknown module kind '{kind}' for module '{module}'")]
    UnknownModuleKind { kind: String, module: String },

    #[error("Unsupported type '{found}' for cached option '{option}' in module '{module}' (expected string or bool)")]
    UnsupportedOptionType {
        option: String,
        module: String,
        found: String,
    },

    #[error("Invalid module descriptor {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error("Failed to get module directory for descriptor '{}'", path.display())]
    InvalidDescriptorPath { path: PathBuf },

    #[error("Target name '{target}' is declared by more than one module")]
    TargetCollision { target: String },

    #[error("Circular dependency detected: {0}")]
    DependencyCycle(String),

    #[error("I/O error at {}: {error}", path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl GenError {
    pub fn unresolved(dependency: impl Into<String>, module: impl Into<String>) -> Self {
        Self::UnresolvedDependency {
            dependency: dependency.into(),
            module: module.into(),
        }
    }

    pub fn descriptor(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Descriptor {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }
}
