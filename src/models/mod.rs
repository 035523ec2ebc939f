//! Built-in model registry.
//!
//! The registry is an immutable lookup table of [`Model`] descriptors. The
//! built-in table holds the enzyme kinetics models and is created once, on
//! first use; callers may also build their own table from any models.

use std::sync::OnceLock;

use crate::error::{LmmcError, Result};
use crate::model::Model;

pub mod enzyme;

/// Immutable table of models, looked up by name.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<Model>,
}

impl ModelRegistry {
    /// Create a registry from the given models.
    ///
    /// Names must be unique.
    pub fn new(models: Vec<Model>) -> Result<Self> {
        for (i, model) in models.iter().enumerate() {
            if models[..i].iter().any(|m| m.name() == model.name()) {
                return Err(LmmcError::InvalidConfiguration(format!(
                    "model '{}' registered twice",
                    model.name()
                )));
            }
        }
        Ok(Self { models })
    }

    /// The registry of built-in enzyme models.
    pub fn builtin() -> &'static ModelRegistry {
        static BUILTIN: OnceLock<ModelRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| Self {
            models: enzyme::ALL.to_vec(),
        })
    }

    /// Find a model by name.
    pub fn lookup(&self, name: &str) -> Result<&Model> {
        self.models
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| LmmcError::UnknownModel(name.to_string()))
    }

    /// Registered model names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.models.iter().map(|m| m.name())
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
