//! Per-instance result envelope.

use crate::client::InstanceError;

/// What one instance answered.
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    /// A valid empty answer. Only trace lookups produce it.
    NotFound,
    Failed(InstanceError),
}

impl<T> Outcome<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Outcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&InstanceError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Transform a found value, keeping not-found and failures as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Found(value) => Outcome::Found(f(value)),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Found(_) => "found",
            Outcome::NotFound => "not_found",
            Outcome::Failed(_) => "failed",
        }
    }
}

/// Outcome of one instance, tagged with the instance name.
#[derive(Debug)]
pub struct InstanceResult<T> {
    pub instance: String,
    pub outcome: Outcome<T>,
}

impl<T> InstanceResult<T> {
    pub fn new(instance: impl Into<String>, outcome: Outcome<T>) -> Self {
        Self {
            instance: instance.into(),
            outcome,
        }
    }

    pub fn found(instance: impl Into<String>, value: T) -> Self {
        Self::new(instance, Outcome::Found(value))
    }

    pub fn not_found(instance: impl Into<String>) -> Self {
        Self::new(instance, Outcome::NotFound)
    }

    pub fn failed(instance: impl Into<String>, err: InstanceError) -> Self {
        Self::new(instance, Outcome::Failed(err))
    }
}
