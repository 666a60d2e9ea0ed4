//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Only malformed static configuration is an error. Everything that can go
/// wrong during a tick is absorbed where it happens, so a training loop keeps
/// advancing.
#[derive(Error, Debug, PartialEq)]
pub enum NavError {
    /// A configuration value is out of its valid range.
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,

        /// What is wrong with the value.
        reason: String,
    },
}

impl NavError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Checks that `v` is a finite number.
pub(crate) fn finite(field: &'static str, v: f32) -> Result<(), NavError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(NavError::invalid(field, format!("{} is not finite", v)))
    }
}

/// Checks that `v` is a finite, non-negative number.
pub(crate) fn non_negative(field: &'static str, v: f32) -> Result<(), NavError> {
    finite(field, v)?;
    if v >= 0.0 {
        Ok(())
    } else {
        Err(NavError::invalid(field, format!("{} is negative", v)))
    }
}
