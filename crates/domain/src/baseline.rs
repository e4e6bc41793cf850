//! Baseline: a store-computed reference value for a meter.
//!
//! A baseline is described by two windows: the *calculation* range whose
//! readings the store averages, and the *application* range the resulting
//! value applies to. The value is never computed client-side.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidStateError, MeterHubError};
use crate::id::MeterId;
use crate::interval::TimeInterval;

/// A baseline for one meter.
///
/// `baseline_value` is `None` until the store has computed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub meter_id: MeterId,
    pub apply_range: TimeInterval,
    pub calc_range: TimeInterval,
    pub note: Option<String>,
    pub baseline_value: Option<f64>,
}

impl Baseline {
    /// A baseline request awaiting computation by the store.
    #[must_use]
    pub fn new(meter_id: MeterId, apply_range: TimeInterval, calc_range: TimeInterval) -> Self {
        Self {
            meter_id,
            apply_range,
            calc_range,
            note: None,
            baseline_value: None,
        }
    }

    #[must_use]
    pub fn with_note(self, note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..self
        }
    }

    /// Return a copy carrying the value computed by the store.
    #[must_use]
    pub fn with_value(self, value: f64) -> Self {
        Self {
            baseline_value: Some(value),
            ..self
        }
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.baseline_value.is_some()
    }

    /// Check that the value is still to be computed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateError::BaselineAlreadyComputed`] when a value is present.
    pub fn ensure_uncomputed(&self) -> Result<(), MeterHubError> {
        if self.is_computed() {
            return Err(InvalidStateError::BaselineAlreadyComputed.into());
        }
        Ok(())
    }
}
