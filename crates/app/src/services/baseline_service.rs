//! Baseline service: use-cases for store-computed baselines.

use meterhub_domain::baseline::Baseline;
use meterhub_domain::error::MeterHubError;
use meterhub_domain::id::MeterId;

use crate::ports::BaselineRepository;

/// Application service for baseline operations.
pub struct BaselineService<R> {
    repo: R,
}

impl<R: BaselineRepository> BaselineService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Ask the store to compute and persist a baseline.
    ///
    /// The returned baseline carries the store's value; it is the only
    /// authoritative one.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::InvalidState`] when the baseline already has a
    /// value, [`MeterHubError::NotFound`] when the meter or its readings are
    /// missing, or a storage error from the repository.
    #[tracing::instrument(skip(self, baseline), fields(meter_id = %baseline.meter_id))]
    pub async fn create_baseline(&self, baseline: Baseline) -> Result<Baseline, MeterHubError> {
        baseline.ensure_uncomputed()?;
        let stored = self.repo.insert(baseline).await?;
        tracing::debug!(value = ?stored.baseline_value, "baseline computed");
        Ok(stored)
    }

    /// List every baseline.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_baselines(&self) -> Result<Vec<Baseline>, MeterHubError> {
        self.repo.get_all().await
    }

    /// List the baselines of one meter.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn baselines_for_meter(
        &self,
        meter_id: MeterId,
    ) -> Result<Vec<Baseline>, MeterHubError> {
        self.repo.get_all_for_meter(meter_id).await
    }
}
