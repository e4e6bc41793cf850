//! Storage port: repository traits for persistence.
//!
//! Lookups return `Option` and leave the "exactly one" policy to the services.
//! Writes that span several statements are atomic inside the adapter.

use std::future::Future;

use meterhub_domain::baseline::Baseline;
use meterhub_domain::error::MeterHubError;
use meterhub_domain::group::{Group, GroupChildren};
use meterhub_domain::id::{GroupId, MeterId};

/// Repository for persisting and querying [`Group`]s and their direct children.
pub trait GroupRepository {
    /// Insert a group that has no id yet and return it with the id assigned by the store.
    ///
    /// Fails with `InvalidState` before any IO when the group already has an id,
    /// and with `Conflict` when the name is taken.
    fn insert(&self, group: Group) -> impl Future<Output = Result<Group, MeterHubError>> + Send;

    /// Insert a group and link it under `parent_id` as a single atomic write.
    fn insert_child_of(
        &self,
        parent_id: GroupId,
        group: Group,
    ) -> impl Future<Output = Result<Group, MeterHubError>> + Send;

    /// Get a group by its unique identifier.
    fn get_by_id(
        &self,
        id: GroupId,
    ) -> impl Future<Output = Result<Option<Group>, MeterHubError>> + Send;

    /// Get a group by its unique name.
    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Group>, MeterHubError>> + Send;

    /// Get all groups.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Group>, MeterHubError>> + Send;

    /// Ids of the meters directly owned by the group. Empty for unknown groups.
    fn get_immediate_meters(
        &self,
        id: GroupId,
    ) -> impl Future<Output = Result<Vec<MeterId>, MeterHubError>> + Send;

    /// Ids of the groups directly owned by the group. Empty for unknown groups.
    fn get_immediate_groups(
        &self,
        id: GroupId,
    ) -> impl Future<Output = Result<Vec<GroupId>, MeterHubError>> + Send;

    /// Both child lists, read from a single point-in-time snapshot.
    fn get_immediate_children(
        &self,
        id: GroupId,
    ) -> impl Future<Output = Result<GroupChildren, MeterHubError>> + Send;

    /// Make `child_id` a direct child of `parent_id`.
    ///
    /// Fails with `NotFound` (writing nothing) when the child does not exist and
    /// with `Conflict` when the edge already exists or would close a cycle.
    fn associate_child(
        &self,
        parent_id: GroupId,
        child_id: GroupId,
    ) -> impl Future<Output = Result<(), MeterHubError>> + Send;
}

/// Repository for store-computed [`Baseline`]s.
pub trait BaselineRepository {
    /// Persist the baseline and return it carrying the value computed by the store.
    fn insert(
        &self,
        baseline: Baseline,
    ) -> impl Future<Output = Result<Baseline, MeterHubError>> + Send;

    /// All baselines of one meter. No existence check is made on the meter.
    fn get_all_for_meter(
        &self,
        meter_id: MeterId,
    ) -> impl Future<Output = Result<Vec<Baseline>, MeterHubError>> + Send;

    /// Every baseline in the store.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Baseline>, MeterHubError>> + Send;
}
