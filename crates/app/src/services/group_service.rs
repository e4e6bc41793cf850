//! Group service: use-cases for the group hierarchy.

use meterhub_domain::error::{MeterHubError, NotFoundError};
use meterhub_domain::group::{Group, GroupChildren};
use meterhub_domain::id::{GroupId, MeterId};

use crate::ports::GroupRepository;

fn group_not_found(id: impl ToString) -> MeterHubError {
    NotFoundError {
        entity: "Group",
        id: id.to_string(),
    }
    .into()
}

/// Application service for group operations.
pub struct GroupService<R> {
    repo: R,
}

impl<R: GroupRepository> GroupService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new group after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::Validation`] for an empty name,
    /// [`MeterHubError::InvalidState`] when the group already has an id, or a
    /// conflict/storage error propagated from the repository.
    #[tracing::instrument(skip(self, group), fields(group_name = %group.name))]
    pub async fn create_group(&self, group: Group) -> Result<Group, MeterHubError> {
        group.validate()?;
        group.ensure_unpersisted()?;
        self.repo.insert(group).await
    }

    /// Create a new group directly under `parent_id`. Either both the group and
    /// the edge are written, or neither is.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_group`], plus [`MeterHubError::NotFound`] when the
    /// parent does not exist.
    #[tracing::instrument(skip(self, group), fields(group_name = %group.name))]
    pub async fn create_child_group(
        &self,
        parent_id: GroupId,
        group: Group,
    ) -> Result<Group, MeterHubError> {
        group.validate()?;
        group.ensure_unpersisted()?;
        self.repo.insert_child_of(parent_id, group).await
    }

    /// Look up a group by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::NotFound`] when no group with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_group(&self, id: GroupId) -> Result<Group, MeterHubError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| group_not_found(id))
    }

    /// Look up a group by its unique name.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::NotFound`] when no group is called `name`,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_group_by_name(&self, name: &str) -> Result<Group, MeterHubError> {
        self.repo
            .get_by_name(name)
            .await?
            .ok_or_else(|| group_not_found(name))
    }

    /// List all groups.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_groups(&self) -> Result<Vec<Group>, MeterHubError> {
        self.repo.get_all().await
    }

    /// Meters directly under the group. Unknown groups yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn immediate_meters(&self, id: GroupId) -> Result<Vec<MeterId>, MeterHubError> {
        self.repo.get_immediate_meters(id).await
    }

    /// Groups directly under the group. Unknown groups yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn immediate_groups(&self, id: GroupId) -> Result<Vec<GroupId>, MeterHubError> {
        self.repo.get_immediate_groups(id).await
    }

    /// Both direct child lists of the group, consistent with each other.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn immediate_children(&self, id: GroupId) -> Result<GroupChildren, MeterHubError> {
        self.repo.get_immediate_children(id).await
    }

    /// Link an existing group under an existing parent.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::NotFound`] when either group is missing, or
    /// [`MeterHubError::Conflict`] when the edge exists or would create a cycle.
    /// Both checks happen inside the repository's write transaction.
    #[tracing::instrument(skip(self))]
    pub async fn add_child_group(
        &self,
        parent_id: GroupId,
        child_id: GroupId,
    ) -> Result<(), MeterHubError> {
        self.repo.associate_child(parent_id, child_id).await
    }
}
