//! Group: a named node in the meter hierarchy.
//!
//! Groups own child groups and meters through two "immediate" relations.
//! The transitive closure of those relations lives in the store.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidStateError, MeterHubError, ValidationError};
use crate::id::{GroupId, MeterId};

/// A named hierarchy node.
///
/// `id` is `None` until the store has assigned one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<GroupId>,
    pub name: String,
}

impl Group {
    /// Create a builder for constructing a [`Group`].
    #[must_use]
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), MeterHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Check that this group has not been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::InvalidState`] when `id` is already set.
    pub fn ensure_unpersisted(&self) -> Result<(), MeterHubError> {
        match self.id {
            Some(id) => Err(InvalidStateError::AlreadyPersisted {
                entity: "Group",
                id: id.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Return a copy carrying the id assigned by the store.
    #[must_use]
    pub fn with_id(self, id: GroupId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

/// Step-by-step builder for [`Group`].
#[derive(Debug, Default)]
pub struct GroupBuilder {
    id: Option<GroupId>,
    name: Option<String>,
}

impl GroupBuilder {
    #[must_use]
    pub fn id(mut self, id: GroupId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Consume the builder, validate, and return a [`Group`].
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Group, MeterHubError> {
        let group = Group {
            id: self.id,
            name: self.name.unwrap_or_default(),
        };
        group.validate()?;
        Ok(group)
    }
}

/// Direct (non-transitive) children of a group, read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChildren {
    pub meters: Vec<MeterId>,
    pub groups: Vec<GroupId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_unpersisted_group_when_name_provided() {
        let group = Group::builder().name("Science Building").build().unwrap();
        assert_eq!(group.name, "Science Building");
        assert!(group.id.is_none());
        assert!(group.ensure_unpersisted().is_ok());
    }

    #[test]
    fn should_return_validation_error_when_name_is_blank() {
        let result = Group::builder().name("   ").build();
        assert!(matches!(
            result,
            Err(MeterHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_reinsert_when_id_is_set() {
        let group = Group::builder()
            .id(GroupId::new(4))
            .name("Library")
            .build()
            .unwrap();
        assert!(matches!(
            group.ensure_unpersisted(),
            Err(MeterHubError::InvalidState(
                InvalidStateError::AlreadyPersisted { entity: "Group", .. }
            ))
        ));
    }

    #[test]
    fn should_keep_name_when_attaching_id() {
        let group = Group::builder().name("Dorms").build().unwrap();
        let stored = group.with_id(GroupId::new(9));
        assert_eq!(stored.id, Some(GroupId::new(9)));
        assert_eq!(stored.name, "Dorms");
    }

    #[test]
    fn should_serialize_children_as_plain_id_lists() {
        let children = GroupChildren {
            meters: vec![MeterId::new(1), MeterId::new(2)],
            groups: vec![GroupId::new(5)],
        };
        let json = serde_json::to_value(&children).unwrap();
        assert_eq!(json, serde_json::json!({ "meters": [1, 2], "groups": [5] }));
    }
}
