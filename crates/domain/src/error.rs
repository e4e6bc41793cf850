//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`MeterHubError`]
//! via `#[from]` or an explicit `From` impl. There are no `String` catch-all
//! variants: infrastructure failures are boxed behind [`MeterHubError::Schema`]
//! and [`MeterHubError::Storage`].

use crate::id::GroupId;
use crate::time::Timestamp;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error returned by services and repositories.
#[derive(Debug, thiserror::Error)]
pub enum MeterHubError {
    /// The input does not satisfy a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The caller violated a precondition of the operation.
    #[error("invalid state")]
    InvalidState(#[from] InvalidStateError),

    /// Exactly one row was expected but none matched.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The write conflicts with existing data.
    #[error("conflict")]
    Conflict(#[from] ConflictError),

    /// Creating or migrating the schema failed. Fatal at start-up.
    #[error("schema error")]
    Schema(#[source] BoxedError),

    /// Any other failure reported by the store.
    #[error("storage error")]
    Storage(#[source] BoxedError),
}

/// Input rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("interval start {start} is after its end {end}")]
    InvertedInterval { start: Timestamp, end: Timestamp },

    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },
}

/// A precondition of the requested operation does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStateError {
    /// Insert was called on an entity that already carries a store-assigned id.
    #[error("attempt to insert a {entity} that already has an id ({id})")]
    AlreadyPersisted { entity: &'static str, id: String },

    /// Insert was called on a baseline whose value was already computed.
    #[error("baseline value has already been computed")]
    BaselineAlreadyComputed,
}

/// The requested record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The write would break a uniqueness or hierarchy constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("{entity} {key} already exists")]
    UniqueConstraint { entity: &'static str, key: String },

    #[error("making group {child} a child of group {parent} would create a cycle")]
    Cycle { parent: GroupId, child: GroupId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_typed_errors_into_meterhub_error() {
        let err: MeterHubError = ValidationError::EmptyName.into();
        assert!(matches!(err, MeterHubError::Validation(ValidationError::EmptyName)));

        let err: MeterHubError = NotFoundError {
            entity: "Group",
            id: "7".to_string(),
        }
        .into();
        assert!(matches!(err, MeterHubError::NotFound(_)));
    }

    #[test]
    fn should_render_not_found_message() {
        let err = NotFoundError {
            entity: "Group",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Group 42 not found");
    }

    #[test]
    fn should_render_cycle_message_with_both_ids() {
        let err = ConflictError::Cycle {
            parent: GroupId::new(1),
            child: GroupId::new(2),
        };
        assert_eq!(
            err.to_string(),
            "making group 2 a child of group 1 would create a cycle"
        );
    }
}
