//! `SQLite` implementation of [`GroupRepository`].
//!
//! Every statement lives in a free function generic over [`SqliteExecutor`] so
//! it runs unchanged against the pool or inside a transaction. The repository
//! methods pick which one.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqliteExecutor, SqlitePool};

use meterhub_app::ports::GroupRepository;
use meterhub_domain::error::{ConflictError, MeterHubError, NotFoundError};
use meterhub_domain::group::{Group, GroupChildren};
use meterhub_domain::id::{GroupId, MeterId};

use crate::error::{StorageError, is_foreign_key_violation, write_error};
use crate::pool::begin_write;

/// Wrapper for converting database rows into domain [`Group`].
struct Wrapper(Group);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;

        Ok(Self(Group {
            id: Some(GroupId::new(id)),
            name,
        }))
    }
}

const INSERT: &str = r#"INSERT INTO "groups" (name) VALUES (?) RETURNING id"#;
const SELECT_BY_ID: &str = r#"SELECT id, name FROM "groups" WHERE id = ?"#;
const SELECT_BY_NAME: &str = r#"SELECT id, name FROM "groups" WHERE name = ?"#;
const SELECT_ALL: &str = r#"SELECT id, name FROM "groups" ORDER BY id"#;
const SELECT_IMMEDIATE_METERS: &str =
    "SELECT meter_id FROM groups_immediate_meters WHERE group_id = ? ORDER BY meter_id";
const SELECT_IMMEDIATE_GROUPS: &str =
    "SELECT child_id FROM groups_immediate_children WHERE parent_id = ? ORDER BY child_id";
const INSERT_CHILD_GROUP: &str =
    "INSERT INTO groups_immediate_children (parent_id, child_id) VALUES (?, ?)";
const IS_DESCENDANT: &str =
    "SELECT EXISTS (SELECT 1 FROM groups_deep_children WHERE parent_id = ? AND child_id = ?)";

fn group_not_found(id: GroupId) -> MeterHubError {
    NotFoundError {
        entity: "Group",
        id: id.to_string(),
    }
    .into()
}

async fn insert_group<'e, E>(executor: E, name: &str) -> Result<GroupId, MeterHubError>
where
    E: SqliteExecutor<'e>,
{
    let id: i64 = sqlx::query_scalar(INSERT)
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|err| {
            write_error(err, || ConflictError::UniqueConstraint {
                entity: "Group",
                key: name.to_string(),
            })
        })?;

    Ok(GroupId::new(id))
}

async fn fetch_by_id<'e, E>(executor: E, id: GroupId) -> Result<Option<Group>, MeterHubError>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
        .bind(id.get())
        .fetch_optional(executor)
        .await
        .map_err(StorageError::from)?;

    Ok(row.map(|w| w.0))
}

async fn fetch_immediate_meters<'e, E>(
    executor: E,
    id: GroupId,
) -> Result<Vec<MeterId>, MeterHubError>
where
    E: SqliteExecutor<'e>,
{
    let ids: Vec<i64> = sqlx::query_scalar(SELECT_IMMEDIATE_METERS)
        .bind(id.get())
        .fetch_all(executor)
        .await
        .map_err(StorageError::from)?;

    Ok(ids.into_iter().map(MeterId::new).collect())
}

async fn fetch_immediate_groups<'e, E>(
    executor: E,
    id: GroupId,
) -> Result<Vec<GroupId>, MeterHubError>
where
    E: SqliteExecutor<'e>,
{
    let ids: Vec<i64> = sqlx::query_scalar(SELECT_IMMEDIATE_GROUPS)
        .bind(id.get())
        .fetch_all(executor)
        .await
        .map_err(StorageError::from)?;

    Ok(ids.into_iter().map(GroupId::new).collect())
}

/// `true` when `descendant` is reachable from `ancestor` through child edges.
async fn is_descendant<'e, E>(
    executor: E,
    ancestor: GroupId,
    descendant: GroupId,
) -> Result<bool, MeterHubError>
where
    E: SqliteExecutor<'e>,
{
    let found: bool = sqlx::query_scalar(IS_DESCENDANT)
        .bind(ancestor.get())
        .bind(descendant.get())
        .fetch_one(executor)
        .await
        .map_err(StorageError::from)?;

    Ok(found)
}

async fn insert_child_edge<'e, E>(
    executor: E,
    parent_id: GroupId,
    child_id: GroupId,
) -> Result<(), MeterHubError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(INSERT_CHILD_GROUP)
        .bind(parent_id.get())
        .bind(child_id.get())
        .execute(executor)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                return group_not_found(parent_id);
            }
            write_error(err, || ConflictError::UniqueConstraint {
                entity: "Group edge",
                key: format!("{parent_id} -> {child_id}"),
            })
        })?;

    Ok(())
}

/// Check both ends, refuse cycles, then write the edge. Runs on one connection
/// so the caller decides the transaction boundary.
async fn link_child(
    conn: &mut SqliteConnection,
    parent_id: GroupId,
    child_id: GroupId,
) -> Result<(), MeterHubError> {
    if fetch_by_id(&mut *conn, parent_id).await?.is_none() {
        return Err(group_not_found(parent_id));
    }
    if fetch_by_id(&mut *conn, child_id).await?.is_none() {
        return Err(group_not_found(child_id));
    }

    if parent_id == child_id || is_descendant(&mut *conn, child_id, parent_id).await? {
        return Err(ConflictError::Cycle {
            parent: parent_id,
            child: child_id,
        }
        .into());
    }

    insert_child_edge(&mut *conn, parent_id, child_id).await
}

/// `SQLite`-backed group repository.
pub struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl GroupRepository for SqliteGroupRepository {
    async fn insert(&self, group: Group) -> Result<Group, MeterHubError> {
        group.ensure_unpersisted()?;
        let id = insert_group(&self.pool, &group.name).await?;
        Ok(group.with_id(id))
    }

    async fn insert_child_of(
        &self,
        parent_id: GroupId,
        group: Group,
    ) -> Result<Group, MeterHubError> {
        group.ensure_unpersisted()?;

        let mut tx = begin_write(&self.pool).await?;
        if fetch_by_id(&mut *tx, parent_id).await?.is_none() {
            return Err(group_not_found(parent_id));
        }
        let id = insert_group(&mut *tx, &group.name).await?;
        insert_child_edge(&mut *tx, parent_id, id).await?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(group.with_id(id))
    }

    async fn get_by_id(&self, id: GroupId) -> Result<Option<Group>, MeterHubError> {
        fetch_by_id(&self.pool, id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Group>, MeterHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn get_all(&self) -> Result<Vec<Group>, MeterHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_immediate_meters(&self, id: GroupId) -> Result<Vec<MeterId>, MeterHubError> {
        fetch_immediate_meters(&self.pool, id).await
    }

    async fn get_immediate_groups(&self, id: GroupId) -> Result<Vec<GroupId>, MeterHubError> {
        fetch_immediate_groups(&self.pool, id).await
    }

    async fn get_immediate_children(&self, id: GroupId) -> Result<GroupChildren, MeterHubError> {
        // Both reads share one transaction, hence one snapshot.
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        let meters = fetch_immediate_meters(&mut *tx, id).await?;
        let groups = fetch_immediate_groups(&mut *tx, id).await?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(GroupChildren { meters, groups })
    }

    async fn associate_child(
        &self,
        parent_id: GroupId,
        child_id: GroupId,
    ) -> Result<(), MeterHubError> {
        let mut tx = begin_write(&self.pool).await?;
        link_child(&mut *tx, parent_id, child_id).await?;
        tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Config, Database, file_database};
    use meterhub_domain::error::InvalidStateError;

    async fn setup() -> (SqliteGroupRepository, Database) {
        let db = Config::new("sqlite::memory:").build().await.unwrap();
        (SqliteGroupRepository::new(db.pool().clone()), db)
    }

    fn group(name: &str) -> Group {
        Group::builder().name(name).build().unwrap()
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{table}""#))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_meter(db: &Database, name: &str) -> MeterId {
        let id: i64 = sqlx::query_scalar("INSERT INTO meters (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(db.pool())
            .await
            .unwrap();
        MeterId::new(id)
    }

    async fn attach_meter(db: &Database, group_id: GroupId, meter_id: MeterId) {
        sqlx::query("INSERT INTO groups_immediate_meters (group_id, meter_id) VALUES (?, ?)")
            .bind(group_id.get())
            .bind(meter_id.get())
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn should_assign_stable_id_when_inserting() {
        let (repo, _db) = setup().await;

        let created = repo.insert(group("Science")).await.unwrap();
        let id = created.id.expect("id should be assigned by the store");

        let by_name = repo.get_by_name("Science").await.unwrap().unwrap();
        assert_eq!(by_name.id, Some(id));
        assert_eq!(by_name.name, "Science");

        let by_id = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id, by_name);
    }

    #[tokio::test]
    async fn should_reject_reinsert_of_persisted_group() {
        let (repo, db) = setup().await;
        let stored = repo.insert(group("Library")).await.unwrap();

        let result = repo.insert(stored).await;

        assert!(matches!(
            result,
            Err(MeterHubError::InvalidState(
                InvalidStateError::AlreadyPersisted { .. }
            ))
        ));
        assert_eq!(count(&db, "groups").await, 1);
    }

    #[tokio::test]
    async fn should_keep_single_row_when_name_is_duplicated() {
        let (repo, db) = setup().await;
        repo.insert(group("Dorms")).await.unwrap();

        let result = repo.insert(group("Dorms")).await;

        assert!(matches!(
            result,
            Err(MeterHubError::Conflict(ConflictError::UniqueConstraint {
                entity: "Group",
                ..
            }))
        ));
        assert_eq!(count(&db, "groups").await, 1);
    }

    #[tokio::test]
    async fn should_return_none_when_group_not_found() {
        let (repo, _db) = setup().await;
        assert!(repo.get_by_id(GroupId::new(1)).await.unwrap().is_none());
        assert!(repo.get_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_all_groups() {
        let (repo, _db) = setup().await;
        repo.insert(group("A")).await.unwrap();
        repo.insert(group("B")).await.unwrap();

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn should_return_no_children_for_fresh_or_unknown_group() {
        let (repo, _db) = setup().await;
        let id = repo.insert(group("Fresh")).await.unwrap().id.unwrap();

        assert!(repo.get_immediate_groups(id).await.unwrap().is_empty());
        assert!(repo.get_immediate_meters(id).await.unwrap().is_empty());
        assert!(
            repo.get_immediate_groups(GroupId::new(999))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn should_list_only_direct_children() {
        let (repo, db) = setup().await;
        let campus = repo.insert(group("Campus")).await.unwrap().id.unwrap();
        let hall = repo.insert(group("Hall")).await.unwrap().id.unwrap();
        let wing = repo.insert(group("Wing")).await.unwrap().id.unwrap();
        repo.associate_child(campus, hall).await.unwrap();
        repo.associate_child(hall, wing).await.unwrap();

        let meter = insert_meter(&db, "Hall main").await;
        attach_meter(&db, hall, meter).await;

        assert_eq!(repo.get_immediate_groups(campus).await.unwrap(), vec![hall]);
        assert!(repo.get_immediate_meters(campus).await.unwrap().is_empty());

        let children = repo.get_immediate_children(hall).await.unwrap();
        assert_eq!(children.groups, vec![wing]);
        assert_eq!(children.meters, vec![meter]);
    }

    #[tokio::test]
    async fn should_not_write_edge_when_child_missing() {
        let (repo, db) = setup().await;
        let parent = repo.insert(group("Parent")).await.unwrap().id.unwrap();

        let result = repo.associate_child(parent, GroupId::new(77)).await;

        assert!(matches!(result, Err(MeterHubError::NotFound(_))));
        assert_eq!(count(&db, "groups_immediate_children").await, 0);
    }

    #[tokio::test]
    async fn should_report_not_found_when_parent_missing() {
        let (repo, db) = setup().await;
        let child = repo.insert(group("Child")).await.unwrap().id.unwrap();

        let result = repo.associate_child(GroupId::new(77), child).await;

        assert!(matches!(result, Err(MeterHubError::NotFound(_))));
        assert_eq!(count(&db, "groups_immediate_children").await, 0);
    }

    #[tokio::test]
    async fn should_reject_self_and_transitive_cycles() {
        let (repo, db) = setup().await;
        let a = repo.insert(group("A")).await.unwrap().id.unwrap();
        let b = repo.insert(group("B")).await.unwrap().id.unwrap();
        let c = repo.insert(group("C")).await.unwrap().id.unwrap();
        repo.associate_child(a, b).await.unwrap();
        repo.associate_child(b, c).await.unwrap();

        assert!(matches!(
            repo.associate_child(a, a).await,
            Err(MeterHubError::Conflict(ConflictError::Cycle { .. }))
        ));
        assert!(matches!(
            repo.associate_child(c, a).await,
            Err(MeterHubError::Conflict(ConflictError::Cycle { .. }))
        ));
        assert_eq!(count(&db, "groups_immediate_children").await, 2);

        // A diamond is not a cycle.
        repo.associate_child(a, c).await.unwrap();
    }

    #[tokio::test]
    async fn should_reject_duplicate_edge() {
        let (repo, _db) = setup().await;
        let a = repo.insert(group("A")).await.unwrap().id.unwrap();
        let b = repo.insert(group("B")).await.unwrap().id.unwrap();
        repo.associate_child(a, b).await.unwrap();

        assert!(matches!(
            repo.associate_child(a, b).await,
            Err(MeterHubError::Conflict(ConflictError::UniqueConstraint { .. }))
        ));
    }

    #[tokio::test]
    async fn should_create_and_link_child_atomically() {
        let (repo, db) = setup().await;
        let parent = repo.insert(group("Campus")).await.unwrap().id.unwrap();

        let child = repo.insert_child_of(parent, group("Annex")).await.unwrap();
        assert_eq!(
            repo.get_immediate_groups(parent).await.unwrap(),
            vec![child.id.unwrap()]
        );

        // Duplicate name: neither the group nor the edge is written.
        let result = repo.insert_child_of(parent, group("Annex")).await;
        assert!(matches!(result, Err(MeterHubError::Conflict(_))));
        assert_eq!(count(&db, "groups").await, 2);
        assert_eq!(count(&db, "groups_immediate_children").await, 1);

        // Missing parent: the group is not left behind unlinked.
        let result = repo.insert_child_of(GroupId::new(500), group("Stray")).await;
        assert!(matches!(result, Err(MeterHubError::NotFound(_))));
        assert!(repo.get_by_name("Stray").await.unwrap().is_none());
    }

    /// Writers add one meter and one child group per transaction while a reader
    /// keeps listing children. Every read must see both lists at the same version.
    #[tokio::test]
    async fn should_read_children_from_single_snapshot_under_concurrent_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_database(&dir).await;
        let repo = SqliteGroupRepository::new(db.pool().clone());
        let parent = repo.insert(group("Parent")).await.unwrap().id.unwrap();

        let writer_pool = db.pool().clone();
        let writer = tokio::spawn(async move {
            for step in 0..25 {
                let mut tx = begin_write(&writer_pool).await.unwrap();
                let meter: i64 =
                    sqlx::query_scalar("INSERT INTO meters (name) VALUES (?) RETURNING id")
                        .bind(format!("meter-{step}"))
                        .fetch_one(&mut *tx)
                        .await
                        .unwrap();
                sqlx::query(
                    "INSERT INTO groups_immediate_meters (group_id, meter_id) VALUES (?, ?)",
                )
                .bind(parent.get())
                .bind(meter)
                .execute(&mut *tx)
                .await
                .unwrap();
                tokio::task::yield_now().await;
                let child = insert_group(&mut *tx, &format!("child-{step}"))
                    .await
                    .unwrap();
                insert_child_edge(&mut *tx, parent, child).await.unwrap();
                tx.commit().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        while !writer.is_finished() {
            let children = repo.get_immediate_children(parent).await.unwrap();
            assert_eq!(children.meters.len(), children.groups.len());
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        let children = repo.get_immediate_children(parent).await.unwrap();
        assert_eq!(children.meters.len(), 25);
        assert_eq!(children.groups.len(), 25);

        db.close().await;
    }

    #[tokio::test]
    async fn should_create_children_concurrently_without_busy_errors() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_database(&dir).await;
        let repo = std::sync::Arc::new(SqliteGroupRepository::new(db.pool().clone()));
        let parent = repo.insert(group("Campus")).await.unwrap().id.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert_child_of(parent, group(&format!("Hall {n}")))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.get_immediate_groups(parent).await.unwrap().len(), 20);
        db.close().await;
    }

    #[tokio::test]
    async fn should_let_only_one_of_two_opposite_links_win() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_database(&dir).await;
        let repo = std::sync::Arc::new(SqliteGroupRepository::new(db.pool().clone()));
        let a = repo.insert(group("A")).await.unwrap().id.unwrap();
        let b = repo.insert(group("B")).await.unwrap().id.unwrap();

        let forward = tokio::spawn({
            let repo = repo.clone();
            async move { repo.associate_child(a, b).await }
        });
        let backward = tokio::spawn({
            let repo = repo.clone();
            async move { repo.associate_child(b, a).await }
        });
        let results = [forward.await.unwrap(), backward.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(MeterHubError::Conflict(ConflictError::Cycle { .. }))
        )));
        assert_eq!(count(&db, "groups_immediate_children").await, 1);
        db.close().await;
    }
}
