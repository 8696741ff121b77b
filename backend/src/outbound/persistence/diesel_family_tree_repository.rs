//! PostgreSQL-backed `FamilyTreeRepository` implementation using Diesel ORM.
//!
//! First-visit creation relies on the unique index over `owner_id`: the
//! insert is `ON CONFLICT DO NOTHING`, and the following select sees either
//! the new row or the one a concurrent caller created.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{FamilyTreeRepository, FamilyTreeRepositoryError};
use crate::domain::{FamilyTree, NewFamilyTree, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{FamilyTreeRow, NewFamilyTreeRow};
use super::pool::{DbPool, PoolError};
use super::schema::family_trees;

/// Diesel-backed implementation of the `FamilyTreeRepository` port.
#[derive(Clone)]
pub struct DieselFamilyTreeRepository {
    pool: DbPool,
}

impl DieselFamilyTreeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FamilyTreeRepositoryError {
    map_basic_pool_error(error, FamilyTreeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FamilyTreeRepositoryError {
    map_basic_diesel_error(
        error,
        FamilyTreeRepositoryError::query,
        FamilyTreeRepositoryError::connection,
    )
}

#[async_trait]
impl FamilyTreeRepository for DieselFamilyTreeRepository {
    async fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<FamilyTree>, FamilyTreeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FamilyTreeRow> = family_trees::table
            .filter(family_trees::owner_id.eq(owner_id.get()))
            .select(FamilyTreeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(FamilyTree::from))
    }

    async fn find_or_create(
        &self,
        tree: &NewFamilyTree,
    ) -> Result<FamilyTree, FamilyTreeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner_id = tree.owner_id.get();
        let new_row = NewFamilyTreeRow {
            tree_name: tree.name.as_str(),
            owner_id,
            description: tree.description.as_deref(),
            is_public: tree.is_public,
            created_at: tree.created_at,
            last_modified_at: tree.created_at,
        };

        let row = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::insert_into(family_trees::table)
                        .values(&new_row)
                        .on_conflict(family_trees::owner_id)
                        .do_nothing()
                        .execute(conn)
                        .await?;

                    family_trees::table
                        .filter(family_trees::owner_id.eq(owner_id))
                        .select(FamilyTreeRow::as_select())
                        .first(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(FamilyTree::from(row))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for tree repository error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert_eq!(err, FamilyTreeRepositoryError::connection("bad url"));
    }

    #[rstest]
    fn missing_row_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(err, FamilyTreeRepositoryError::query("record not found"));
    }
}
