//! PostgreSQL-backed `GenealogyRepository` implementation using Diesel ORM.
//!
//! Every mutation runs in one transaction together with the update of the
//! owning tree's `last_modified_at`. Relationship inserts lock both
//! individuals `FOR SHARE` while checking membership so a concurrent delete
//! cannot leave the new row dangling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{GenealogyRepository, GenealogyRepositoryError, IndividualRemoval};
use crate::domain::{
    Individual, IndividualDetails, IndividualId, NamedRelationship, Relationship,
    RelationshipDetails, RelationshipId, TreeId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    IndividualRow, NamedRelationshipRow, NewIndividualRow, NewRelationshipRow, RelationshipRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{family_trees, individuals, relationships};

const NAMED_RELATIONSHIPS_SQL: &str = "\
SELECT r.id, r.tree_id, r.individual_id1, r.individual_id2, r.relationship_type, \
       r.start_date, r.end_date, \
       i1.first_name AS first_name1, i1.last_name AS last_name1, \
       i2.first_name AS first_name2, i2.last_name AS last_name2 \
FROM relationships r \
JOIN individuals i1 ON i1.id = r.individual_id1 AND i1.tree_id = r.tree_id \
JOIN individuals i2 ON i2.id = r.individual_id2 AND i2.tree_id = r.tree_id \
WHERE r.tree_id = $1 \
ORDER BY r.id";

/// Diesel-backed implementation of the `GenealogyRepository` port.
#[derive(Clone)]
pub struct DieselGenealogyRepository {
    pool: DbPool,
}

impl DieselGenealogyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction: either Diesel or a domain rejection that
/// must roll the transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Rejected(GenealogyRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> GenealogyRepositoryError {
    map_basic_pool_error(error, GenealogyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GenealogyRepositoryError {
    map_basic_diesel_error(
        error,
        GenealogyRepositoryError::query,
        GenealogyRepositoryError::connection,
    )
}

fn map_tx_error(error: TxError) -> GenealogyRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Rejected(error) => error,
    }
}

async fn touch_tree(
    conn: &mut AsyncPgConnection,
    tree_id: i64,
    modified_at: DateTime<Utc>,
) -> Result<(), diesel::result::Error> {
    diesel::update(family_trees::table.filter(family_trees::id.eq(tree_id)))
        .set(family_trees::last_modified_at.eq(modified_at))
        .execute(conn)
        .await
        .map(|_| ())
}

#[async_trait]
impl GenealogyRepository for DieselGenealogyRepository {
    async fn list_individuals(
        &self,
        tree_id: TreeId,
    ) -> Result<Vec<Individual>, GenealogyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<IndividualRow> = individuals::table
            .filter(individuals::tree_id.eq(tree_id.get()))
            .order_by(individuals::id)
            .select(IndividualRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Individual::from).collect())
    }

    async fn list_relationships_with_names(
        &self,
        tree_id: TreeId,
    ) -> Result<Vec<NamedRelationship>, GenealogyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NamedRelationshipRow> = diesel::sql_query(NAMED_RELATIONSHIPS_SQL)
            .bind::<BigInt, _>(tree_id.get())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(NamedRelationship::from).collect())
    }

    async fn insert_individual(
        &self,
        tree_id: TreeId,
        details: &IndividualDetails,
        modified_at: DateTime<Utc>,
    ) -> Result<Individual, GenealogyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tree = tree_id.get();
        let new_row = NewIndividualRow {
            tree_id: tree,
            first_name: details.first_name(),
            last_name: details.last_name(),
            gender: details.gender(),
            birth_date: details.birth_date(),
            death_date: details.death_date(),
            occupation: details.occupation(),
        };

        let row = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let row: IndividualRow = diesel::insert_into(individuals::table)
                        .values(&new_row)
                        .returning(IndividualRow::as_returning())
                        .get_result(conn)
                        .await?;
                    touch_tree(conn, tree, modified_at).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(Individual::from(row))
    }

    async fn delete_individual(
        &self,
        tree_id: TreeId,
        individual_id: IndividualId,
        modified_at: DateTime<Utc>,
    ) -> Result<IndividualRemoval, GenealogyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tree = tree_id.get();
        let target = individual_id.get();

        let removed_relationships = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let owned: Vec<i64> = individuals::table
                        .filter(individuals::id.eq(target))
                        .filter(individuals::tree_id.eq(tree))
                        .select(individuals::id)
                        .for_update()
                        .load(conn)
                        .await?;
                    if owned.is_empty() {
                        return Err(TxError::Rejected(GenealogyRepositoryError::not_found(
                            "individual",
                            target,
                        )));
                    }

                    let removed = diesel::delete(
                        relationships::table.filter(
                            relationships::individual_id1
                                .eq(target)
                                .or(relationships::individual_id2.eq(target)),
                        ),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(individuals::table.filter(individuals::id.eq(target)))
                        .execute(conn)
                        .await?;
                    touch_tree(conn, tree, modified_at).await?;
                    Ok(removed)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(IndividualRemoval {
            individual_id,
            removed_relationships,
        })
    }

    async fn insert_relationship(
        &self,
        tree_id: TreeId,
        details: &RelationshipDetails,
        modified_at: DateTime<Utc>,
    ) -> Result<Relationship, GenealogyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tree = tree_id.get();
        let requested = vec![details.individual_id1().get(), details.individual_id2().get()];
        let new_row = NewRelationshipRow {
            tree_id: tree,
            individual_id1: details.individual_id1().get(),
            individual_id2: details.individual_id2().get(),
            relationship_type: details.relationship_type(),
            start_date: details.start_date(),
            end_date: details.end_date(),
        };

        let row = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let members: Vec<i64> = individuals::table
                        .filter(individuals::tree_id.eq(tree))
                        .filter(individuals::id.eq_any(requested))
                        .select(individuals::id)
                        .for_share()
                        .load(conn)
                        .await?;
                    if members.len() != 2 {
                        return Err(TxError::Rejected(
                            GenealogyRepositoryError::foreign_individual(tree_id),
                        ));
                    }

                    let row: RelationshipRow = diesel::insert_into(relationships::table)
                        .values(&new_row)
                        .returning(RelationshipRow::as_returning())
                        .get_result(conn)
                        .await?;
                    touch_tree(conn, tree, modified_at).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(Relationship::from(row))
    }

    async fn delete_relationship(
        &self,
        tree_id: TreeId,
        relationship_id: RelationshipId,
        modified_at: DateTime<Utc>,
    ) -> Result<(), GenealogyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tree = tree_id.get();
        let target = relationship_id.get();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let deleted = diesel::delete(
                    relationships::table
                        .filter(relationships::id.eq(target))
                        .filter(relationships::tree_id.eq(tree)),
                )
                .execute(conn)
                .await?;
                if deleted == 0 {
                    return Err(TxError::Rejected(GenealogyRepositoryError::not_found(
                        "relationship",
                        target,
                    )));
                }
                touch_tree(conn, tree, modified_at).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}
