//! Tests for the family tree service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockFamilyTreeRepository, MockGenealogyRepository};
use crate::domain::{ErrorCode, NewFamilyTree, TreeId};
use crate::test_support::{InMemoryStore, MutableClock};

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

struct Harness {
    store: Arc<InMemoryStore>,
    clock: Arc<MutableClock>,
    service: FamilyTreeService<InMemoryStore, InMemoryStore>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::default());
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    ));
    let service = FamilyTreeService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Harness {
        store,
        clock,
        service,
    }
}

fn person(first: &str, last: &str) -> IndividualDetails {
    IndividualDetails::builder(first, last)
        .gender("F")
        .birth_date("1970-01-01")
        .occupation("Teacher")
        .build()
        .expect("valid individual")
}

fn link(a: IndividualId, b: IndividualId, kind: &str) -> RelationshipDetails {
    RelationshipDetails::try_new(a, b, kind, "2000-06-01", None).expect("valid relationship")
}

#[rstest]
#[tokio::test]
async fn first_mutation_creates_the_tree(harness: Harness) {
    harness
        .service
        .add_individual(ALICE, person("Ann", "Smith"))
        .await
        .expect("individual added");

    let tree = harness.service.tree(ALICE).await.expect("tree resolves");
    assert_eq!(tree.owner_id, ALICE);
    assert_eq!(tree.name, "1's Family Tree");
    assert_eq!(harness.store.tree_count(), 1);
}

#[rstest]
#[tokio::test]
async fn mutations_advance_last_modified(harness: Harness) {
    let created = harness.service.tree(ALICE).await.expect("tree").created_at;
    let bea = harness
        .service
        .add_individual(ALICE, person("Bea", "Smith"))
        .await
        .expect("individual added");
    let mut previous = harness
        .service
        .tree(ALICE)
        .await
        .expect("tree")
        .last_modified_at;

    harness.clock.advance_seconds(60);
    let ann = harness
        .service
        .add_individual(ALICE, person("Ann", "Smith"))
        .await
        .expect("individual added");
    let after_add = harness.service.tree(ALICE).await.expect("tree");
    assert_eq!(after_add.created_at, created);
    assert!(after_add.last_modified_at > previous);
    previous = after_add.last_modified_at;

    harness.clock.advance_seconds(60);
    let sisters = harness
        .service
        .add_relationship(ALICE, link(ann.id, bea.id, "Sibling"))
        .await
        .expect("relationship added");
    let after_link = harness.service.tree(ALICE).await.expect("tree");
    assert!(after_link.last_modified_at > previous);
    previous = after_link.last_modified_at;

    harness.clock.advance_seconds(60);
    harness
        .service
        .delete_relationship(ALICE, sisters.id)
        .await
        .expect("relationship deleted");
    let after_unlink = harness.service.tree(ALICE).await.expect("tree");
    assert!(after_unlink.last_modified_at > previous);
    previous = after_unlink.last_modified_at;

    harness.clock.advance_seconds(60);
    harness
        .service
        .delete_individual(ALICE, ann.id)
        .await
        .expect("individual deleted");
    let after_delete = harness.service.tree(ALICE).await.expect("tree");
    assert!(after_delete.last_modified_at > previous);
}

#[rstest]
#[tokio::test]
async fn owners_only_see_their_own_records(harness: Harness) {
    harness
        .service
        .add_individual(ALICE, person("Ann", "Smith"))
        .await
        .expect("alice adds");
    harness
        .service
        .add_individual(BOB, person("Ben", "Jones"))
        .await
        .expect("bob adds");

    let alice_view = harness.service.tree_view(ALICE).await.expect("alice view");
    let bob_view = harness.service.tree_view(BOB).await.expect("bob view");

    assert_eq!(alice_view.individuals.len(), 1);
    assert_eq!(alice_view.individuals[0].first_name, "Ann");
    assert_eq!(bob_view.individuals.len(), 1);
    assert_eq!(bob_view.individuals[0].first_name, "Ben");
    assert_ne!(alice_view.tree.id, bob_view.tree.id);
}

#[rstest]
#[tokio::test]
async fn relationship_to_foreign_individual_is_rejected(harness: Harness) {
    let ann = harness
        .service
        .add_individual(ALICE, person("Ann", "Smith"))
        .await
        .expect("alice adds");
    let ben = harness
        .service
        .add_individual(BOB, person("Ben", "Jones"))
        .await
        .expect("bob adds");

    let err = harness
        .service
        .add_relationship(ALICE, link(ann.id, ben.id, "Spouse"))
        .await
        .expect_err("foreign individual rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(harness.store.relationship_count(), 0);
}

#[rstest]
#[tokio::test]
async fn relationships_carry_both_names(harness: Harness) {
    let john = harness
        .service
        .add_individual(ALICE, person("John", "Doe"))
        .await
        .expect("john");
    let jane = harness
        .service
        .add_individual(ALICE, person("Jane", "Doe"))
        .await
        .expect("jane");
    harness
        .service
        .add_relationship(ALICE, link(john.id, jane.id, "Spouse"))
        .await
        .expect("spouse link");

    let view = harness.service.tree_view(ALICE).await.expect("view");
    assert_eq!(view.relationships.len(), 1);
    assert_eq!(view.relationships[0].name1, "John Doe");
    assert_eq!(view.relationships[0].name2, "Jane Doe");
}

#[rstest]
#[tokio::test]
async fn deleting_an_individual_cascades_to_relationships(harness: Harness) {
    let john = harness
        .service
        .add_individual(ALICE, person("John", "Doe"))
        .await
        .expect("john");
    let jane = harness
        .service
        .add_individual(ALICE, person("Jane", "Doe"))
        .await
        .expect("jane");
    harness
        .service
        .add_relationship(ALICE, link(john.id, jane.id, "Spouse"))
        .await
        .expect("spouse link");

    let removal = harness
        .service
        .delete_individual(ALICE, john.id)
        .await
        .expect("john deleted");
    assert_eq!(removal.removed_relationships, 1);

    let view = harness.service.tree_view(ALICE).await.expect("view");
    assert_eq!(view.individuals.len(), 1);
    assert!(view.relationships.is_empty());
}

#[rstest]
#[tokio::test]
async fn deleting_another_owners_individual_is_not_found(harness: Harness) {
    let ben = harness
        .service
        .add_individual(BOB, person("Ben", "Jones"))
        .await
        .expect("bob adds");

    let err = harness
        .service
        .delete_individual(ALICE, ben.id)
        .await
        .expect_err("cross-tree delete rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);

    let bob_view = harness.service.tree_view(BOB).await.expect("bob view");
    assert_eq!(bob_view.individuals.len(), 1);
}

#[rstest]
#[tokio::test]
async fn deleting_a_relationship_removes_only_that_link(harness: Harness) {
    let john = harness
        .service
        .add_individual(ALICE, person("John", "Doe"))
        .await
        .expect("john");
    let jane = harness
        .service
        .add_individual(ALICE, person("Jane", "Doe"))
        .await
        .expect("jane");
    let spouse = harness
        .service
        .add_relationship(ALICE, link(john.id, jane.id, "Spouse"))
        .await
        .expect("spouse link");
    harness
        .service
        .add_relationship(ALICE, link(jane.id, john.id, "Sibling"))
        .await
        .expect("second link");

    harness
        .service
        .delete_relationship(ALICE, spouse.id)
        .await
        .expect("link deleted");

    let view = harness.service.tree_view(ALICE).await.expect("view");
    assert_eq!(view.individuals.len(), 2);
    assert_eq!(view.relationships.len(), 1);
    assert_eq!(view.relationships[0].relationship.relationship_type, "Sibling");

    let err = harness
        .service
        .delete_relationship(ALICE, spouse.id)
        .await
        .expect_err("already gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn graph_reflects_the_tree(harness: Harness) {
    let john = harness
        .service
        .add_individual(ALICE, person("John", "Doe"))
        .await
        .expect("john");
    let jane = harness
        .service
        .add_individual(ALICE, person("Jane", "Doe"))
        .await
        .expect("jane");
    harness
        .service
        .add_relationship(ALICE, link(john.id, jane.id, "Spouse"))
        .await
        .expect("spouse link");

    let graph = harness.service.graph(ALICE).await.expect("graph");
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.links.len(), 1);
    assert_eq!(graph.links[0].source, john.id);
    assert_eq!(graph.links[0].target, jane.id);
    assert_eq!(graph.links[0].kind, "Spouse");

    let empty = harness.service.graph(BOB).await.expect("bob graph");
    assert_eq!(empty, GraphPayload::default());
}

fn existing_tree(owner_id: UserId) -> FamilyTree {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let new = NewFamilyTree::default_for(owner_id, now);
    FamilyTree {
        id: TreeId::new(9),
        name: new.name,
        owner_id,
        description: None,
        is_public: false,
        created_at: now,
        last_modified_at: now,
    }
}

#[rstest]
#[case(GenealogyRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
#[case(GenealogyRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[case(GenealogyRepositoryError::foreign_individual(TreeId::new(9)), ErrorCode::InvalidRequest)]
#[case(GenealogyRepositoryError::not_found("individual", 4_i64), ErrorCode::NotFound)]
#[tokio::test]
async fn genealogy_failures_are_mapped(
    #[case] failure: GenealogyRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut trees = MockFamilyTreeRepository::new();
    trees
        .expect_find_by_owner()
        .returning(|owner| Ok(Some(existing_tree(owner))));
    let mut genealogy = MockGenealogyRepository::new();
    genealogy
        .expect_delete_individual()
        .withf(|tree_id, individual_id, _| {
            *tree_id == TreeId::new(9) && *individual_id == IndividualId::new(4)
        })
        .times(1)
        .return_once(move |_, _, _| Err(failure));

    let service = FamilyTreeService::new(
        Arc::new(trees),
        Arc::new(genealogy),
        Arc::new(MutableClock::new(Utc::now())) as Arc<dyn Clock>,
    );
    let err = service
        .delete_individual(ALICE, IndividualId::new(4))
        .await
        .expect_err("failure propagates");
    assert_eq!(err.code(), expected);
}
