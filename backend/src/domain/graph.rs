//! Node/link projection of a tree for client-side graph drawing.
//!
//! The payload keys are consumed verbatim by the visualisation script:
//! nodes carry `id`/`name`/`gender`/`birthDate`/`deathDate`/`occupation` and
//! links carry `source`/`target`/`type`/`startDate`/`endDate`.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use super::genealogy::{Individual, Relationship};
use super::ids::IndividualId;

/// One person in the drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Individual id; links refer to it.
    pub id: IndividualId,
    /// `"First Last"`.
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub death_date: Option<String>,
    pub occupation: String,
}

/// One relationship edge in the drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    /// `individual_id1` of the relationship.
    pub source: IndividualId,
    /// `individual_id2` of the relationship.
    pub target: IndividualId,
    /// Relationship type, serialised as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// Complete visualisation payload for one tree.
///
/// ## Invariants
/// - Every link's `source` and `target` equal some node's `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphPayload {
    /// One node per individual.
    pub nodes: Vec<GraphNode>,
    /// One link per relationship whose endpoints are both nodes.
    pub links: Vec<GraphLink>,
}

impl From<&Individual> for GraphNode {
    fn from(individual: &Individual) -> Self {
        Self {
            id: individual.id,
            name: individual.display_name(),
            gender: individual.gender.clone(),
            birth_date: individual.birth_date.clone(),
            death_date: individual.death_date.clone(),
            occupation: individual.occupation.clone(),
        }
    }
}

impl From<&Relationship> for GraphLink {
    fn from(relationship: &Relationship) -> Self {
        Self {
            source: relationship.individual_id1,
            target: relationship.individual_id2,
            kind: relationship.relationship_type.clone(),
            start_date: relationship.start_date.clone(),
            end_date: relationship.end_date.clone(),
        }
    }
}

/// Project stored records into the visualisation payload.
///
/// Nodes keep the order of `individuals`, links the order of
/// `relationships`. A relationship whose endpoints are not both among
/// `individuals` is dropped and logged.
///
/// # Examples
/// ```
/// use family_tree::domain::{IndividualDetails, IndividualId, Relationship, TreeId, project_graph};
///
/// let john = IndividualDetails::builder("John", "Doe")
///     .gender("M")
///     .birth_date("1950-01-01")
///     .occupation("Farmer")
///     .build()
///     .unwrap()
///     .into_individual(IndividualId::new(1), TreeId::new(1));
/// let payload = project_graph(&[john], &Vec::<Relationship>::new());
/// assert_eq!(payload.nodes[0].name, "John Doe");
/// assert!(payload.links.is_empty());
/// ```
pub fn project_graph<'a, I>(individuals: &[Individual], relationships: I) -> GraphPayload
where
    I: IntoIterator<Item = &'a Relationship>,
{
    let nodes: Vec<GraphNode> = individuals.iter().map(GraphNode::from).collect();
    let known: HashSet<IndividualId> = nodes.iter().map(|node| node.id).collect();

    let links = relationships
        .into_iter()
        .filter(|relationship| {
            let linked = known.contains(&relationship.individual_id1)
                && known.contains(&relationship.individual_id2);
            if !linked {
                warn!(
                    relationship_id = %relationship.id,
                    tree_id = %relationship.tree_id,
                    "dropping relationship with an endpoint outside the tree"
                );
            }
            linked
        })
        .map(GraphLink::from)
        .collect();

    GraphPayload { nodes, links }
}
