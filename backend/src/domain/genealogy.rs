//! Individuals and the relationships linking them.
//!
//! Dates, gender, and occupation are opaque strings: the store neither parses
//! nor restricts them. Optional dates are `None` when absent and never empty
//! strings.

use std::fmt;

use serde::Serialize;

use super::ids::{IndividualId, RelationshipId, TreeId};

/// Validation errors for new individuals and relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenealogyValidationError {
    /// First name was blank.
    EmptyFirstName,
    /// Last name was blank.
    EmptyLastName,
    /// Gender was never supplied.
    MissingGender,
    /// Birth date was never supplied.
    MissingBirthDate,
    /// Occupation was never supplied.
    MissingOccupation,
    /// Relationship type was blank.
    EmptyRelationshipType,
    /// Both ends of a relationship name the same individual.
    SelfRelationship { individual_id: IndividualId },
}

impl fmt::Display for GenealogyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::MissingGender => write!(f, "gender is required"),
            Self::MissingBirthDate => write!(f, "birth date is required"),
            Self::MissingOccupation => write!(f, "occupation is required"),
            Self::EmptyRelationshipType => write!(f, "relationship type must not be empty"),
            Self::SelfRelationship { individual_id } => write!(
                f,
                "individual {individual_id} cannot be related to themselves"
            ),
        }
    }
}

impl std::error::Error for GenealogyValidationError {}

/// Map blank optional input to `None`.
///
/// # Examples
/// ```
/// use family_tree::domain::normalize_optional;
///
/// assert_eq!(normalize_optional(Some("  ".to_owned())), None);
/// assert_eq!(normalize_optional(Some("1999".to_owned())), Some("1999".to_owned()));
/// ```
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// A person recorded in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    /// Identity assigned by the store.
    pub id: IndividualId,
    /// Owning tree.
    pub tree_id: TreeId,
    /// Given name; never blank.
    pub first_name: String,
    /// Family name; never blank.
    pub last_name: String,
    /// Free-form gender label.
    pub gender: String,
    /// Birth date as entered.
    pub birth_date: String,
    /// Death date as entered; `None` while living or unknown.
    pub death_date: Option<String>,
    /// Free-form occupation.
    pub occupation: String,
}

impl Individual {
    /// First and last name joined by a single space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Field values for an individual awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualDetails {
    first_name: String,
    last_name: String,
    gender: String,
    birth_date: String,
    death_date: Option<String>,
    occupation: String,
}

impl IndividualDetails {
    /// Start building details for a person with the given names.
    ///
    /// Gender, birth date, and occupation must be set before
    /// [`IndividualDetailsBuilder::build`]; an empty string counts as set.
    pub fn builder(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> IndividualDetailsBuilder {
        IndividualDetailsBuilder {
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: None,
            birth_date: None,
            death_date: None,
            occupation: None,
        }
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Gender label.
    pub fn gender(&self) -> &str {
        &self.gender
    }

    /// Birth date as entered.
    pub fn birth_date(&self) -> &str {
        &self.birth_date
    }

    /// Death date, if any.
    pub fn death_date(&self) -> Option<&str> {
        self.death_date.as_deref()
    }

    /// Occupation.
    pub fn occupation(&self) -> &str {
        &self.occupation
    }

    /// Materialise the stored record once the repository assigns ids.
    pub fn into_individual(self, id: IndividualId, tree_id: TreeId) -> Individual {
        Individual {
            id,
            tree_id,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            birth_date: self.birth_date,
            death_date: self.death_date,
            occupation: self.occupation,
        }
    }
}

/// Builder for [`IndividualDetails`].
#[derive(Debug, Clone)]
pub struct IndividualDetailsBuilder {
    first_name: String,
    last_name: String,
    gender: Option<String>,
    birth_date: Option<String>,
    death_date: Option<String>,
    occupation: Option<String>,
}

impl IndividualDetailsBuilder {
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// Record a death date; blank input leaves it unset.
    pub fn death_date(mut self, death_date: Option<String>) -> Self {
        self.death_date = normalize_optional(death_date);
        self
    }

    pub fn occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    /// Validate names, check required fields were supplied, and produce the
    /// details.
    ///
    /// # Examples
    /// ```
    /// use family_tree::domain::IndividualDetails;
    ///
    /// let details = IndividualDetails::builder("John", "Doe")
    ///     .gender("M")
    ///     .birth_date("1950-01-01")
    ///     .death_date(Some(String::new()))
    ///     .occupation("Farmer")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(details.death_date(), None);
    /// ```
    pub fn build(self) -> Result<IndividualDetails, GenealogyValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(GenealogyValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(GenealogyValidationError::EmptyLastName);
        }
        let gender = self.gender.ok_or(GenealogyValidationError::MissingGender)?;
        let birth_date = self
            .birth_date
            .ok_or(GenealogyValidationError::MissingBirthDate)?;
        let occupation = self
            .occupation
            .ok_or(GenealogyValidationError::MissingOccupation)?;
        Ok(IndividualDetails {
            first_name: self.first_name,
            last_name: self.last_name,
            gender,
            birth_date,
            death_date: self.death_date,
            occupation,
        })
    }
}

/// A typed, dated link between two individuals of the same tree.
///
/// The type carries direction: for `"Parent"`, `individual_id1` is the parent
/// of `individual_id2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Identity assigned by the store.
    pub id: RelationshipId,
    /// Owning tree; both individuals belong to it.
    pub tree_id: TreeId,
    /// First participant.
    pub individual_id1: IndividualId,
    /// Second participant.
    pub individual_id2: IndividualId,
    /// Free-form type such as `"Spouse"` or `"Parent"`.
    pub relationship_type: String,
    /// Start date as entered.
    pub start_date: String,
    /// End date as entered; `None` while ongoing.
    pub end_date: Option<String>,
}

/// Relationship joined with both individuals' display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRelationship {
    #[serde(flatten)]
    pub relationship: Relationship,
    /// Display name of `individual_id1`.
    pub name1: String,
    /// Display name of `individual_id2`.
    pub name2: String,
}

/// Field values for a relationship awaiting insertion.
///
/// ## Invariants
/// - `individual_id1 != individual_id2`.
/// - `relationship_type` is non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDetails {
    individual_id1: IndividualId,
    individual_id2: IndividualId,
    relationship_type: String,
    start_date: String,
    end_date: Option<String>,
}

impl RelationshipDetails {
    /// Validate and construct relationship details.
    pub fn try_new(
        individual_id1: IndividualId,
        individual_id2: IndividualId,
        relationship_type: impl Into<String>,
        start_date: impl Into<String>,
        end_date: Option<String>,
    ) -> Result<Self, GenealogyValidationError> {
        let relationship_type = relationship_type.into();
        if relationship_type.trim().is_empty() {
            return Err(GenealogyValidationError::EmptyRelationshipType);
        }
        if individual_id1 == individual_id2 {
            return Err(GenealogyValidationError::SelfRelationship {
                individual_id: individual_id1,
            });
        }
        Ok(Self {
            individual_id1,
            individual_id2,
            relationship_type,
            start_date: start_date.into(),
            end_date: normalize_optional(end_date),
        })
    }

    /// First participant.
    pub fn individual_id1(&self) -> IndividualId {
        self.individual_id1
    }

    /// Second participant.
    pub fn individual_id2(&self) -> IndividualId {
        self.individual_id2
    }

    /// Relationship type.
    pub fn relationship_type(&self) -> &str {
        &self.relationship_type
    }

    /// Start date as entered.
    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    /// End date, if any.
    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    /// Materialise the stored record once the repository assigns ids.
    pub fn into_relationship(self, id: RelationshipId, tree_id: TreeId) -> Relationship {
        Relationship {
            id,
            tree_id,
            individual_id1: self.individual_id1,
            individual_id2: self.individual_id2,
            relationship_type: self.relationship_type,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for genealogy record validation.
    use super::*;
    use rstest::rstest;

    fn complete(first: &str, last: &str) -> IndividualDetailsBuilder {
        IndividualDetails::builder(first, last)
            .gender("F")
            .birth_date("1950-01-01")
            .occupation("Farmer")
    }

    #[rstest]
    #[case("", "Doe", GenealogyValidationError::EmptyFirstName)]
    #[case("John", "  ", GenealogyValidationError::EmptyLastName)]
    fn individual_names_are_required(
        #[case] first: &str,
        #[case] last: &str,
        #[case] expected: GenealogyValidationError,
    ) {
        let err = complete(first, last)
            .build()
            .expect_err("names are required");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(
        IndividualDetails::builder("John", "Doe").birth_date("1950").occupation("Smith"),
        GenealogyValidationError::MissingGender
    )]
    #[case(
        IndividualDetails::builder("John", "Doe").gender("M").occupation("Smith"),
        GenealogyValidationError::MissingBirthDate
    )]
    #[case(
        IndividualDetails::builder("John", "Doe").gender("M").birth_date("1950"),
        GenealogyValidationError::MissingOccupation
    )]
    fn individual_fields_must_be_supplied(
        #[case] builder: IndividualDetailsBuilder,
        #[case] expected: GenealogyValidationError,
    ) {
        let err = builder.build().expect_err("field is required");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn supplied_empty_fields_are_kept_verbatim() {
        let details = IndividualDetails::builder("John", "Doe")
            .gender("")
            .birth_date("")
            .occupation("")
            .build()
            .expect("empty values count as supplied");
        assert_eq!(details.gender(), "");
        assert_eq!(details.occupation(), "");
    }

    #[rstest]
    fn individual_keeps_present_death_date() {
        let details = complete("Jane", "Doe")
            .death_date(Some("2020-02-02".to_owned()))
            .build()
            .expect("valid details");
        assert_eq!(details.death_date(), Some("2020-02-02"));
    }

    #[rstest]
    fn display_name_joins_names_with_a_space() {
        let individual = complete("John", "Doe")
            .build()
            .expect("valid details")
            .into_individual(IndividualId::new(1), TreeId::new(1));
        assert_eq!(individual.display_name(), "John Doe");
    }

    #[rstest]
    fn self_relationships_are_rejected() {
        let id = IndividualId::new(5);
        let err = RelationshipDetails::try_new(id, id, "Spouse", "2000-01-01", None)
            .expect_err("self links are not allowed");
        assert_eq!(
            err,
            GenealogyValidationError::SelfRelationship { individual_id: id }
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn relationship_type_is_required(#[case] kind: &str) {
        let err = RelationshipDetails::try_new(
            IndividualId::new(1),
            IndividualId::new(2),
            kind,
            "2000-01-01",
            None,
        )
        .expect_err("type is required");
        assert_eq!(err, GenealogyValidationError::EmptyRelationshipType);
    }

    #[rstest]
    fn blank_end_date_becomes_none() {
        let details = RelationshipDetails::try_new(
            IndividualId::new(1),
            IndividualId::new(2),
            "Spouse",
            "2000-01-01",
            Some(String::new()),
        )
        .expect("valid details");
        assert_eq!(details.end_date(), None);
    }

    #[rstest]
    fn named_relationship_flattens_relationship_fields() {
        let relationship = RelationshipDetails::try_new(
            IndividualId::new(1),
            IndividualId::new(2),
            "Parent",
            "1980-05-05",
            None,
        )
        .expect("valid details")
        .into_relationship(RelationshipId::new(9), TreeId::new(3));
        let named = NamedRelationship {
            relationship,
            name1: "John Doe".to_owned(),
            name2: "Jim Doe".to_owned(),
        };

        let value = serde_json::to_value(&named).expect("serialise");
        assert_eq!(value["relationshipType"], "Parent");
        assert_eq!(value["name1"], "John Doe");
        assert_eq!(value["endDate"], serde_json::Value::Null);
    }
}
