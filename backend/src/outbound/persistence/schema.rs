//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Identity primary key.
        id -> Int8,
        /// Unique login name.
        username -> Varchar,
        /// Unique contact address.
        email -> Text,
        /// Encoded PBKDF2 hash; never plaintext.
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Tree metadata; at most one row per owner.
    family_trees (id) {
        id -> Int8,
        tree_name -> Varchar,
        /// Unique owning user.
        owner_id -> Int8,
        description -> Nullable<Text>,
        is_public -> Bool,
        created_at -> Timestamptz,
        /// Advanced on every individual or relationship mutation.
        last_modified_at -> Timestamptz,
    }
}

diesel::table! {
    individuals (id) {
        id -> Int8,
        tree_id -> Int8,
        first_name -> Text,
        last_name -> Text,
        gender -> Text,
        birth_date -> Text,
        death_date -> Nullable<Text>,
        occupation -> Text,
    }
}

diesel::table! {
    relationships (id) {
        id -> Int8,
        tree_id -> Int8,
        individual_id1 -> Int8,
        individual_id2 -> Int8,
        relationship_type -> Text,
        start_date -> Text,
        end_date -> Nullable<Text>,
    }
}

diesel::joinable!(family_trees -> users (owner_id));
diesel::joinable!(individuals -> family_trees (tree_id));
diesel::joinable!(relationships -> family_trees (tree_id));

diesel::allow_tables_to_appear_in_same_query!(users, family_trees, individuals, relationships);
