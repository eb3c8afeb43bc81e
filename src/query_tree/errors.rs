//! Error types raised while building a query tree.
//!
//! All of them abort the compile in progress; none are recovered locally.

use thiserror::Error;

use crate::domain_model::AttributeKind;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryTreeError {
    #[error("Could not resolve attribute `{segment}` of `{path}`")]
    UnknownPath { path: String, segment: String },

    #[error("Attribute `{attribute}` of `{path}` is not joinable")]
    NotJoinable { attribute: String, path: String },

    #[error(
        "Passed attribute name `{attribute}` did not correspond to a collection ({expected}) \
         reference relative to `{path}`, found {actual}"
    )]
    KindMismatch {
        attribute: String,
        path: String,
        expected: AttributeKind,
        actual: AttributeKind,
    },

    #[error("`{path}` is not correlated")]
    NotCorrelated { path: String },

    #[error("Map attribute `{attribute}` of `{path}` has no key type")]
    MissingMapKeyType { attribute: String, path: String },

    #[error("Unknown entity `{entity}`")]
    UnknownEntity { entity: String },

    #[error("Cannot treat `{path}` of type `{referenced_type}` as `{target}`: not a subtype")]
    InvalidTreatTarget {
        path: String,
        referenced_type: String,
        target: String,
    },

    #[error(
        "Attribute `{attribute}` is declared by `{declaring_type}`, \
         outside the type hierarchy of `{path}`"
    )]
    AttributeNotMember {
        attribute: String,
        declaring_type: String,
        path: String,
    },

    #[error("`{alias}` is not a valid alias")]
    InvalidAlias { alias: String },

    #[error("Alias `{alias}` has the form of a generated placeholder (`{prefix}<n>`)")]
    ReservedAlias { alias: String, prefix: String },

    #[error("Alias `{alias}` is already used by `{path}`")]
    DuplicateAlias { alias: String, path: String },

    #[error("Fetch of plural attribute `{path}` may not carry an explicit alias")]
    AliasedPluralFetch { path: String },
}
