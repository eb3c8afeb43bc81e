//! QueryGraph - Query expression graph builder over a domain model
//!
//! This crate builds the from-clause graph of an object query:
//! - Domain model of entity and embeddable types loaded from YAML
//! - Roots, attribute paths, joins, fetches and type-narrowing treats
//! - Path registry reusing nodes at identical navigable paths
//! - Canonical rendering and a serializable tree snapshot
//! - Call-text rendering for stored procedure invocations

pub mod utils;

pub mod callable;
pub mod config;
pub mod domain_model;
pub mod navigation_plan;
pub mod query_tree;
