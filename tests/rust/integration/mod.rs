//! Integration tests - Exercise the public API end to end
//!
//! Domain models and navigation plans are loaded from YAML files written to
//! temporary directories, the same way the command-line tool reads them.

mod callable_tests;
mod navigation_plan_tests;
mod query_tree_tests;
