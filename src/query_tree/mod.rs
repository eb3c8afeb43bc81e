//! Query expression tree.
//!
//! Builds the in-memory tree of table references for one query compile:
//! roots, attribute joins, fetches, ad-hoc entity joins and treat
//! (type-narrowing) refinements, ahead of SQL generation.
//!
//! ```text
//! root  Person e                       ledger: [#1, #2, #4]
//!  ├─ join   e.manager        #1
//!  │   └─ fetch e.manager.orders  #2
//!  ├─ treat  e.treat(Manager)  #3      (not in the ledger)
//!  └─ join   e.join(Country)   #4
//! ```
//!
//! The tree is built through [`BuildCtx`] and frozen by
//! [`BuildCtx::finish`] into a [`QueryTree`].

pub mod build_ctx;
pub mod errors;
pub mod join_dispatch;
pub mod navigable_path;
pub mod node;
pub mod path_registry;
pub mod render;
pub mod snapshot;


pub use build_ctx::BuildCtx;
pub use errors::QueryTreeError;
pub use navigable_path::NavigablePath;
pub use node::{
    ExpressionNode, JoinData, JoinShape, JoinSource, JoinType, NodeId, NodeKind, QueryTree,
};
pub use path_registry::PathRegistry;
pub use render::TreeRenderer;
pub use snapshot::{NodeSnapshot, TreeSnapshot};
