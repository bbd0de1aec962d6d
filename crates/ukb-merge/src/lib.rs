//! Conflict resolution and merging of per-table extracts.
//!
//! Extracts arrive one table at a time. [`ConflictResolver`] first removes
//! duplicate names inside an extract, then renames anything that collides
//! with the accumulated output. [`MergedTable`] folds the result in with a
//! full outer join on the identifier column.

mod conflict;
mod error;
mod merge;

pub use conflict::{ConflictRenameMap, ConflictResolver, suffixed_name};
pub use error::{MergeError, Result};
pub use merge::{MergeStep, MergedTable};
