//! Query planning and column resolution.
//!
//! - [`QueryPlanner`] turns requested identifiers and display names into an
//!   [`ExtractionPlan`](ukb_model::ExtractionPlan) grouped by table file.
//! - [`ColumnResolver`] matches an identifier against a table header using an
//!   ordered list of strategies and reports the output name of each column.
//! - [`standardize_column_name`] rewrites `Name | Instance X | Array Y`
//!   headers to `Name_iX_aY`.

mod error;
mod planner;
mod resolver;
mod standardize;
mod tokens;

pub use error::{PlanError, Result};
pub use planner::{PlannedQuery, QueryPlanner};
pub use resolver::{ColumnResolver, IdentifierResolution, ResolveContext, TableResolution};
pub use standardize::standardize_column_name;
pub use tokens::{QueryRequest, parse_input_string};
