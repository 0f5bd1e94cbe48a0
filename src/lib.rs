// Core pipeline for the cost-optimization execution-report dashboard:
// normalize a tabular report once, then answer filter and aggregation
// queries over the immutable table. The binary in `main.rs` is a thin
// console shell over these modules.
pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod fiscal;
pub mod loader;
pub mod output;
pub mod types;
pub mod util;
