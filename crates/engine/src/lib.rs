//! `refgrid-engine`: Reference grid construction.
//!
//! Pure engine crate: receives a schema-checked [`Table`](refgrid_core::Table)
//! and a list of targets, returns a new table. No IO dependencies.

pub mod error;
pub mod grid;
pub mod policy;
pub mod representative;
pub mod stats;
pub mod target;

pub use error::GridError;
pub use grid::{build_grid, expected_row_count};
pub use policy::{
    FactorsPolicy, GridOptions, NumericsPolicy, ReferenceLevel, Spread, DEFAULT_LENGTH_OUT,
    MAX_GRID_ROWS,
};
pub use representative::{representative_values, Role};
pub use target::{Target, TargetValues};
