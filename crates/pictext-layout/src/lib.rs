//! Pictext Layout: from text runs to anchored geometry
//!
//! Pure layout computation, executed once per draw call. Nothing here
//! touches a canvas; the output is coordinates the rendering backends
//! consume verbatim.
//!
//! ## The Pieces
//!
//! Leaf first, each building on the previous:
//!
//! 1. [`Metrics`] - how big is this run, rotation included
//! 2. [`Text`] - one run anchored under an alignment policy
//! 3. [`Row`] - runs side by side, no gaps, tallest run sets the height
//! 4. [`Rows`] - rows stacked vertically with a fixed distance
//!
//! Every `metrics` call is a pure function of its inputs: identical
//! arguments on the same immutable object produce identical results, and
//! empty rows or blocks resolve to zero-size geometry instead of errors.
//!
//! ## Anchor convention
//!
//! Returned y values are baselines. `Valign::Bottom` passes the caller's
//! reference through untouched; `Top` and `Middle` add the box height.
//! See [`pictext_core::Valign`] for the rationale.

pub mod metrics;
pub mod row;
pub mod rows;
pub mod text;

pub use metrics::Metrics;
pub use row::{Row, RowMetrics};
pub use rows::{Rows, RowsMetrics};
pub use text::{Text, TextMetrics};
