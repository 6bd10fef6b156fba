//! Deterministic procedural point-cloud tile generation.
//!
//! One generation call turns a [`GenerateOptions`] into a
//! [`TilePayload`]: the feature-table and batch-table JSON descriptors
//! plus their aligned binary sections, optionally routed through an
//! external compression engine supplied as a [`tiletables::PointCompressor`].
//!
//! Determinism is a correctness requirement, not an optimization: the
//! random generator and the noise function are re-seeded per call, so two
//! calls with identical options produce byte-identical sections.

pub mod compress;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod source;

pub use error::GenerateError;
pub use options::{ColorMode, ColorStrategy, DracoOptions, GenerateOptions, Shape};
pub use pipeline::{generate_tile, TilePayload};
