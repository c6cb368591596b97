//! # overtone-core
//!
//! Core abstractions for the Overtone synthesizer editor.
//!
//! This crate provides the pure data model shared by the editor subsystem:
//! parameter addressing, parameter snapshots, and envelope segment layout
//! math. It performs no I/O and has no external dependencies, so it is
//! usable from any context.
//!
//! ## Modules
//!
//! - [`address`] - Structured parameter identity and flat-id bit packing
//! - [`parameter`] - Parameter snapshots with normalized/plain conversion
//! - [`envelope`] - Envelope segment chain and pixel geometry
//! - [`error`] - Error types
//! - [`types`] - Ids, sizes, points, rectangles

pub mod address;
pub mod envelope;
pub mod error;
pub mod parameter;
pub mod types;

// Re-exports for convenience
pub use address::{
    decode_unit, encode_unit, ParamAddress, ParamKind, TargetKind, UnitKind, NUM_GENERATORS,
};
pub use envelope::{
    layout_segments, ramp_coefficient, trace_segment, SegmentGeometry, SegmentSpec, SegmentStage,
    SegmentValues, ENVELOPE_PARAMS, NUM_SEGMENTS, SEGMENTS, SUSTAIN_DURATION,
};
pub use error::{EditorError, EditorResult};
pub use parameter::{plain_value_of, Parameter, ParameterInfo, ParameterKind, ValueRange};
pub use types::{ParamId, ParamValue, Point, Rect, Size};
