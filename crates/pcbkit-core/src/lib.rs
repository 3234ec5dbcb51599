//! # PCBKit Core
//!
//! Core types and utilities shared by the PCBKit crates.
//! Provides integer board coordinates, unit conversion, the object and
//! export kind enums, and the error taxonomy used by the tool layer and the
//! export pipeline.

pub mod coord;
pub mod error;
pub mod types;
pub mod units;

pub use coord::{Coordf, Coordi};
pub use error::{CallbackAbort, Error, ExportError, Result, ToolError, ValidationError};
pub use types::{ExportKind, Layer, ObjectType};
pub use units::{format_length, mm_to_nm, nm_to_mm, parse_length, MeasurementSystem};
