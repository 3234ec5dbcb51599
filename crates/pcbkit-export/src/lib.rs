//! # PCBKit Export
//!
//! Board model, pool access and the fabrication export pipeline.
//!
//! ## Modules
//!
//! - [`board`]: resolved board (packages, vias, tracks, planes), expansion
//!   and plane refill
//! - [`pool`]: padstack and package library, pool registry and via padstacks
//! - [`settings`]: per-kind export settings and their record form
//! - [`exporters`]: Gerber/Excellon, PDF, pick-and-place CSV and STEP writers
//! - [`adapter`]: the get/export entry points used by hosts
//!
//! An export always runs against an expanded board with current planes;
//! exporters refuse anything else.

pub mod adapter;
pub mod board;
pub mod exporters;
pub mod pool;
pub mod settings;

pub use adapter::{ExportAdapter, ProgressCallback};
pub use board::{Block, Board, BoardPackage, BoardVia, Component, Net, Plane, Side, Track};
pub use exporters::{export_pdf, export_pnp, export_step, GerberExporter, STEP_MILESTONES};
pub use pool::{Padstack, PackageDef, Pool, PoolRegistry, ViaPadstackProvider};
pub use settings::{
    FabOutputSettings, PdfExportSettings, PnpExportSettings, SettingsRecord, StepExportSettings,
};
