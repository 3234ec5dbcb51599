//! # PCBKit Designer
//!
//! Interactive editing core: the document model, the pointer restriction
//! helper and the drawing tools that mutate the document.
//!
//! ## Architecture
//!
//! ```text
//! input event ──> ToolManager ──> Tool (state machine)
//!                                  ├── Restriction (axis lock / angle snap)
//!                                  └── Transaction ──> Document ──> redraw request
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pcbkit_core::Coordi;
//! use pcbkit_designer::{Document, ToolArgs, ToolId, ToolManager, ToolResponse};
//!
//! let mut doc = Document::board();
//! let mut tools = ToolManager::default();
//! tools.begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(Coordi::new(0, 0))).unwrap();
//! tools.update(&mut doc, &ToolArgs::click(Coordi::new(5_000_000, 0))).unwrap();
//! let done = tools.update(&mut doc, &ToolArgs::click(Coordi::new(0, 1_000_000))).unwrap();
//! assert_eq!(done, ToolResponse::Complete);
//! assert_eq!(doc.dimensions().count(), 1);
//! ```

pub mod commands;
pub mod document;
pub mod tools;

pub use commands::DocumentCommand;
pub use document::{Dimension, DimensionMode, Document, Entity, EntityStore, Transaction, Via};
pub use tools::{
    constrain, Constrained, DimensionState, Key, MouseButton, RestrictMode, RestrictSettings,
    RestrictedTool, Restriction, Tool, ToolArgs, ToolDrawDimension, ToolEvent, ToolId,
    ToolManager, ToolPlaceVia, ToolResponse, ToolSettings,
};
