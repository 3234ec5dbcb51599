//! Interactive tools.
//!
//! A tool is a small state machine driven by pointer and keyboard events.
//! It owns at most one in-progress entity and only touches the document
//! when it commits. Tools are polymorphic over two capability sets:
//! [`Tool`] (lifecycle) and [`RestrictedTool`] (constrained pointer input),
//! the latter backed by an embedded [`Restriction`] value.

mod draw_dimension;
mod manager;
mod place_via;
pub mod restrict;

pub use draw_dimension::{DimensionState, ToolDrawDimension};
pub use manager::{TipListener, ToolManager};
pub use place_via::ToolPlaceVia;
pub use restrict::{
    constrain, Constrained, RestrictMode, RestrictSettings, RestrictedTool, Restriction,
};

use crate::document::{Dimension, Document, Entity};
use pcbkit_core::{Coordi, MeasurementSystem, ObjectType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mouse buttons the tools react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Keys the tools react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Return,
    Char(char),
}

/// An input event delivered to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEvent {
    Move,
    Click(MouseButton),
    Key(Key),
}

/// Event plus the pointer position at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolArgs {
    pub event: ToolEvent,
    pub coords: Coordi,
}

impl ToolArgs {
    pub fn moved(coords: Coordi) -> Self {
        Self {
            event: ToolEvent::Move,
            coords,
        }
    }

    pub fn click(coords: Coordi) -> Self {
        Self {
            event: ToolEvent::Click(MouseButton::Left),
            coords,
        }
    }

    pub fn key(key: Key, coords: Coordi) -> Self {
        Self {
            event: ToolEvent::Key(key),
            coords,
        }
    }

    /// Right click or Escape.
    pub fn is_cancel(&self) -> bool {
        matches!(
            self.event,
            ToolEvent::Click(MouseButton::Right) | ToolEvent::Key(Key::Escape)
        )
    }
}

/// Lifecycle response of a tool operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolResponse {
    /// The tool needs more input.
    AwaitingInput,
    /// The tool committed its entity and is done.
    Complete,
    /// The tool discarded its entity and is done.
    Aborted,
}

impl ToolResponse {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ToolResponse::AwaitingInput)
    }
}

/// Identifies a tool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    DrawDimension,
    PlaceVia,
}

impl ToolId {
    /// The object type the tool creates.
    pub fn object_type(self) -> ObjectType {
        match self {
            ToolId::DrawDimension => ObjectType::Dimension,
            ToolId::PlaceVia => ObjectType::Via,
        }
    }

    pub fn create(self, settings: &ToolSettings) -> Box<dyn Tool> {
        match self {
            ToolId::DrawDimension => Box::new(ToolDrawDimension::new(settings)),
            ToolId::PlaceVia => Box::new(ToolPlaceVia::new(settings)),
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolId::DrawDimension => write!(f, "Draw dimension"),
            ToolId::PlaceVia => write!(f, "Place via"),
        }
    }
}

/// Preferences handed to tools when they are created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub restrict: RestrictSettings,
    pub dimension_label_size: u64,
    /// Units of lengths shown in tips.
    #[serde(default)]
    pub measurement_system: MeasurementSystem,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            restrict: RestrictSettings::default(),
            dimension_label_size: Dimension::DEFAULT_LABEL_SIZE,
            measurement_system: MeasurementSystem::Metric,
        }
    }
}

/// Tool lifecycle.
///
/// `update` may only be called after `begin` returned
/// [`ToolResponse::AwaitingInput`]; [`ToolManager`] enforces this.
pub trait Tool {
    fn id(&self) -> ToolId;

    /// Whether the tool is applicable to `doc` right now. No side effects.
    fn can_begin(&self, doc: &Document) -> bool;

    fn begin(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse;

    fn update(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse;

    /// User-facing hint for the current state.
    fn tip(&self) -> &str;

    /// The in-progress entity, for rendering.
    fn preview(&self) -> Option<Entity> {
        None
    }
}
