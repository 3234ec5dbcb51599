//! Two-point dimension tool.
//!
//! `begin` places the first anchor, a click fixes the second anchor, and a
//! final click (or Return) places the label and commits.

use super::restrict::{RestrictedTool, Restriction};
use super::{Key, MouseButton, Tool, ToolArgs, ToolEvent, ToolId, ToolResponse, ToolSettings};
use crate::document::{Dimension, Document, Entity};
use pcbkit_core::{MeasurementSystem, ObjectType};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Key cycling distance / horizontal / vertical measurement.
pub const KEY_CYCLE_MODE: char = 'm';

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DimensionState {
    /// Waiting for the first anchor.
    P0,
    /// First anchor placed, second anchor follows the pointer.
    P1,
    /// Both anchors fixed, label offset follows the pointer.
    Label,
    /// Committed or cancelled.
    Finished,
}

pub struct ToolDrawDimension {
    restriction: Restriction,
    temp: Option<Dimension>,
    state: DimensionState,
    label_size: u64,
    units: MeasurementSystem,
    tip: String,
}

impl ToolDrawDimension {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            restriction: Restriction::new(settings.restrict),
            temp: None,
            state: DimensionState::P0,
            label_size: settings.dimension_label_size,
            units: settings.measurement_system,
            tip: String::new(),
        }
    }

    pub fn state(&self) -> DimensionState {
        self.state
    }

    /// The dimension being drawn, if any.
    pub fn temp(&self) -> Option<&Dimension> {
        self.temp.as_ref()
    }

    fn set_state(&mut self, state: DimensionState) {
        debug!("Dimension tool {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn update_tip(&mut self) {
        let restrict = self.restriction.tip();
        self.tip = match (self.state, &self.temp) {
            (DimensionState::P0, _) => "LMB: place first point  RMB: cancel".to_string(),
            (DimensionState::P1, Some(d)) => format!(
                "LMB: place second point  RMB: cancel  /: restrict  m: mode ({})  |  {}  |  {}",
                d.mode,
                restrict,
                d.label_text(self.units)
            ),
            (DimensionState::Label, Some(d)) => format!(
                "LMB: place label  RMB: cancel  m: mode ({})  |  {}",
                d.mode,
                d.label_text(self.units)
            ),
            _ => String::new(),
        };
        debug!("Tip: {}", self.tip);
    }

    fn advance(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse {
        match self.state {
            DimensionState::P0 => {
                if let Some(temp) = self.temp.as_mut() {
                    temp.p0 = args.coords;
                    temp.p1 = args.coords;
                }
                self.set_state(DimensionState::P1);
                ToolResponse::AwaitingInput
            }
            DimensionState::P1 => {
                self.track_pointer(args);
                self.set_state(DimensionState::Label);
                ToolResponse::AwaitingInput
            }
            DimensionState::Label => self.commit(doc),
            DimensionState::Finished => ToolResponse::Complete,
        }
    }

    fn track_pointer(&mut self, args: &ToolArgs) {
        let state = self.state;
        let restriction = &self.restriction;
        if let Some(temp) = self.temp.as_mut() {
            match state {
                DimensionState::P0 => {
                    temp.p0 = args.coords;
                    temp.p1 = args.coords;
                }
                DimensionState::P1 => {
                    temp.p1 = restriction.apply(temp.p0, args.coords).coords;
                }
                DimensionState::Label => {
                    temp.label_distance = temp.project(args.coords - temp.p0);
                }
                DimensionState::Finished => {}
            }
        }
    }

    fn commit(&mut self, doc: &mut Document) -> ToolResponse {
        let Some(dimension) = self.temp.take() else {
            return ToolResponse::Aborted;
        };
        info!(
            "Committing dimension {} ({} -> {}, {})",
            dimension.uuid,
            dimension.p0,
            dimension.p1,
            dimension.label_text(self.units)
        );
        let mut tx = doc.transaction("Draw dimension");
        tx.insert(dimension);
        tx.commit();
        self.set_state(DimensionState::Finished);
        ToolResponse::Complete
    }

    fn cancel(&mut self) -> ToolResponse {
        if let Some(dimension) = self.temp.take() {
            info!("Dimension {} discarded", dimension.uuid);
        }
        self.set_state(DimensionState::Finished);
        self.update_tip();
        ToolResponse::Aborted
    }
}

impl RestrictedTool for ToolDrawDimension {
    fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    fn restriction_mut(&mut self) -> &mut Restriction {
        &mut self.restriction
    }
}

impl Tool for ToolDrawDimension {
    fn id(&self) -> ToolId {
        ToolId::DrawDimension
    }

    fn can_begin(&self, doc: &Document) -> bool {
        doc.has_object_type(ObjectType::Dimension) && doc.work_layer().is_some()
    }

    fn begin(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse {
        doc.clear_selection();
        let mut dimension = Dimension::new(Uuid::new_v4(), doc.uuid(), args.coords);
        dimension.label_size = self.label_size;
        self.temp = Some(dimension);
        self.set_state(DimensionState::P1);
        self.update_tip();
        ToolResponse::AwaitingInput
    }

    fn update(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse {
        if self.temp.is_none() {
            warn!("Dimension tool updated without an entity in progress");
            return ToolResponse::Aborted;
        }
        if args.is_cancel() {
            return self.cancel();
        }

        let response = match args.event {
            ToolEvent::Move => {
                self.track_pointer(args);
                ToolResponse::AwaitingInput
            }
            ToolEvent::Click(MouseButton::Left) => self.advance(doc, args),
            ToolEvent::Key(Key::Return) => {
                if self.state == DimensionState::Label {
                    self.commit(doc)
                } else {
                    self.advance(doc, args)
                }
            }
            ToolEvent::Key(Key::Char(KEY_CYCLE_MODE)) => {
                if let Some(temp) = self.temp.as_mut() {
                    temp.mode = temp.mode.cycle();
                }
                if self.state == DimensionState::Label {
                    self.track_pointer(args);
                }
                ToolResponse::AwaitingInput
            }
            ToolEvent::Key(key) => {
                if self.handle_restrict_key(key) && self.state == DimensionState::P1 {
                    self.track_pointer(args);
                }
                ToolResponse::AwaitingInput
            }
            ToolEvent::Click(MouseButton::Right) => ToolResponse::AwaitingInput,
        };
        self.update_tip();
        response
    }

    fn tip(&self) -> &str {
        &self.tip
    }

    fn preview(&self) -> Option<Entity> {
        self.temp.clone().map(Entity::Dimension)
    }
}
