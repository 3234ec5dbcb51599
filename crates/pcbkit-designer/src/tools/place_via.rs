//! Single-click via placement.

use super::{Key, MouseButton, Tool, ToolArgs, ToolEvent, ToolId, ToolResponse, ToolSettings};
use crate::document::{Document, Entity, Via};
use pcbkit_core::{format_length, MeasurementSystem, ObjectType};
use tracing::info;
use uuid::Uuid;

pub struct ToolPlaceVia {
    temp: Option<Via>,
    units: MeasurementSystem,
    tip: String,
}

impl ToolPlaceVia {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            temp: None,
            units: settings.measurement_system,
            tip: String::new(),
        }
    }

    fn update_tip(&mut self) {
        self.tip = match &self.temp {
            Some(via) => format!(
                "LMB: place via at ({}, {})  RMB: cancel",
                format_length(via.position.x, self.units),
                format_length(via.position.y, self.units)
            ),
            None => String::new(),
        };
    }
}

impl Default for ToolPlaceVia {
    fn default() -> Self {
        Self::new(&ToolSettings::default())
    }
}

impl Tool for ToolPlaceVia {
    fn id(&self) -> ToolId {
        ToolId::PlaceVia
    }

    fn can_begin(&self, doc: &Document) -> bool {
        doc.has_object_type(ObjectType::Via) && doc.via_padstack().is_some()
    }

    fn begin(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse {
        let Some(padstack) = doc.via_padstack() else {
            return ToolResponse::Aborted;
        };
        doc.clear_selection();
        self.temp = Some(Via::new(Uuid::new_v4(), args.coords, padstack));
        self.update_tip();
        ToolResponse::AwaitingInput
    }

    fn update(&mut self, doc: &mut Document, args: &ToolArgs) -> ToolResponse {
        if args.is_cancel() {
            self.temp = None;
            self.update_tip();
            return ToolResponse::Aborted;
        }
        let response = match args.event {
            ToolEvent::Move => {
                if let Some(via) = self.temp.as_mut() {
                    via.position = args.coords;
                }
                ToolResponse::AwaitingInput
            }
            ToolEvent::Click(MouseButton::Left) | ToolEvent::Key(Key::Return) => {
                match self.temp.take() {
                    Some(mut via) => {
                        via.position = args.coords;
                        info!("Placing via {} at {}", via.uuid, via.position);
                        let mut tx = doc.transaction("Place via");
                        tx.insert(via);
                        tx.commit();
                        ToolResponse::Complete
                    }
                    None => ToolResponse::Aborted,
                }
            }
            _ => ToolResponse::AwaitingInput,
        };
        self.update_tip();
        response
    }

    fn tip(&self) -> &str {
        &self.tip
    }

    fn preview(&self) -> Option<Entity> {
        self.temp.clone().map(Entity::Via)
    }
}
