//! Tool dispatcher.
//!
//! Owns the active tool, enforces the begin/update sequencing and forwards
//! tips to the UI.

use super::{Tool, ToolArgs, ToolId, ToolResponse, ToolSettings};
use crate::document::{Document, Entity};
use pcbkit_core::ToolError;
use tracing::{debug, info};

/// Receives the tip string after every tool operation.
pub type TipListener = Box<dyn FnMut(&str)>;

pub struct ToolManager {
    settings: ToolSettings,
    active: Option<Box<dyn Tool>>,
    tip_listener: Option<TipListener>,
}

impl ToolManager {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            active: None,
            tip_listener: None,
        }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Settings apply to tools begun afterwards.
    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    pub fn set_tip_listener(&mut self, listener: impl FnMut(&str) + 'static) {
        self.tip_listener = Some(Box::new(listener));
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_tool(&self) -> Option<ToolId> {
        self.active.as_ref().map(|t| t.id())
    }

    pub fn tip(&self) -> Option<&str> {
        self.active.as_ref().map(|t| t.tip())
    }

    pub fn preview(&self) -> Option<Entity> {
        self.active.as_ref().and_then(|t| t.preview())
    }

    /// Whether `id` could begin on `doc` now.
    pub fn can_begin(&self, id: ToolId, doc: &Document) -> bool {
        doc.has_object_type(id.object_type()) && id.create(&self.settings).can_begin(doc)
    }

    pub fn begin(
        &mut self,
        id: ToolId,
        doc: &mut Document,
        args: &ToolArgs,
    ) -> Result<ToolResponse, ToolError> {
        if let Some(active) = &self.active {
            return Err(ToolError::precondition(
                "begin",
                format!("{} is still active", active.id()),
            ));
        }
        if !doc.has_object_type(id.object_type()) {
            return Err(ToolError::UnsupportedObjectType {
                object_type: id.object_type(),
            });
        }
        let mut tool = id.create(&self.settings);
        if !tool.can_begin(doc) {
            return Err(ToolError::CannotBegin {
                tool: id.to_string(),
            });
        }

        info!("Begin tool: {}", id);
        let response = tool.begin(doc, args);
        publish_tip(&mut self.tip_listener, tool.tip());
        doc.request_redraw();
        if response.is_terminal() {
            debug!("{} finished during begin: {:?}", id, response);
        } else {
            self.active = Some(tool);
        }
        Ok(response)
    }

    pub fn update(
        &mut self,
        doc: &mut Document,
        args: &ToolArgs,
    ) -> Result<ToolResponse, ToolError> {
        let tool = self
            .active
            .as_mut()
            .ok_or_else(|| ToolError::precondition("update", "no tool is active"))?;

        let response = tool.update(doc, args);
        publish_tip(&mut self.tip_listener, tool.tip());
        doc.request_redraw();
        if response.is_terminal() {
            if let Some(tool) = self.active.take() {
                info!("Tool {} finished: {:?}", tool.id(), response);
            }
        }
        Ok(response)
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(ToolSettings::default())
    }
}

fn publish_tip(listener: &mut Option<TipListener>, tip: &str) {
    if let Some(listener) = listener.as_mut() {
        listener(tip);
    }
}
