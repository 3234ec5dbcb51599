//! Undoable document mutations.

use crate::document::{Entity, EntityStore};
use uuid::Uuid;

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum DocumentCommand {
    InsertEntity(InsertEntity),
    RemoveEntity(RemoveEntity),
    UpdateEntity(UpdateEntity),
    Composite(CompositeCommand),
}

#[derive(Debug, Clone)]
pub struct CompositeCommand {
    pub commands: Vec<DocumentCommand>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct InsertEntity {
    pub uuid: Uuid,
    pub entity: Option<Entity>, // None when in the store, Some when undone
}

#[derive(Debug, Clone)]
pub struct RemoveEntity {
    pub uuid: Uuid,
    pub entity: Option<Entity>, // Some when removed, None when undone
}

#[derive(Debug, Clone)]
pub struct UpdateEntity {
    pub uuid: Uuid,
    pub old_state: Entity,
    pub new_state: Entity,
}

impl DocumentCommand {
    pub fn insert(entity: Entity) -> Self {
        DocumentCommand::InsertEntity(InsertEntity {
            uuid: entity.uuid(),
            entity: Some(entity),
        })
    }

    pub fn remove(uuid: Uuid) -> Self {
        DocumentCommand::RemoveEntity(RemoveEntity { uuid, entity: None })
    }

    pub fn update(old_state: Entity, new_state: Entity) -> Self {
        DocumentCommand::UpdateEntity(UpdateEntity {
            uuid: new_state.uuid(),
            old_state,
            new_state,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            DocumentCommand::InsertEntity(_) => "Insert",
            DocumentCommand::RemoveEntity(_) => "Remove",
            DocumentCommand::UpdateEntity(_) => "Update",
            DocumentCommand::Composite(cmd) => &cmd.name,
        }
    }

    pub fn apply(&mut self, store: &mut EntityStore) {
        match self {
            DocumentCommand::InsertEntity(cmd) => {
                if let Some(entity) = cmd.entity.take() {
                    store.insert(entity);
                }
            }
            DocumentCommand::RemoveEntity(cmd) => {
                if let Some(entity) = store.remove(cmd.uuid) {
                    cmd.entity = Some(entity);
                }
            }
            DocumentCommand::UpdateEntity(cmd) => {
                store.insert(cmd.new_state.clone());
            }
            DocumentCommand::Composite(cmd) => {
                for sub_cmd in &mut cmd.commands {
                    sub_cmd.apply(store);
                }
            }
        }
    }

    pub fn undo(&mut self, store: &mut EntityStore) {
        match self {
            DocumentCommand::InsertEntity(cmd) => {
                if let Some(entity) = store.remove(cmd.uuid) {
                    cmd.entity = Some(entity);
                }
            }
            DocumentCommand::RemoveEntity(cmd) => {
                if let Some(entity) = cmd.entity.take() {
                    store.insert(entity);
                }
            }
            DocumentCommand::UpdateEntity(cmd) => {
                store.insert(cmd.old_state.clone());
            }
            DocumentCommand::Composite(cmd) => {
                for sub_cmd in cmd.commands.iter_mut().rev() {
                    sub_cmd.undo(store);
                }
            }
        }
    }
}
