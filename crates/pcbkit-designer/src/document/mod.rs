//! Document model holding drawable entities keyed by identity.
//!
//! All mutation goes through a [`Transaction`]. A transaction applies its
//! changes immediately so the document is always current, records them as a
//! single undo step on [`Transaction::commit`], and rolls them back if it is
//! dropped without being committed.

mod entities;

pub use entities::{Dimension, DimensionMode, Entity, Via};

use crate::commands::{CompositeCommand, DocumentCommand};
use pcbkit_core::{Layer, ObjectType};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

/// Entity storage keyed by uuid.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: BTreeMap<Uuid, Entity>,
}

impl EntityStore {
    /// Inserts or replaces an entity, returning the previous value.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.uuid(), entity)
    }

    pub fn remove(&mut self, uuid: Uuid) -> Option<Entity> {
        self.entities.remove(&uuid)
    }

    pub fn get(&self, uuid: Uuid) -> Option<&Entity> {
        self.entities.get(&uuid)
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.entities.contains_key(&uuid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// An editable document (board or schematic sheet).
#[derive(Debug, Clone)]
pub struct Document {
    uuid: Uuid,
    store: EntityStore,
    supported: HashSet<ObjectType>,
    work_layer: Option<Layer>,
    via_padstack: Option<Uuid>,
    selection: BTreeSet<Uuid>,
    undo_stack: Vec<DocumentCommand>,
    redo_stack: Vec<DocumentCommand>,
    redraw_requested: bool,
}

impl Document {
    /// Creates an empty document supporting the given object types.
    pub fn new(supported: impl IntoIterator<Item = ObjectType>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            store: EntityStore::default(),
            supported: supported.into_iter().collect(),
            work_layer: None,
            via_padstack: None,
            selection: BTreeSet::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            redraw_requested: false,
        }
    }

    /// A board document: supports dimensions and vias, works on top copper.
    pub fn board() -> Self {
        let mut doc = Self::new([ObjectType::Dimension, ObjectType::Via]);
        doc.work_layer = Some(Layer::TopCopper);
        doc
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn has_object_type(&self, object_type: ObjectType) -> bool {
        self.supported.contains(&object_type)
    }

    pub fn work_layer(&self) -> Option<Layer> {
        self.work_layer
    }

    pub fn set_work_layer(&mut self, layer: Option<Layer>) {
        self.work_layer = layer;
    }

    /// The padstack new vias are placed with.
    pub fn via_padstack(&self) -> Option<Uuid> {
        self.via_padstack
    }

    pub fn set_via_padstack(&mut self, padstack: Option<Uuid>) {
        self.via_padstack = padstack;
    }

    pub fn entity(&self, uuid: Uuid) -> Option<&Entity> {
        self.store.get(uuid)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.store.iter()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.store.iter().filter_map(Entity::as_dimension)
    }

    pub fn vias(&self) -> impl Iterator<Item = &Via> {
        self.store.iter().filter_map(Entity::as_via)
    }

    pub fn entity_count(&self) -> usize {
        self.store.len()
    }

    pub fn selection(&self) -> &BTreeSet<Uuid> {
        &self.selection
    }

    pub fn select(&mut self, uuid: Uuid) {
        if self.store.contains(uuid) {
            self.selection.insert(uuid);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Starts a transaction. Changes are visible immediately.
    pub fn transaction(&mut self, name: impl Into<String>) -> Transaction<'_> {
        Transaction {
            doc: self,
            name: name.into(),
            applied: Vec::new(),
            committed: false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undoes the last committed transaction.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(mut cmd) => {
                cmd.undo(&mut self.store);
                debug!("Undo '{}'", cmd.name());
                self.selection.retain(|uuid| self.store.contains(*uuid));
                self.redo_stack.push(cmd);
                self.redraw_requested = true;
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone transaction.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(mut cmd) => {
                cmd.apply(&mut self.store);
                debug!("Redo '{}'", cmd.name());
                self.undo_stack.push(cmd);
                self.redraw_requested = true;
                true
            }
            None => false,
        }
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns whether a redraw was requested and clears the request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::board()
    }
}

/// A group of document changes committed or rolled back together.
pub struct Transaction<'a> {
    doc: &'a mut Document,
    name: String,
    applied: Vec<DocumentCommand>,
    committed: bool,
}

impl Transaction<'_> {
    fn run(&mut self, mut cmd: DocumentCommand) {
        cmd.apply(&mut self.doc.store);
        self.applied.push(cmd);
    }

    /// Adds an entity. An entity whose uuid already exists replaces it.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> Uuid {
        let entity = entity.into();
        let uuid = entity.uuid();
        let cmd = match self.doc.store.get(uuid) {
            Some(old) => DocumentCommand::update(old.clone(), entity),
            None => DocumentCommand::insert(entity),
        };
        self.run(cmd);
        uuid
    }

    /// Replaces an existing entity. Returns `false` if it does not exist.
    pub fn update(&mut self, entity: impl Into<Entity>) -> bool {
        let entity = entity.into();
        match self.doc.store.get(entity.uuid()) {
            Some(old) => {
                let cmd = DocumentCommand::update(old.clone(), entity);
                self.run(cmd);
                true
            }
            None => false,
        }
    }

    /// Deletes an entity, returning it.
    pub fn remove(&mut self, uuid: Uuid) -> Option<Entity> {
        let old = self.doc.store.get(uuid)?.clone();
        self.run(DocumentCommand::remove(uuid));
        self.doc.selection.remove(&uuid);
        Some(old)
    }

    /// Read access to the document while the transaction is open.
    pub fn document(&self) -> &Document {
        self.doc
    }

    /// Records the applied changes as one undo step.
    pub fn commit(mut self) {
        self.committed = true;
        if self.applied.is_empty() {
            return;
        }
        let commands = std::mem::take(&mut self.applied);
        info!("Commit '{}' ({} change(s))", self.name, commands.len());
        self.doc.undo_stack.push(DocumentCommand::Composite(CompositeCommand {
            commands,
            name: std::mem::take(&mut self.name),
        }));
        self.doc.redo_stack.clear();
        self.doc.redraw_requested = true;
    }

    /// Discards the applied changes.
    pub fn rollback(self) {}
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for cmd in self.applied.iter_mut().rev() {
            cmd.undo(&mut self.doc.store);
        }
        if !self.applied.is_empty() {
            debug!("Rolled back '{}'", self.name);
        }
    }
}
