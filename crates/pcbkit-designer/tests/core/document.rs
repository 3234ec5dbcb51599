use pcbkit_core::{Coordi, Layer, ObjectType};
use pcbkit_designer::{Dimension, Document, Entity, Via};
use uuid::Uuid;

fn dimension(doc: &Document, x: i64) -> Dimension {
    let mut d = Dimension::new(Uuid::new_v4(), doc.uuid(), Coordi::new(0, 0));
    d.p1 = Coordi::new(x, 0);
    d
}

#[test]
fn test_board_document_capabilities() {
    let doc = Document::board();
    assert!(doc.has_object_type(ObjectType::Dimension));
    assert!(doc.has_object_type(ObjectType::Via));
    assert_eq!(doc.work_layer(), Some(Layer::TopCopper));
    assert_eq!(doc.entity_count(), 0);
}

#[test]
fn test_committed_transaction_is_one_undo_step() {
    let mut doc = Document::board();
    let a = dimension(&doc, 10);
    let b = dimension(&doc, 20);

    let mut tx = doc.transaction("Add two");
    tx.insert(a.clone());
    tx.insert(b.clone());
    tx.commit();

    assert_eq!(doc.dimensions().count(), 2);
    assert!(doc.can_undo());
    assert!(doc.take_redraw_request());
    assert!(!doc.take_redraw_request());

    assert!(doc.undo());
    assert_eq!(doc.entity_count(), 0);
    assert!(doc.can_redo());

    assert!(doc.redo());
    assert_eq!(doc.entity(a.uuid), Some(&Entity::Dimension(a)));
}

#[test]
fn test_dropped_transaction_rolls_back() {
    let mut doc = Document::board();
    let a = dimension(&doc, 10);
    {
        let mut tx = doc.transaction("Abandoned");
        tx.insert(a.clone());
        assert!(tx.document().entity(a.uuid).is_some());
    }
    assert_eq!(doc.entity_count(), 0);
    assert!(!doc.can_undo());
}

#[test]
fn test_update_and_remove() {
    let mut doc = Document::board();
    let via = Via::new(Uuid::new_v4(), Coordi::new(1, 1), Uuid::nil());

    let mut tx = doc.transaction("Place");
    tx.insert(via.clone());
    tx.commit();

    let mut moved = via.clone();
    moved.position = Coordi::new(9, 9);
    let mut tx = doc.transaction("Move");
    assert!(tx.update(moved.clone()));
    tx.commit();
    assert_eq!(doc.vias().next().map(|v| v.position), Some(Coordi::new(9, 9)));

    let mut tx = doc.transaction("Delete");
    assert_eq!(tx.remove(via.uuid), Some(Entity::Via(moved)));
    tx.commit();
    assert_eq!(doc.entity_count(), 0);

    doc.undo();
    doc.undo();
    assert_eq!(doc.vias().next().map(|v| v.position), Some(Coordi::new(1, 1)));
}

#[test]
fn test_update_missing_entity_is_rejected() {
    let mut doc = Document::board();
    let via = Via::new(Uuid::new_v4(), Coordi::new(1, 1), Uuid::nil());
    let mut tx = doc.transaction("Nothing");
    assert!(!tx.update(via));
    tx.commit();
    assert!(!doc.can_undo());
}

#[test]
fn test_new_commit_clears_redo() {
    let mut doc = Document::board();
    let a = dimension(&doc, 1);
    let b = dimension(&doc, 2);
    let mut tx = doc.transaction("A");
    tx.insert(a);
    tx.commit();
    doc.undo();
    let mut tx = doc.transaction("B");
    tx.insert(b);
    tx.commit();
    assert!(!doc.can_redo());
}

#[test]
fn test_selection_follows_entities() {
    let mut doc = Document::board();
    let a = dimension(&doc, 1);
    let uuid = a.uuid;
    doc.select(uuid);
    assert!(doc.selection().is_empty());

    let mut tx = doc.transaction("A");
    tx.insert(a);
    tx.commit();
    doc.select(uuid);
    assert!(doc.selection().contains(&uuid));

    doc.undo();
    assert!(doc.selection().is_empty());
}
