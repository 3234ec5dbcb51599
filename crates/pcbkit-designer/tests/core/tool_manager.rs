use pcbkit_core::{Coordi, ObjectType, ToolError};
use pcbkit_designer::{Document, Key, ToolArgs, ToolId, ToolManager, ToolResponse};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

fn at(x: i64, y: i64) -> Coordi {
    Coordi::new(x, y)
}

#[test]
fn test_update_before_begin_is_rejected() {
    let mut doc = Document::board();
    let mut tools = ToolManager::default();
    let err = tools.update(&mut doc, &ToolArgs::click(at(0, 0))).unwrap_err();
    assert!(matches!(
        err,
        ToolError::PreconditionViolation { ref operation, .. } if *operation == "update"
    ));
    assert_eq!(doc.entity_count(), 0);
}

#[test]
fn test_begin_while_active_is_rejected() {
    let mut doc = Document::board();
    let mut tools = ToolManager::default();
    tools
        .begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap();
    let err = tools
        .begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap_err();
    assert!(matches!(err, ToolError::PreconditionViolation { .. }));
    assert_eq!(tools.active_tool(), Some(ToolId::DrawDimension));
}

#[test]
fn test_unsupported_object_type() {
    let mut doc = Document::new([ObjectType::Via]);
    let mut tools = ToolManager::default();
    assert!(!tools.can_begin(ToolId::DrawDimension, &doc));
    let err = tools
        .begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap_err();
    assert_eq!(
        err,
        ToolError::UnsupportedObjectType {
            object_type: ObjectType::Dimension
        }
    );
    assert!(!tools.is_active());
}

#[test]
fn test_cannot_begin_without_padstack() {
    let mut doc = Document::board();
    let mut tools = ToolManager::default();
    let err = tools
        .begin(ToolId::PlaceVia, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap_err();
    assert!(matches!(err, ToolError::CannotBegin { .. }));

    doc.set_via_padstack(Some(Uuid::new_v4()));
    assert!(tools.can_begin(ToolId::PlaceVia, &doc));
}

#[test]
fn test_terminal_response_releases_tool() {
    let mut doc = Document::board();
    let mut tools = ToolManager::default();
    tools
        .begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap();
    assert!(tools.preview().is_some());
    let r = tools
        .update(&mut doc, &ToolArgs::key(Key::Escape, at(0, 0)))
        .unwrap();
    assert_eq!(r, ToolResponse::Aborted);
    assert!(!tools.is_active());
    assert!(tools.preview().is_none());

    let err = tools.update(&mut doc, &ToolArgs::moved(at(1, 1))).unwrap_err();
    assert!(matches!(err, ToolError::PreconditionViolation { .. }));
}

#[test]
fn test_tips_are_published_and_redraw_requested() {
    let mut doc = Document::board();
    let mut tools = ToolManager::default();
    let tips = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&tips);
    tools.set_tip_listener(move |tip| sink.borrow_mut().push(tip.to_string()));

    doc.take_redraw_request();
    tools
        .begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap();
    assert!(doc.take_redraw_request());
    tools.update(&mut doc, &ToolArgs::moved(at(3_000_000, 4_000_000))).unwrap();
    assert!(tools.tip().unwrap().contains("5.00 mm"));

    let tips = tips.borrow();
    assert_eq!(tips.len(), 2);
    assert!(tips[0].contains("second point"));
    assert!(tips[1].contains("5.00 mm"));
}

#[test]
fn test_abort_publishes_cleared_tip() {
    let mut doc = Document::board();
    let mut tools = ToolManager::default();
    let tips = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&tips);
    tools.set_tip_listener(move |tip| sink.borrow_mut().push(tip.to_string()));

    tools
        .begin(ToolId::DrawDimension, &mut doc, &ToolArgs::moved(at(0, 0)))
        .unwrap();
    let r = tools
        .update(&mut doc, &ToolArgs::key(Key::Escape, at(0, 0)))
        .unwrap();
    assert_eq!(r, ToolResponse::Aborted);

    let tips = tips.borrow();
    assert_eq!(tips.len(), 2);
    assert!(tips[0].contains("second point"));
    assert!(tips[1].is_empty(), "stale tip after abort: {}", tips[1]);
}
