use pcbkit_core::{Coordi, MeasurementSystem};
use pcbkit_designer::{
    Document, Entity, Key, Tool, ToolArgs, ToolPlaceVia, ToolResponse, ToolSettings,
};
use uuid::Uuid;

fn board_with_padstack() -> (Document, Uuid) {
    let mut doc = Document::board();
    let padstack = Uuid::new_v4();
    doc.set_via_padstack(Some(padstack));
    (doc, padstack)
}

#[test]
fn test_requires_padstack() {
    let doc = Document::board();
    assert!(!ToolPlaceVia::default().can_begin(&doc));
    let (doc, _) = board_with_padstack();
    assert!(ToolPlaceVia::default().can_begin(&doc));
}

#[test]
fn test_click_places_via_at_pointer() {
    let (mut doc, padstack) = board_with_padstack();
    let mut tool = ToolPlaceVia::default();
    tool.begin(&mut doc, &ToolArgs::moved(Coordi::new(0, 0)));
    tool.update(&mut doc, &ToolArgs::moved(Coordi::new(2_000, 3_000)));
    match tool.preview() {
        Some(Entity::Via(v)) => assert_eq!(v.position, Coordi::new(2_000, 3_000)),
        other => panic!("unexpected preview {:?}", other),
    }

    let r = tool.update(&mut doc, &ToolArgs::click(Coordi::new(2_500, 3_000)));
    assert_eq!(r, ToolResponse::Complete);
    let vias: Vec<_> = doc.vias().collect();
    assert_eq!(vias.len(), 1);
    assert_eq!(vias[0].position, Coordi::new(2_500, 3_000));
    assert_eq!(vias[0].padstack, padstack);
    assert!(doc.can_undo());
}

#[test]
fn test_escape_discards() {
    let (mut doc, _) = board_with_padstack();
    let mut tool = ToolPlaceVia::default();
    tool.begin(&mut doc, &ToolArgs::moved(Coordi::new(0, 0)));
    let r = tool.update(&mut doc, &ToolArgs::key(Key::Escape, Coordi::new(0, 0)));
    assert_eq!(r, ToolResponse::Aborted);
    assert_eq!(doc.entity_count(), 0);
    assert!(tool.preview().is_none());
}

#[test]
fn test_tip_uses_configured_units() {
    let (mut doc, _) = board_with_padstack();
    let settings = ToolSettings {
        measurement_system: MeasurementSystem::Imperial,
        ..ToolSettings::default()
    };
    let mut tool = ToolPlaceVia::new(&settings);
    tool.begin(&mut doc, &ToolArgs::moved(Coordi::new(25_400_000, 12_700_000)));
    assert!(tool.tip().contains("(1.000 in, 0.500 in)"), "{}", tool.tip());

    let r = tool.update(&mut doc, &ToolArgs::key(Key::Escape, Coordi::new(0, 0)));
    assert_eq!(r, ToolResponse::Aborted);
    assert!(tool.tip().is_empty());
}
