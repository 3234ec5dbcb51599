use pcbkit_core::{Coordi, MeasurementSystem};
use pcbkit_designer::{
    DimensionMode, DimensionState, Document, Key, MouseButton, RestrictMode, RestrictSettings,
    Tool, ToolArgs, ToolDrawDimension, ToolEvent, ToolResponse, ToolSettings,
};

fn c(x: i64, y: i64) -> Coordi {
    Coordi::new(x, y)
}

fn right_click(coords: Coordi) -> ToolArgs {
    ToolArgs {
        event: ToolEvent::Click(MouseButton::Right),
        coords,
    }
}

#[test]
fn test_full_sequence_commits_one_dimension() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());

    assert!(tool.can_begin(&doc));
    assert_eq!(tool.begin(&mut doc, &ToolArgs::moved(c(0, 0))), ToolResponse::AwaitingInput);
    assert_eq!(tool.update(&mut doc, &ToolArgs::moved(c(4_000_000, 3_000_000))), ToolResponse::AwaitingInput);
    assert_eq!(tool.temp().unwrap().p1, c(4_000_000, 3_000_000));

    assert_eq!(tool.update(&mut doc, &ToolArgs::click(c(4_000_000, 3_000_000))), ToolResponse::AwaitingInput);
    assert_eq!(tool.state(), DimensionState::Label);
    assert_eq!(doc.entity_count(), 0);

    assert_eq!(tool.update(&mut doc, &ToolArgs::click(c(0, 1_000_000))), ToolResponse::Complete);
    assert_eq!(tool.state(), DimensionState::Finished);
    assert!(tool.temp().is_none());

    let dims: Vec<_> = doc.dimensions().collect();
    assert_eq!(dims.len(), 1);
    assert_eq!(dims[0].p0, c(0, 0));
    assert_eq!(dims[0].p1, c(4_000_000, 3_000_000));
    assert_eq!(dims[0].length(), 5_000_000);
    assert_eq!(dims[0].label_text(MeasurementSystem::Metric), "5.00 mm");
}

#[test]
fn test_label_follows_pointer() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::click(c(10_000_000, 0)));
    tool.update(&mut doc, &ToolArgs::moved(c(3_000_000, 2_000_000)));
    assert_eq!(tool.temp().unwrap().label_distance, 2_000_000);
    tool.update(&mut doc, &ToolArgs::moved(c(3_000_000, -500_000)));
    assert_eq!(tool.temp().unwrap().label_distance, -500_000);
    // Anchors are fixed in the label state.
    assert_eq!(tool.temp().unwrap().p1, c(10_000_000, 0));
}

#[test]
fn test_cancel_in_p1_leaves_document_untouched() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::moved(c(5, 5)));
    let r = tool.update(&mut doc, &ToolArgs::key(Key::Escape, c(5, 5)));
    assert_eq!(r, ToolResponse::Aborted);
    assert_eq!(doc.entity_count(), 0);
    assert!(!doc.can_undo());
    assert!(tool.temp().is_none());
}

#[test]
fn test_right_click_in_label_aborts() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::click(c(7, 0)));
    assert_eq!(tool.update(&mut doc, &right_click(c(7, 3))), ToolResponse::Aborted);
    assert_eq!(doc.entity_count(), 0);
}

#[test]
fn test_zero_length_dimension_is_accepted() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(1_000, 1_000)));
    tool.update(&mut doc, &ToolArgs::click(c(1_000, 1_000)));
    let r = tool.update(&mut doc, &ToolArgs::click(c(1_000, 3_000)));
    assert_eq!(r, ToolResponse::Complete);
    let d = doc.dimensions().next().unwrap();
    assert_eq!(d.p0, d.p1);
    assert_eq!(d.length(), 0);
    assert_eq!(d.label_distance, 2_000);
}

#[test]
fn test_horizontal_restriction_applies_to_second_anchor() {
    let settings = ToolSettings {
        restrict: RestrictSettings {
            default_mode: RestrictMode::X,
            angle_step_deg: 45.0,
        },
        ..ToolSettings::default()
    };
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&settings);
    tool.begin(&mut doc, &ToolArgs::moved(c(100, 200)));
    tool.update(&mut doc, &ToolArgs::moved(c(900, 750)));
    assert_eq!(tool.temp().unwrap().p1, c(900, 200));
    assert!(tool.tip().contains("restrict: X only"));
    tool.update(&mut doc, &ToolArgs::click(c(800, 640)));
    tool.update(&mut doc, &ToolArgs::key(Key::Return, c(800, 640)));
    let d = doc.dimensions().next().unwrap();
    assert_eq!(d.p1, c(800, 200));
}

#[test]
fn test_restrict_key_reapplies_constraint() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::moved(c(50, 40)));
    assert_eq!(tool.temp().unwrap().p1, c(50, 40));
    tool.update(&mut doc, &ToolArgs::key(Key::Char('/'), c(50, 40)));
    assert_eq!(tool.temp().unwrap().p1, c(50, 0));
    tool.update(&mut doc, &ToolArgs::key(Key::Char('x'), c(50, 40)));
    assert_eq!(tool.temp().unwrap().p1, c(0, 40));
}

#[test]
fn test_mode_key_cycles_dimension_mode() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::key(Key::Char('m'), c(0, 0)));
    assert_eq!(tool.temp().unwrap().mode, DimensionMode::Horizontal);
    assert!(tool.tip().contains("horizontal"));
}

#[test]
fn test_cannot_begin_without_work_layer() {
    let mut doc = Document::board();
    doc.set_work_layer(None);
    let tool = ToolDrawDimension::new(&ToolSettings::default());
    assert!(!tool.can_begin(&doc));
}

#[test]
fn test_begin_clears_selection() {
    let mut doc = Document::board();
    let mut first = ToolDrawDimension::new(&ToolSettings::default());
    first.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    first.update(&mut doc, &ToolArgs::click(c(1, 0)));
    first.update(&mut doc, &ToolArgs::click(c(1, 1)));
    let uuid = doc.dimensions().next().unwrap().uuid;
    doc.select(uuid);
    assert_eq!(doc.selection().len(), 1);

    let mut second = ToolDrawDimension::new(&ToolSettings::default());
    second.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    assert!(doc.selection().is_empty());
}

#[test]
fn test_imperial_units_in_tip() {
    let settings = ToolSettings {
        measurement_system: MeasurementSystem::Imperial,
        ..ToolSettings::default()
    };
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&settings);
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::moved(c(50_800_000, 0)));
    assert!(tool.tip().contains("2.000 in"), "{}", tool.tip());
    assert!(!tool.tip().contains("mm"));
}

#[test]
fn test_cancel_clears_tip() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    assert!(tool.tip().contains("second point"));
    let r = tool.update(&mut doc, &ToolArgs::key(Key::Escape, c(0, 0)));
    assert_eq!(r, ToolResponse::Aborted);
    assert_eq!(tool.state(), DimensionState::Finished);
    assert!(tool.tip().is_empty());
}

#[test]
fn test_mode_key_in_label_state_reprojects_label() {
    let mut doc = Document::board();
    let mut tool = ToolDrawDimension::new(&ToolSettings::default());
    tool.begin(&mut doc, &ToolArgs::moved(c(0, 0)));
    tool.update(&mut doc, &ToolArgs::click(c(4_000_000, 3_000_000)));
    tool.update(&mut doc, &ToolArgs::moved(c(1_000_000, 2_000_000)));
    assert_eq!(tool.temp().unwrap().label_distance, 1_000_000);

    // Horizontal measurement: the label offset is along Y.
    tool.update(&mut doc, &ToolArgs::key(Key::Char('m'), c(1_000_000, 2_000_000)));
    assert_eq!(tool.temp().unwrap().mode, DimensionMode::Horizontal);
    assert_eq!(tool.temp().unwrap().label_distance, 2_000_000);

    tool.update(&mut doc, &ToolArgs::key(Key::Return, c(1_000_000, 2_000_000)));
    let d = doc.dimensions().next().unwrap();
    assert_eq!(d.mode, DimensionMode::Horizontal);
    assert_eq!(d.label_distance, 2_000_000);
}
