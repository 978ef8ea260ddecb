//! Inbound connection table tests

use std::rc::Rc;

use pretty_assertions::assert_eq;
use spyglass::*;

fn button() -> Rc<MetaObject> {
    MetaObjectBuilder::new("Button")
        .signal("clicked()")
        .signal("pressed()")
        .build()
        .unwrap()
}

fn dialog() -> Rc<MetaObject> {
    MetaObjectBuilder::new("Dialog")
        .slot("accept()", |_, _| {})
        .slot("reject()", |_, _| {})
        .build()
        .unwrap()
}

fn row(model: &InboundConnectionsModel, row: usize) -> Vec<Option<String>> {
    (0..model.column_count())
        .map(|column| model.data(row, column))
        .collect()
}

fn cells(texts: [&str; 3]) -> Vec<Option<String>> {
    texts.iter().map(|t| Some(t.to_string())).collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Shape
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_model_still_has_three_columns() {
    let model = InboundConnectionsModel::new();
    assert_eq!(model.row_count(), 0);
    assert_eq!(model.column_count(), 3);
    assert_eq!(
        (0..3).map(|s| model.header_data(s)).collect::<Vec<_>>(),
        vec![Some("Sender"), Some("Signal"), Some("Slot")]
    );
    assert_eq!(model.data(0, 0), None);
}

#[test]
fn test_object_without_connections_is_empty() {
    let target = Object::new(dialog());
    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    assert_eq!(model.row_count(), 0);
    assert_eq!(model.column_count(), 3);
}

#[test]
fn test_out_of_range_cells_are_empty() -> anyhow::Result<()> {
    let ok = Object::with_name(button(), "ok");
    let target = Object::new(dialog());
    Object::connect_by_signature(&ok, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    assert_eq!(model.data(1, 0), None);
    assert_eq!(model.data(0, 3), None);
    assert!(model.connection(1).is_none());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Snapshot Contents
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_rows_most_recent_first() -> anyhow::Result<()> {
    let ok = Object::with_name(button(), "ok");
    let cancel = Object::with_name(button(), "cancel");
    let target = Object::new(dialog());
    Object::connect_by_signature(&ok, "clicked()", &target, "accept()")?;
    Object::connect_by_signature(&cancel, "pressed()", &target, "reject()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));

    assert_eq!(model.row_count(), 2);
    assert_eq!(
        row(&model, 0),
        cells(["cancel (Button)", "pressed()", "reject()"])
    );
    assert_eq!(row(&model, 1), cells(["ok (Button)", "clicked()", "accept()"]));
    Ok(())
}

#[test]
fn test_unnamed_sender_shows_identity() -> anyhow::Result<()> {
    let sender = Object::new(button());
    let target = Object::new(dialog());
    Object::connect_by_signature(&sender, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));

    let text = model.data(0, 0).unwrap_or_default();
    assert_eq!(text, format!("{} (Button)", sender.id()));
    assert!(text.starts_with("0x"));
    Ok(())
}

#[test]
fn test_destroyed_sender_renders_sentinel() -> anyhow::Result<()> {
    let sender = Object::with_name(button(), "ok");
    let target = Object::new(dialog());
    Object::connect_by_signature(&sender, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    drop(sender);

    assert_eq!(model.row_count(), 1);
    assert_eq!(row(&model, 0), cells(["<destroyed>", "<destroyed>", "accept()"]));
    assert!(!model.connection(0).map_or(true, |c| c.sender.is_alive()));
    Ok(())
}

#[test]
fn test_unknown_signal_renders_sentinel() -> anyhow::Result<()> {
    let sender = Object::with_name(button(), "relay");
    let target = Object::new(dialog());
    let accept = target.meta_object().index_of_method("accept()").unwrap();
    Object::connect_all_signals(&sender, &target, accept)?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));

    assert_eq!(row(&model, 0), cells(["relay (Button)", "<unknown>", "accept()"]));
    assert_eq!(model.connection(0).and_then(|c| c.signal_index), None);
    Ok(())
}

#[test]
fn test_destroyed_receiver_empties_cells() -> anyhow::Result<()> {
    let sender = Object::new(button());
    let target = Object::new(dialog());
    Object::connect_by_signature(&sender, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    drop(target);

    assert!(model.object().is_none());
    assert_eq!(row(&model, 0), vec![None, None, None]);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Snapshot Lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_snapshot_is_frozen_until_reset() -> anyhow::Result<()> {
    let ok = Object::new(button());
    let target = Object::new(dialog());
    Object::connect_by_signature(&ok, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    Object::connect_by_signature(&ok, "pressed()", &target, "reject()")?;
    assert_eq!(model.row_count(), 1);

    model.set_object(Some(&target));
    assert_eq!(model.row_count(), 2);
    Ok(())
}

#[test]
fn test_disconnect_shows_after_resnapshot() -> anyhow::Result<()> {
    let ok = Object::new(button());
    let target = Object::new(dialog());
    let id = Object::connect_by_signature(&ok, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    assert!(ok.disconnect(id));
    assert_eq!(model.row_count(), 1);

    model.set_object(Some(&target));
    assert_eq!(model.row_count(), 0);
    Ok(())
}

#[test]
fn test_clearing_object_empties_table() -> anyhow::Result<()> {
    let ok = Object::new(button());
    let target = Object::new(dialog());
    Object::connect_by_signature(&ok, "clicked()", &target, "accept()")?;

    let mut model = InboundConnectionsModel::new();
    model.set_object(Some(&target));
    model.set_object(None);
    assert_eq!(model.row_count(), 0);
    assert_eq!(model.column_count(), 3);
    Ok(())
}
