use uuid::Uuid;

use super::*;

fn entry(kind: ItemKind, x: f64, y: f64) -> ReportEntry {
    ReportEntry {
        id: Uuid::nil(),
        kind,
        position: Percent::new(x, y),
        size: Size::default(),
        rotation: Rotation::default(),
    }
}

#[test]
fn display_text_entry() {
    let line = entry(ItemKind::Text, 50.0, 12.5).to_string();
    assert_eq!(
        line,
        "Item ID: 00000000-0000-0000-0000-000000000000, Type: text, Position: X: 50%, Y: 12.5%, Size: 0x0, Rotation: 0deg"
    );
}

#[test]
fn display_rotated_image_entry() {
    let mut e = entry(ItemKind::Image, 0.0, 0.0);
    e.size = Size::new(120.0, 80.0);
    e.rotation = Rotation::from_degrees(270);
    let line = e.to_string();
    assert!(line.contains("Type: image"));
    assert!(line.contains("Size: 120x80"));
    assert!(line.ends_with("Rotation: 270deg"));
}

#[test]
fn from_item_copies_every_field() {
    let mut item = Item::pending_image("a.png");
    item.position = Percent::new(10.0, 20.0);
    item.size = Size::new(64.0, 32.0);
    item.rotation = Rotation::from_degrees(90);

    let e = ReportEntry::from(&item);
    assert_eq!(e.id, item.id);
    assert_eq!(e.kind, ItemKind::Image);
    assert_eq!(e.position, item.position);
    assert_eq!(e.size, item.size);
    assert_eq!(e.rotation, item.rotation);
}

#[test]
fn report_preserves_order() {
    let items = vec![Item::text("a"), Item::pending_image("b.png"), Item::text("c")];
    let entries = report(&items);
    let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
    let expected: Vec<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, expected);
}

#[test]
fn report_empty() {
    assert!(report(&[]).is_empty());
}

#[test]
fn entry_serializes_rotation_as_number() {
    let mut e = entry(ItemKind::Image, 1.0, 2.0);
    e.rotation = Rotation::from_degrees(180);
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["rotation"], 180);
    assert_eq!(json["kind"], "image");
    assert_eq!(json["position"]["x"], 1.0);
}
