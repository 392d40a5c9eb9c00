#![cfg(feature = "serde")]
//! JSON shape of the projected read models.

use partita_core::{Key, KeyAccessor, build_hierarchy};
use partita_views::{
    AccessibilityRow, LegendConfig, LegendItem, ScreenReaderSummary, describe, legend_items,
    shape_nodes,
};

fn facts() -> Vec<(&'static str, f64)> {
    vec![("north", 3.0), ("south", 1.0)]
}

#[test]
fn legend_items_survive_json() {
    let data = facts();
    let region = |f: &(&'static str, f64), _: usize| Key::from(f.0);
    let levels: [KeyAccessor<'_, (&'static str, f64)>; 1] = [&region];
    let tree = build_hierarchy(&data, |f: &(&str, f64)| f.1, &levels);
    let shapes = shape_nodes(&tree, &[]);
    let items = legend_items("chart", &shapes, &[], &LegendConfig::default());

    let json = serde_json::to_string(&items).expect("serialize");
    assert!(json.contains("\"child_id\":\"north\""));
    let back: Vec<LegendItem> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, items);
}

#[test]
fn screen_reader_rows_survive_json() {
    let data = facts();
    let region = |f: &(&'static str, f64), _: usize| Key::from(f.0);
    let levels: [KeyAccessor<'_, (&'static str, f64)>; 1] = [&region];
    let tree = build_hierarchy(&data, |f: &(&str, f64)| f.1, &levels);
    let shapes = shape_nodes(&tree, &[]);

    let rows = describe(&tree, &shapes, &[], None);
    let json = serde_json::to_value(&rows).expect("serialize");
    assert_eq!(json[0]["percentage"], "75%");
    let back: Vec<AccessibilityRow> = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, rows);

    let summary = ScreenReaderSummary::new(&tree, &shapes, &[], None);
    let json = serde_json::to_string(&summary).expect("serialize");
    let back: ScreenReaderSummary = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, summary);
}

#[test]
fn nan_depth_limit_survives_json() {
    let data = facts();
    let region = |f: &(&'static str, f64), _: usize| Key::from(f.0);
    let levels: [KeyAccessor<'_, (&'static str, f64)>; 1] = [&region];
    let tree = build_hierarchy(&data, |f: &(&str, f64)| f.1, &levels);
    let shapes = shape_nodes(&tree, &[]);

    let config = LegendConfig::default().with_max_depth(Some(f64::NAN));
    let json = serde_json::to_string(&config).expect("serialize");
    assert!(json.contains("\"max_depth\":\"NaN\""));
    let back: LegendConfig = serde_json::from_str(&json).expect("deserialize");
    assert!(back.max_depth.is_some_and(f64::is_nan));
    assert!(legend_items("chart", &shapes, &[], &back).is_empty());

    let unlimited: LegendConfig =
        serde_json::from_str(r#"{"flat_legend":false,"position":"Right"}"#).expect("deserialize");
    assert_eq!(unlimited.max_depth, None);
    let limited = LegendConfig::default().with_max_depth(Some(1.0));
    let json = serde_json::to_string(&limited).expect("serialize");
    let back: LegendConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, limited);
}
