use super::*;
use crate::doc::{CanvasElement, Shape, Style};

fn with_rects(n: usize) -> CanvasData {
    let mut data = CanvasData::default();
    for i in 0..n {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f64 * 10.0;
        data.push(CanvasElement::new(
            Shape::Rectangle { x, y: 0.0, width: 5.0, height: 5.0 },
            Style::default(),
            data.next_z_index(),
        ));
    }
    data
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_history_has_one_snapshot_and_no_moves() {
    let h = History::new(CanvasData::default());
    assert_eq!(h.len(), 1);
    assert_eq!(h.index(), 0);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert_eq!(h.current(), Some(&CanvasData::default()));
}

#[test]
fn undo_and_redo_at_bounds_are_noops() {
    let mut h = History::default();
    assert!(h.undo().is_none());
    assert!(h.redo().is_none());
    assert_eq!(h.index(), 0);
}

// =============================================================
// Push / undo / redo
// =============================================================

#[test]
fn push_moves_cursor_to_tip() {
    let mut h = History::default();
    h.push(with_rects(1));
    h.push(with_rects(2));
    assert_eq!(h.len(), 3);
    assert_eq!(h.index(), 2);
    assert!(h.can_undo());
    assert!(!h.can_redo());
}

#[test]
fn undo_then_redo_restores_exact_snapshot() {
    let mut h = History::default();
    let before = with_rects(2);
    h.push(with_rects(1));
    h.push(before.clone());

    assert_eq!(h.undo().map(CanvasData::len), Some(1));
    let redone = h.redo().cloned().unwrap();
    assert_eq!(redone, before);
}

#[test]
fn undo_redo_survives_json_round_trip() {
    let mut h = History::default();
    let snapshot = with_rects(3);
    h.push(snapshot.clone());
    h.undo();
    let redone = h.redo().cloned().unwrap();

    let json = serde_json::to_string(&redone).unwrap();
    let back: CanvasData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn push_after_undo_truncates_redo_branch() {
    let mut h = History::default();
    h.push(with_rects(1));
    h.push(with_rects(2));
    h.undo();
    h.undo();
    h.push(with_rects(5));

    assert_eq!(h.len(), 2);
    assert!(!h.can_redo());
    assert_eq!(h.current().map(CanvasData::len), Some(5));
}

// =============================================================
// Capacity
// =============================================================

#[test]
fn limit_drops_oldest_snapshots() {
    let mut h = History::with_limit(CanvasData::default(), 3);
    for n in 1..=5 {
        h.push(with_rects(n));
    }
    assert_eq!(h.len(), 3);
    assert_eq!(h.index(), 2);
    h.undo();
    h.undo();
    assert!(!h.can_undo());
    assert_eq!(h.current().map(CanvasData::len), Some(3));
}

#[test]
fn zero_limit_keeps_one_snapshot() {
    let mut h = History::with_limit(CanvasData::default(), 0);
    h.push(with_rects(1));
    assert_eq!(h.len(), 1);
    assert_eq!(h.current().map(CanvasData::len), Some(1));
}

#[test]
fn reset_starts_over() {
    let mut h = History::default();
    h.push(with_rects(1));
    h.reset(with_rects(4));
    assert_eq!(h.len(), 1);
    assert_eq!(h.index(), 0);
    assert_eq!(h.current().map(CanvasData::len), Some(4));
}
