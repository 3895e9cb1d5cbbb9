use egui::{Pos2, Rect};

/// Slack around the row stack that still counts as droppable, so a pointer
/// hovering just past the first or last row keeps its candidate.
const SLOT_MARGIN: f32 = 8.0;

/// Map a pointer position to an insertion slot among the task rows.
///
/// `row_bounds` are the row rectangles in list order, top to bottom. The
/// returned slot is a position in `0..=len`: the number of rows whose
/// vertical midpoint lies above the pointer. An empty row list, or a pointer
/// outside the rows' joint bounds, resolves to `None` rather than an error.
pub fn resolve_candidate_index(pointer: Pos2, row_bounds: &[Rect]) -> Option<usize> {
    if row_bounds.is_empty() {
        return None;
    }

    let mut span = row_bounds[0];
    for rect in &row_bounds[1..] {
        span = span.union(*rect);
    }
    if !span.expand(SLOT_MARGIN).contains(pointer) {
        return None;
    }

    let slot = row_bounds
        .iter()
        .filter(|rect| rect.center().y < pointer.y)
        .count();
    Some(slot)
}

/// Whether the pointer has left the droppable container. The controller uses
/// this to clear the candidate without ending the drag.
pub fn is_outside_bounds(pointer: Pos2, container: Rect) -> bool {
    !container.contains(pointer)
}
