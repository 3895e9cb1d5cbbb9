use chrono::NaiveDate;
use egui::{Pos2, Rect};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::drag::drop_target::{is_outside_bounds, resolve_candidate_index};
use crate::model::{Schedule, Task};
use crate::recalc::{recalculate, Recalculated};
use crate::validate::validate_order;

/// Transient state of an in-progress drag. Owned by the controller,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub dragged_item_id: Uuid,
    pub dragged_from_index: usize,
    /// Current hypothetical insertion slot, if the pointer is over one.
    pub candidate_index: Option<usize>,
    /// Result of the last order validation for that slot.
    pub is_valid_drop: bool,
}

/// Observable phase of the drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    ValidCandidate,
    InvalidCandidate,
}

/// Input messages driving the gesture. The host UI translates its pointer
/// events into these; the controller owns no event wiring itself.
#[derive(Debug, Clone)]
pub enum DragEvent<'a> {
    Start {
        task_id: Uuid,
        from_index: usize,
    },
    PointerMove {
        pointer: Pos2,
        /// Task row rectangles in list order, top to bottom.
        rows: &'a [Rect],
        /// The droppable container.
        container: Rect,
    },
    LeaveBounds,
    Drop,
    Cancel,
}

type RecalculateCallback = Box<dyn FnMut(&[Task], &[String])>;

/// State machine driving interactive schedule reordering.
///
/// `idle -> dragging -> {valid, invalid candidate} -> dropped | cancelled`.
/// Every transition except an accepted drop is a pure state update plus
/// read-only resolver/validator calls; only [`DragEvent::Drop`] on a valid
/// candidate (or [`DragController::force_apply`]) mutates the schedule, and
/// it does so by atomic replacement. Cancelling at any point leaves the
/// schedule untouched.
pub struct DragController {
    schedule: Schedule,
    project_start: NaiveDate,
    drag: Option<DragState>,
    on_recalculate: Option<RecalculateCallback>,
}

impl DragController {
    pub fn new(schedule: Schedule, project_start: NaiveDate) -> Self {
        Self {
            schedule,
            project_start,
            drag: None,
            on_recalculate: None,
        }
    }

    /// Register the reorder-completion callback, invoked exactly once per
    /// applied drop with the recalculated tasks and any warnings.
    pub fn set_on_recalculate(
        &mut self,
        callback: impl FnMut(&[Task], &[String]) + 'static,
    ) {
        self.on_recalculate = Some(Box::new(callback));
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn project_start(&self) -> NaiveDate {
        self.project_start
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn phase(&self) -> DragPhase {
        match &self.drag {
            None => DragPhase::Idle,
            Some(state) => match state.candidate_index {
                None => DragPhase::Dragging,
                Some(_) if state.is_valid_drop => DragPhase::ValidCandidate,
                Some(_) => DragPhase::InvalidCandidate,
            },
        }
    }

    /// Feed one event through the machine. Returns the recalculation outcome
    /// when the event applied a reorder, `None` otherwise. Stale or
    /// out-of-sequence events are ignored rather than panicking: the gesture
    /// must survive any transient frame.
    pub fn handle(&mut self, event: DragEvent<'_>) -> Option<Recalculated> {
        match event {
            DragEvent::Start {
                task_id,
                from_index,
            } => {
                if self.drag.is_some() {
                    warn!("drag start while a drag is active; ignoring");
                    return None;
                }
                match self.schedule.tasks().get(from_index) {
                    Some(task) if task.id == task_id => {
                        debug!(task = %task.name, from_index, "drag started");
                        self.drag = Some(DragState {
                            dragged_item_id: task_id,
                            dragged_from_index: from_index,
                            candidate_index: None,
                            is_valid_drop: false,
                        });
                    }
                    _ => warn!(%task_id, from_index, "drag start does not match schedule; ignoring"),
                }
                None
            }

            DragEvent::PointerMove {
                pointer,
                rows,
                container,
            } => {
                let Some(drag) = self.drag.as_mut() else {
                    return None;
                };
                if is_outside_bounds(pointer, container) {
                    drag.candidate_index = None;
                    drag.is_valid_drop = false;
                    return None;
                }
                match resolve_candidate_index(pointer, rows) {
                    None => {
                        drag.candidate_index = None;
                        drag.is_valid_drop = false;
                    }
                    Some(slot) => {
                        let proposed =
                            self.schedule.moved_order(drag.dragged_from_index, slot);
                        let check = validate_order(self.schedule.tasks(), &proposed);
                        drag.candidate_index = Some(slot);
                        drag.is_valid_drop = check.is_valid;
                    }
                }
                None
            }

            DragEvent::LeaveBounds => {
                if let Some(drag) = self.drag.as_mut() {
                    drag.candidate_index = None;
                    drag.is_valid_drop = false;
                }
                None
            }

            DragEvent::Drop => {
                let Some(drag) = self.drag.take() else {
                    return None;
                };
                match drag.candidate_index {
                    Some(slot) if drag.is_valid_drop => {
                        Some(self.apply(drag.dragged_from_index, slot))
                    }
                    _ => {
                        debug!("drop without a valid candidate; schedule unchanged");
                        None
                    }
                }
            }

            DragEvent::Cancel => {
                if self.drag.take().is_some() {
                    debug!("drag cancelled; schedule unchanged");
                }
                None
            }
        }
    }

    /// Apply the current candidate even though validation rejected it: the
    /// user-confirmed "forced drop". Recalculation proceeds best-effort and
    /// the outcome carries the dependency warnings. Without a candidate the
    /// gesture simply continues.
    pub fn force_apply(&mut self) -> Option<Recalculated> {
        let Some(drag) = self.drag.take() else {
            return None;
        };
        let Some(slot) = drag.candidate_index else {
            self.drag = Some(drag);
            return None;
        };
        warn!(
            task_id = %drag.dragged_item_id,
            slot,
            "force-applying a reorder past failed validation"
        );
        Some(self.apply(drag.dragged_from_index, slot))
    }

    fn apply(&mut self, from_index: usize, slot: usize) -> Recalculated {
        let moved = self.schedule.apply_move(from_index, slot);
        let outcome = recalculate(moved.tasks(), self.project_start);
        // The old snapshot stays intact until this assignment.
        self.schedule = Schedule::from_validated(outcome.tasks.clone());
        if let Some(callback) = self.on_recalculate.as_mut() {
            callback(&outcome.tasks, &outcome.warnings);
        }
        debug!(
            from_index,
            slot,
            warnings = outcome.warnings.len(),
            "reorder applied and schedule recalculated"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use chrono::Duration;
    use egui::{pos2, vec2};

    use super::*;

    const ROW_HEIGHT: f32 = 30.0;

    fn start_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn day(offset: i64) -> NaiveDate {
        start_day() + Duration::days(offset)
    }

    /// A(2), B(3, deps A), C(1, deps A) with row geometry for three rows.
    fn controller() -> (DragController, Vec<Rect>, Rect) {
        let a = Task::new("A", 2).with_cost(100.0);
        let b = Task::new("B", 3).with_cost(250.0).with_dependency(a.id);
        let c = Task::new("C", 1).with_cost(50.0).with_dependency(a.id);
        let schedule = Schedule::new(vec![a, b, c]).unwrap();

        let rows: Vec<Rect> = (0..3)
            .map(|i| {
                Rect::from_min_size(pos2(0.0, i as f32 * ROW_HEIGHT), vec2(240.0, ROW_HEIGHT))
            })
            .collect();
        let container = Rect::from_min_size(pos2(0.0, 0.0), vec2(240.0, 3.0 * ROW_HEIGHT));
        (DragController::new(schedule, start_day()), rows, container)
    }

    fn pointer_for_slot(slot: usize) -> Pos2 {
        // Midpoint rule: a pointer just above row `slot`'s center.
        pos2(100.0, slot as f32 * ROW_HEIGHT + 4.0)
    }

    #[test]
    fn full_gesture_applies_and_recalculates() {
        let (mut controller, rows, container) = controller();
        let ids = controller.schedule().order();
        let calls = Rc::new(Cell::new(0usize));
        let seen = Rc::clone(&calls);
        controller.set_on_recalculate(move |tasks, warnings| {
            seen.set(seen.get() + 1);
            assert_eq!(tasks.len(), 3);
            assert!(warnings.is_empty());
        });

        controller.handle(DragEvent::Start {
            task_id: ids[2],
            from_index: 2,
        });
        assert_eq!(controller.phase(), DragPhase::Dragging);

        // Hover C between A and B: [A, C, B] keeps C after its dependency.
        controller.handle(DragEvent::PointerMove {
            pointer: pointer_for_slot(1),
            rows: &rows,
            container,
        });
        assert_eq!(controller.phase(), DragPhase::ValidCandidate);

        let outcome = controller.handle(DragEvent::Drop).expect("drop applies");
        assert_eq!(controller.phase(), DragPhase::Idle);
        assert_eq!(calls.get(), 1);

        let order = controller.schedule().order();
        assert_eq!(order, vec![ids[0], ids[2], ids[1]]);
        assert_eq!(outcome.summary.total_duration_days, 5);
        assert_eq!(outcome.summary.critical_path, vec![ids[0], ids[1]]);
        // C now dated right after A.
        assert_eq!(controller.schedule().tasks()[1].start, day(2));
        assert_eq!(controller.schedule().tasks()[1].end, day(3));
    }

    #[test]
    fn invalid_candidate_drop_cancels_without_mutation() {
        let (mut controller, rows, container) = controller();
        let ids = controller.schedule().order();
        let before = controller.schedule().clone();

        controller.handle(DragEvent::Start {
            task_id: ids[2],
            from_index: 2,
        });
        // Hover C above A: C would precede its dependency.
        controller.handle(DragEvent::PointerMove {
            pointer: pointer_for_slot(0),
            rows: &rows,
            container,
        });
        assert_eq!(controller.phase(), DragPhase::InvalidCandidate);

        assert!(controller.handle(DragEvent::Drop).is_none());
        assert_eq!(controller.phase(), DragPhase::Idle);
        assert_eq!(controller.schedule(), &before);
    }

    #[test]
    fn cancel_leaves_everything_untouched() {
        let (mut controller, rows, container) = controller();
        let ids = controller.schedule().order();
        let before = controller.schedule().clone();

        controller.handle(DragEvent::Start {
            task_id: ids[1],
            from_index: 1,
        });
        controller.handle(DragEvent::PointerMove {
            pointer: pointer_for_slot(0),
            rows: &rows,
            container,
        });
        controller.handle(DragEvent::Cancel);

        assert_eq!(controller.phase(), DragPhase::Idle);
        assert_eq!(controller.schedule(), &before);
    }

    #[test]
    fn leaving_the_container_clears_the_candidate_but_keeps_dragging() {
        let (mut controller, rows, container) = controller();
        let ids = controller.schedule().order();

        controller.handle(DragEvent::Start {
            task_id: ids[2],
            from_index: 2,
        });
        controller.handle(DragEvent::PointerMove {
            pointer: pointer_for_slot(1),
            rows: &rows,
            container,
        });
        assert_eq!(controller.phase(), DragPhase::ValidCandidate);

        // Pointer exits the container: back to plain dragging.
        controller.handle(DragEvent::PointerMove {
            pointer: pos2(100.0, 400.0),
            rows: &rows,
            container,
        });
        assert_eq!(controller.phase(), DragPhase::Dragging);

        // A drop out here is a cancellation.
        assert!(controller.handle(DragEvent::Drop).is_none());
        assert_eq!(controller.phase(), DragPhase::Idle);
    }

    #[test]
    fn explicit_leave_bounds_event_clears_the_candidate() {
        let (mut controller, rows, container) = controller();
        let ids = controller.schedule().order();

        controller.handle(DragEvent::Start {
            task_id: ids[2],
            from_index: 2,
        });
        controller.handle(DragEvent::PointerMove {
            pointer: pointer_for_slot(1),
            rows: &rows,
            container,
        });
        controller.handle(DragEvent::LeaveBounds);
        assert_eq!(controller.phase(), DragPhase::Dragging);
    }

    #[test]
    fn stale_start_event_is_ignored() {
        let (mut controller, _rows, _container) = controller();
        // Index and id disagree: the row list shifted under the gesture.
        controller.handle(DragEvent::Start {
            task_id: Uuid::new_v4(),
            from_index: 0,
        });
        assert_eq!(controller.phase(), DragPhase::Idle);
    }

    #[test]
    fn force_apply_surfaces_warnings() {
        let (mut controller, rows, container) = controller();
        let ids = controller.schedule().order();
        let calls = Rc::new(Cell::new(0usize));
        let seen = Rc::clone(&calls);
        controller.set_on_recalculate(move |_tasks, warnings| {
            seen.set(seen.get() + 1);
            assert_eq!(warnings.len(), 1);
        });

        controller.handle(DragEvent::Start {
            task_id: ids[2],
            from_index: 2,
        });
        controller.handle(DragEvent::PointerMove {
            pointer: pointer_for_slot(0),
            rows: &rows,
            container,
        });
        assert_eq!(controller.phase(), DragPhase::InvalidCandidate);

        let outcome = controller.force_apply().expect("forced drop applies");
        assert_eq!(calls.get(), 1);
        assert_eq!(controller.phase(), DragPhase::Idle);
        assert_eq!(
            controller.schedule().order(),
            vec![ids[2], ids[0], ids[1]]
        );
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("'C'"));
        // Best effort: C anchored at project start.
        assert_eq!(controller.schedule().tasks()[0].start, start_day());
    }

    #[test]
    fn force_apply_without_a_candidate_keeps_dragging() {
        let (mut controller, _rows, _container) = controller();
        let ids = controller.schedule().order();
        controller.handle(DragEvent::Start {
            task_id: ids[0],
            from_index: 0,
        });
        assert!(controller.force_apply().is_none());
        assert_eq!(controller.phase(), DragPhase::Dragging);
    }
}
