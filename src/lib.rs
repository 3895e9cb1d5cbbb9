//! Drag-reorder and recalculation engine for construction project schedules.
//!
//! The crate validates dependency-consistent task orders, recomputes dates,
//! costs and the critical path after every accepted move, and drives the
//! drag gesture as an explicit state machine. It performs no I/O and renders
//! nothing; hosts supply the task collection and pointer geometry and
//! receive recalculated snapshots back.

pub mod drag;
pub mod model;
pub mod recalc;
pub mod validate;

pub use drag::{
    is_outside_bounds, resolve_candidate_index, DragController, DragEvent, DragPhase, DragState,
};
pub use model::{Schedule, ScheduleError, ScheduleSummary, Task, TaskStatus};
pub use recalc::{
    recalculate, recalculate_today, recalculate_with_calendar, Calendar, ElapsedDays, Recalculated,
};
pub use validate::{validate_order, OrderValidation, OrderViolation};
