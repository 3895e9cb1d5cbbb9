pub mod controller;
pub mod drop_target;

pub use controller::{DragController, DragEvent, DragPhase, DragState};
pub use drop_target::{is_outside_bounds, resolve_candidate_index};
