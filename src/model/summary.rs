use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived totals for a schedule, recomputed wholesale after every accepted
/// reorder. Never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Length of the critical path, in elapsed business-day units.
    pub total_duration_days: i64,
    /// Sum of all task costs. Invariant under reordering.
    pub total_cost: f64,
    /// Task ids forming the longest dependency chain by duration,
    /// in execution order.
    pub critical_path: Vec<Uuid>,
}
