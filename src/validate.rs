use std::collections::HashMap;

use uuid::Uuid;

use crate::model::Task;

/// A dependency that sits at or after its dependent in a proposed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderViolation {
    pub task_id: Uuid,
    pub missing_dependency_id: Uuid,
}

/// Outcome of checking a proposed order against the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderValidation {
    pub is_valid: bool,
    pub violations: Vec<OrderViolation>,
}

impl OrderValidation {
    /// A malformed proposal (wrong length, duplicates, unknown ids) fails
    /// closed with nothing to itemize.
    fn malformed() -> Self {
        Self {
            is_valid: false,
            violations: Vec::new(),
        }
    }
}

/// Check whether a proposed id order is dependency-consistent: every
/// dependency of every task must appear at a strictly earlier position.
///
/// This is a topological-consistency check over a fixed sequence, not a
/// cycle check (cycles are rejected once at data entry by
/// [`crate::model::Schedule::new`]). It runs on every candidate drop
/// position during a drag, so it is read-only and never panics: a proposal
/// that omits or duplicates a task id is reported as invalid instead.
pub fn validate_order(tasks: &[Task], proposed_order: &[Uuid]) -> OrderValidation {
    if proposed_order.len() != tasks.len() {
        return OrderValidation::malformed();
    }

    let mut position: HashMap<Uuid, usize> = HashMap::with_capacity(proposed_order.len());
    for (i, id) in proposed_order.iter().enumerate() {
        if position.insert(*id, i).is_some() {
            return OrderValidation::malformed();
        }
    }

    let mut violations = Vec::new();
    for task in tasks {
        let Some(&task_pos) = position.get(&task.id) else {
            // A task missing from the proposal means some other id was
            // smuggled in; equal lengths plus a missing entry is malformed.
            return OrderValidation::malformed();
        };
        for dep in &task.dependencies {
            match position.get(dep) {
                Some(&dep_pos) if dep_pos < task_pos => {}
                _ => violations.push(OrderViolation {
                    task_id: task.id,
                    missing_dependency_id: *dep,
                }),
            }
        }
    }

    OrderValidation {
        is_valid: violations.is_empty(),
        violations,
    }
}
