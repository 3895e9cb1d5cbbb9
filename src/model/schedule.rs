use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::task::Task;

/// Structural defects that make a task collection unusable.
///
/// These are hard failures: a collection that trips any of them is rejected
/// wholesale at data entry, before any reordering or recalculation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("duplicate task id {0}")]
    DuplicateId(Uuid),
    #[error("task '{task}' depends on unknown task {dependency}")]
    UnknownDependency { task: String, dependency: Uuid },
    #[error("task '{0}' depends on itself")]
    SelfDependency(String),
    #[error("dependency cycle involving task '{0}'")]
    Cycle(String),
}

/// An ordered task sequence that has passed structural validation.
///
/// Position in the sequence expresses the user's intended execution order,
/// subordinate to dependency constraints. Reorders produce a new `Schedule`
/// rather than mutating in place, so consumers always hold a consistent
/// snapshot.
///
/// Hosts deserialize a `Vec<Task>` and go through [`Schedule::new`]; there is
/// deliberately no `Deserialize` impl that could sidestep validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    tasks: Vec<Task>,
}

impl Schedule {
    /// Accept a task collection into the core.
    ///
    /// Checks, in order: unique ids, no self-dependencies, all dependency
    /// references known, and an acyclic dependency graph. Cycle detection
    /// happens here, once, on the graph itself; per-frame order validation
    /// (see [`crate::validate::validate_order`]) is a separate, weaker check.
    pub fn new(tasks: Vec<Task>) -> Result<Self, ScheduleError> {
        let mut ids = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !ids.insert(task.id) {
                return Err(ScheduleError::DuplicateId(task.id));
            }
        }

        for task in &tasks {
            for dep in &task.dependencies {
                if *dep == task.id {
                    return Err(ScheduleError::SelfDependency(task.name.clone()));
                }
                if !ids.contains(dep) {
                    return Err(ScheduleError::UnknownDependency {
                        task: task.name.clone(),
                        dependency: *dep,
                    });
                }
            }
        }

        // Edge direction: dependency -> dependent. A topological sort fails
        // exactly when the dependency relation has a cycle.
        let mut graph: DiGraphMap<Uuid, ()> = DiGraphMap::new();
        for task in &tasks {
            graph.add_node(task.id);
        }
        for task in &tasks {
            for dep in &task.dependencies {
                graph.add_edge(*dep, task.id, ());
            }
        }
        match toposort(&graph, None) {
            Ok(_order) => Ok(Self { tasks }),
            Err(cycle) => {
                let id = cycle.node_id();
                let name = tasks
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| id.to_string());
                Err(ScheduleError::Cycle(name))
            }
        }
    }

    /// Wrap tasks that are already known to be structurally sound
    /// (a reorder or re-dating of a validated schedule).
    pub(crate) fn from_validated(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// The current sequence as a list of task ids.
    pub fn order(&self) -> Vec<Uuid> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// The hypothetical id order after moving the task at `from_index` to
    /// insertion slot `slot` (a position in `0..=len` over the pre-move
    /// sequence). Used to test a candidate drop without touching the tasks.
    pub fn moved_order(&self, from_index: usize, slot: usize) -> Vec<Uuid> {
        let mut order = self.order();
        if from_index >= order.len() {
            return order;
        }
        let id = order.remove(from_index);
        let insert_at = if slot > from_index { slot - 1 } else { slot };
        order.insert(insert_at.min(order.len()), id);
        order
    }

    /// Apply a move, returning the reordered schedule as a new snapshot.
    /// Slot semantics match [`Schedule::moved_order`].
    pub fn apply_move(&self, from_index: usize, slot: usize) -> Schedule {
        let mut tasks = self.tasks.clone();
        if from_index < tasks.len() {
            let task = tasks.remove(from_index);
            let insert_at = if slot > from_index { slot - 1 } else { slot };
            tasks.insert(insert_at.min(tasks.len()), task);
        }
        Schedule { tasks }
    }
}
