use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Execution status of a task. Informational: scheduling never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Planned,
    InProgress,
    Completed,
}

/// A single schedulable unit of construction work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    /// Optional trade/category name for grouping ("Foundation", "Electrical", ...).
    pub category: Option<String>,
    pub status: TaskStatus,
    /// Working length in elapsed business-day units. Must be positive.
    pub duration_days: i64,
    /// Assigned by recalculation; not authoritative once dependencies exist.
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Monetary cost. Independent of the task's position in the sequence.
    pub cost: f64,
    /// Ids of tasks that must finish before this one starts.
    pub dependencies: Vec<Uuid>,
    pub assignee: Option<String>,
}

impl Task {
    /// Create a new task with sensible defaults. Dates are placeholders
    /// until the first recalculation pass assigns them.
    pub fn new(name: impl Into<String>, duration_days: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: None,
            status: TaskStatus::Planned,
            duration_days,
            start: NaiveDate::default(),
            end: NaiveDate::default(),
            cost: 0.0,
            dependencies: Vec::new(),
            assignee: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Add a single dependency on another task.
    pub fn with_dependency(mut self, id: Uuid) -> Self {
        self.dependencies.push(id);
        self
    }

    pub fn with_dependencies(mut self, ids: Vec<Uuid>) -> Self {
        self.dependencies = ids;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Whether this task directly depends on the given task id.
    pub fn depends_on(&self, id: Uuid) -> bool {
        self.dependencies.contains(&id)
    }
}
