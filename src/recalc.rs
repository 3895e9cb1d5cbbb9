use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{ScheduleSummary, Task};

/// Maps elapsed business-day durations onto calendar dates.
///
/// The shipped [`ElapsedDays`] treats durations as raw elapsed units; a host
/// that needs weekend or holiday awareness supplies its own implementation.
pub trait Calendar {
    fn advance(&self, from: NaiveDate, duration_days: i64) -> NaiveDate;
}

/// Default calendar: one duration unit is one elapsed day.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedDays;

impl Calendar for ElapsedDays {
    fn advance(&self, from: NaiveDate, duration_days: i64) -> NaiveDate {
        from + Duration::days(duration_days)
    }
}

/// Result of a recalculation pass: a freshly dated snapshot plus derived
/// totals. The input sequence is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculated {
    pub tasks: Vec<Task>,
    pub summary: ScheduleSummary,
    pub warnings: Vec<String>,
}

/// Recalculate with the default elapsed-day calendar.
pub fn recalculate(tasks: &[Task], project_start: NaiveDate) -> Recalculated {
    recalculate_with_calendar(tasks, project_start, &ElapsedDays)
}

/// Recalculate anchored at the current local date, for callers without an
/// explicit project-start reference.
pub fn recalculate_today(tasks: &[Task]) -> Recalculated {
    recalculate(tasks, Local::now().date_naive())
}

/// Forward-pass scheduling over the dependency DAG, honoring the given
/// sequence order.
///
/// Each task starts at the latest end date among its already-dated
/// dependencies, or at `project_start` if it has none. A dependency that is
/// not dated yet when its dependent comes up (the sequence was force-applied
/// past a failed validation, or the id is missing from the collection) is
/// treated as satisfied at project start, and one warning per affected task
/// names the task and its unmet dependencies. Output is deterministic: same
/// tasks, same order, same `project_start`, same result.
pub fn recalculate_with_calendar(
    tasks: &[Task],
    project_start: NaiveDate,
    calendar: &dyn Calendar,
) -> Recalculated {
    let mut dated: Vec<Task> = Vec::with_capacity(tasks.len());
    let mut end_by_id: HashMap<Uuid, NaiveDate> = HashMap::with_capacity(tasks.len());
    let mut warnings = Vec::new();

    for task in tasks {
        let mut start = project_start;
        let mut unmet: Vec<Uuid> = Vec::new();
        for dep in &task.dependencies {
            match end_by_id.get(dep) {
                Some(end) => start = start.max(*end),
                None => unmet.push(*dep),
            }
        }
        if !unmet.is_empty() {
            warnings.push(unmet_warning(task, &unmet, tasks));
            warn!(
                task = %task.name,
                unmet = unmet.len(),
                "task scheduled before its dependencies; treating them as satisfied at project start"
            );
        }

        let end = calendar.advance(start, task.duration_days);
        let mut updated = task.clone();
        updated.start = start;
        updated.end = end;
        end_by_id.insert(updated.id, end);
        dated.push(updated);
    }

    let critical_path = critical_path_of(&dated);
    let finish = dated.iter().map(|t| t.end).max().unwrap_or(project_start);
    let summary = ScheduleSummary {
        total_duration_days: (finish - project_start).num_days(),
        total_cost: dated.iter().map(|t| t.cost).sum(),
        critical_path,
    };

    debug!(
        tasks = dated.len(),
        total_duration_days = summary.total_duration_days,
        warnings = warnings.len(),
        "schedule recalculated"
    );

    Recalculated {
        tasks: dated,
        summary,
        warnings,
    }
}

fn unmet_warning(task: &Task, unmet: &[Uuid], tasks: &[Task]) -> String {
    let names: Vec<String> = unmet
        .iter()
        .map(|id| {
            tasks
                .iter()
                .find(|t| t.id == *id)
                .map(|t| format!("'{}'", t.name))
                .unwrap_or_else(|| id.to_string())
        })
        .collect();
    let noun = if names.len() == 1 {
        "dependency"
    } else {
        "dependencies"
    };
    format!(
        "task '{}' is scheduled before its {} {} completes; treated as satisfied at project start",
        task.name,
        noun,
        names.join(", ")
    )
}

/// Longest dependency chain by duration through the dated sequence.
///
/// With earliest-start dating, a task's end date already equals the longest
/// chain finish through it, so the chain is recovered by starting from the
/// latest-ending task and walking back through the binding dependency (the
/// one whose end equals the dependent's start). Ties go to the task with the
/// lower sequence index, at both steps.
fn critical_path_of(dated: &[Task]) -> Vec<Uuid> {
    if dated.is_empty() {
        return Vec::new();
    }
    let index_of: HashMap<Uuid, usize> = dated
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id, i))
        .collect();

    let mut current = 0usize;
    for (i, task) in dated.iter().enumerate() {
        if task.end > dated[current].end {
            current = i;
        }
    }

    let mut path = vec![dated[current].id];
    loop {
        let task = &dated[current];
        let mut binding: Option<usize> = None;
        for dep in &task.dependencies {
            let Some(&dep_idx) = index_of.get(dep) else {
                continue;
            };
            // A dependency later in the sequence never constrained this task.
            if dep_idx >= current || dated[dep_idx].end != task.start {
                continue;
            }
            binding = Some(match binding {
                Some(best) => best.min(dep_idx),
                None => dep_idx,
            });
        }
        match binding {
            Some(dep_idx) => {
                path.push(dated[dep_idx].id);
                current = dep_idx;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
