use chrono::{DateTime, Utc};

use crate::{
    task::{Task, DEFAULT_CATEGORY},
    task_priority::TaskPriority,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority: usize,
    /// Incomplete tasks whose due date is before `now`.
    pub overdue: usize,
    /// Rounded percentage, 0 for an empty list.
    pub completion_rate: u8,
    /// Count per category, in order of first appearance.
    pub categories: Vec<(String, usize)>,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();

        let mut categories: Vec<(String, usize)> = Vec::new();
        for task in tasks {
            let name = if task.category.is_empty() {
                DEFAULT_CATEGORY
            } else {
                task.category.as_str()
            };
            match categories.iter_mut().find(|(c, _)| c == name) {
                Some((_, count)) => *count += 1,
                None => categories.push((name.to_string(), 1)),
            }
        }

        TaskStats {
            total,
            completed,
            pending: total - completed,
            high_priority: tasks.iter().filter(|t| t.priority == TaskPriority::High).count(),
            overdue: tasks
                .iter()
                .filter(|t| !t.completed && t.due_date.is_some_and(|due| due < now))
                .count(),
            completion_rate: completion_rate(completed, total),
            categories,
        }
    }
}

fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// The first `n` tasks as listed, for the dashboard's recent panel.
pub fn recent(tasks: &[Task], n: usize) -> &[Task] {
    &tasks[..tasks.len().min(n)]
}
