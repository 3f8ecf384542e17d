use chrono::{Days, NaiveDate};

use crate::task::Task;

#[derive(Debug, Default, PartialEq)]
pub struct DueDateNotices<'a> {
    pub overdue: Vec<&'a Task>,
    pub due_today: Vec<&'a Task>,
    pub due_tomorrow: Vec<&'a Task>,
}

impl<'a> DueDateNotices<'a> {
    /// Due dates are compared by their UTC calendar day.
    pub fn collect(tasks: &'a [Task], today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1));
        let mut notices = DueDateNotices::default();

        for task in tasks.iter().filter(|t| !t.completed) {
            let Some(due) = task.due_date.map(|d| d.date_naive()) else {
                continue;
            };
            if due < today {
                notices.overdue.push(task);
            } else if due == today {
                notices.due_today.push(task);
            } else if Some(due) == tomorrow {
                notices.due_tomorrow.push(task);
            }
        }
        notices
    }

    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.due_today.is_empty() && self.due_tomorrow.is_empty()
    }

    /// One line per non-empty group, most urgent first.
    pub fn messages(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.overdue.is_empty() {
            lines.push(format!("You have {} overdue {}!", self.overdue.len(), plural(self.overdue.len())));
        }
        if !self.due_today.is_empty() {
            lines.push(format!("{} {} due today!", self.due_today.len(), plural(self.due_today.len())));
        }
        if !self.due_tomorrow.is_empty() {
            lines.push(format!("{} {} due tomorrow.", self.due_tomorrow.len(), plural(self.due_tomorrow.len())));
        }
        lines
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "task"
    } else {
        "tasks"
    }
}
