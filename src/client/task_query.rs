use std::cmp::Ordering;

use crate::{
    task::{Task, DEFAULT_CATEGORY},
    task_priority::TaskPriority,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Priority(TaskPriority),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Title,
    Priority,
    DueDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Newest first, everything shown, by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: StatusFilter,
    /// `None` shows every category.
    pub category: Option<String>,
    pub search: String,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle);

        let matches_category = match &self.category {
            None => true,
            Some(category) => category_of(task) == category,
        };

        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::Priority(priority) => task.priority == priority,
        };

        matches_search && matches_category && matches_status
    }

    /// Filtered and sorted view. The sort is stable; tasks without a due date
    /// go last under `DueDate` in either order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut view: Vec<&Task> = tasks.iter().filter(|t| self.matches(t)).collect();
        view.sort_by(|a, b| self.compare(a, b));
        view
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        if self.sort == SortKey::DueDate {
            return match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
        }

        let ordering = match self.sort {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortKey::DueDate => Ordering::Equal,
        };
        self.directed(ordering)
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn category_of(task: &Task) -> &str {
    if task.category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        &task.category
    }
}
