use chrono::Utc;
use uuid::Uuid;

use crate::{data_context::DataContext, task::Task, task_error::TaskError, task_fields::TaskFields};

/// Which operation is asking, so the refusal reads right.
#[derive(Debug, Clone, Copy)]
enum Access {
    View,
    Update,
    Delete,
}

impl Access {
    fn refusal(self) -> &'static str {
        match self {
            Access::View => "You are not authorized to view this task",
            Access::Update => "Unauthorized access",
            Access::Delete => "You are not authorized to delete this task",
        }
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: DataContext,
    conceal_foreign: bool,
}

impl TaskService {
    pub fn new(store: DataContext, conceal_foreign: bool) -> Self {
        TaskService { store, conceal_foreign }
    }

    pub fn create(&self, owner: Uuid, fields: TaskFields) -> Result<Task, TaskError> {
        let task = Task::create(owner, fields.normalize()?, Utc::now())?;
        self.store.insert_task(&task)?;
        tracing::debug!(task_id = %task.id, %owner, "task created");
        Ok(task)
    }

    pub fn list(&self, owner: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list_tasks_by_owner(owner)?)
    }

    pub fn get(&self, owner: Uuid, task_id: &str) -> Result<Task, TaskError> {
        let id = parse_id(task_id)?;
        let task = self.store.get_task(id)?.ok_or(TaskError::NotFound)?;
        self.authorize(&task, owner, Access::View)?;
        Ok(task)
    }

    /// Merge the present fields into the stored task and return what was written.
    /// Lookup, owner check and write share one store transaction.
    pub fn update(&self, owner: Uuid, task_id: &str, fields: TaskFields) -> Result<Task, TaskError> {
        let id = parse_id(task_id)?;
        let task = self
            .store
            .update_task(id, |task: &mut Task| -> Result<(), TaskError> {
                self.authorize(task, owner, Access::Update)?;
                task.apply(fields.normalize()?, Utc::now());
                Ok(())
            })?
            .ok_or(TaskError::NotFound)?;

        tracing::debug!(task_id = %task.id, %owner, "task updated");
        Ok(task)
    }

    /// Hard delete. Returns the task exactly as it was removed.
    pub fn delete(&self, owner: Uuid, task_id: &str) -> Result<Task, TaskError> {
        let id = parse_id(task_id)?;
        let task = self
            .store
            .delete_task(id, |task: &Task| -> Result<(), TaskError> {
                self.authorize(task, owner, Access::Delete)
            })?
            .ok_or(TaskError::NotFound)?;

        tracing::debug!(task_id = %task.id, %owner, "task deleted");
        Ok(task)
    }

    fn authorize(&self, task: &Task, owner: Uuid, access: Access) -> Result<(), TaskError> {
        if task.is_owned_by(owner) {
            return Ok(());
        }
        tracing::warn!(task_id = %task.id, requester = %owner, "foreign task access refused");
        Err(if self.conceal_foreign {
            TaskError::NotFound
        } else {
            TaskError::Forbidden(access.refusal())
        })
    }
}

/// A blank id is a bad request; anything else that is not a UUID names no task.
fn parse_id(task_id: &str) -> Result<Uuid, TaskError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(TaskError::Validation("Task id is required".to_string()));
    }
    Uuid::parse_str(task_id).map_err(|_| TaskError::NotFound)
}
