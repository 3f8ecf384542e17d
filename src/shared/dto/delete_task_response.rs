use serde::{Deserialize, Serialize};

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub message: String,
    /// Last state before removal.
    pub task: Task,
}

impl DeleteTaskResponse {
    pub fn new(task: Task) -> Self {
        Self {
            message: "Task deleted successfully".to_string(),
            task,
        }
    }
}
