use std::sync::Arc;

use crate::{data_context::DataContext, settings::Settings, task_service::TaskService};

pub struct AppState {
    pub data_context: DataContext,
    pub tasks: TaskService,
    pub settings: Settings,
}

impl AppState {
    pub fn new(data_context: DataContext, settings: Settings) -> Self {
        let tasks = TaskService::new(data_context.clone(), settings.conceal_foreign_tasks);
        AppState {
            data_context,
            tasks,
            settings,
        }
    }
}

pub type SharedState = Arc<AppState>;
