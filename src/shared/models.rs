pub mod app_state;
pub mod settings;
pub mod user;

// Tasks
pub mod task;
pub mod task_error;
pub mod task_priority;
