pub mod authentication_controller;
pub mod health_controller;
pub mod task_controller;
pub mod user_controller;
