// Requests
pub mod task_fields;
pub mod login_request;
pub mod register_request;
pub mod user_edit_request;


// Responses
pub mod delete_task_response;
pub mod login_status_response;
pub mod message_response;
pub mod user_get_response;
