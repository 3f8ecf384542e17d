
//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
    pub mod extract;
}

pub use web_api::routes::{self, map_routes};
pub use web_api::controllers::*;
pub use web_api::extract;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
}

pub use shared::models::*;
pub use shared::dto::*;
//---------------------------------------

//---------------------------------------
pub mod authentication {
    pub mod auth;
}
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod data_context;
}

pub use data_access::data_context;
//---------------------------------------

//---------------------------------------
pub mod services {
    pub mod task_service;
}

pub use services::task_service;
//---------------------------------------

//---------------------------------------
pub mod client {
    pub mod task_client;
    pub mod task_query;
    pub mod task_stats;
    pub mod due_date_notices;
}

pub use client::*;
//---------------------------------------
