pub mod axum_http;
pub mod config;
pub mod publishing;
pub mod usecases;
