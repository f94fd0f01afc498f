pub mod facebook;
pub mod graph_api;
pub mod instagram;
