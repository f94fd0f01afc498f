pub mod db;
pub mod social;
