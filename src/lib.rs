pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod resolver;
pub mod routes;
pub mod sender;
pub mod state;
pub mod store;
