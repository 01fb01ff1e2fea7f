pub mod db;
pub mod error;
pub mod favorites;
pub mod listing;
pub mod models;
pub mod service;
