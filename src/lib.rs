pub mod config;
pub mod errors;
pub mod form;
pub mod models;
pub mod storage;
pub mod tui;
