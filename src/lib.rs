pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod feeds;
pub mod terminal;
pub mod ui;
