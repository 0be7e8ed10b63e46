pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod hosting;
pub mod model;
pub mod tickets;
pub mod tui;
pub mod vcs;
