//! Terminal front end for the plantation record service.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod effects;
pub mod logging;
pub mod render;
pub mod session;
