//! Mini Shell panel.
//!
//! Drives the "Mini Shell" demo container embedded in the interactive CV
//! site: a lifecycle controller that creates, stops and deletes one sandboxed
//! container through the backend's container API and keeps a terminal pane
//! fed with the container's latest log lines.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logs;
pub mod testing;
