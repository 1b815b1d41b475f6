//! Page controllers, forms and backend client for the internship application portal.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod forms;
pub mod navigation;
pub mod session;
pub mod telemetry;
pub mod view;
