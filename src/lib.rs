//! mapledash — usage dashboard for MapleAI API keys.
//!
//! The [`session::Session`] polls the remote service and renders into a
//! [`dashboard::DashboardView`]; the web server, the terminal `watch` view
//! and the one-shot CLI commands are surfaces over that view.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod session;
pub mod token;
pub mod web;
