pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod router;
pub mod service;

pub use error::HomeCtrlError;
pub use router::{HomeCtrlState, home_ctrl_router};
