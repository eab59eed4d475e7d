pub mod handlers;
pub mod output_service;

pub use output_service::{OutputGraphService, PassOverviewEntry};
