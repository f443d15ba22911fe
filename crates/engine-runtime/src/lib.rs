pub mod app;
pub mod error;
pub mod log;
pub mod process;
pub mod runner;
