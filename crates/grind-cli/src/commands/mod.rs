pub mod common;
pub mod config;
pub mod run;
pub mod task;
pub mod timer;
