pub mod cli;
pub mod commands;
pub mod compose;
pub mod config;
pub mod kibana;
pub mod orchestrator;
pub mod process;
