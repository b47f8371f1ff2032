pub mod admission;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod queue;
