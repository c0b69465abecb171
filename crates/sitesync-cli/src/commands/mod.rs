pub mod common;
pub mod completions;
pub mod config;
pub mod detect;
pub mod plan;
pub mod resolve;
pub mod suggest;
