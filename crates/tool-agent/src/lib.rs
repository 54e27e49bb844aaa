//! tool-agent: a single-agent tool-use loop for local LLMs

pub mod agent;
pub mod config;
pub mod tools;
