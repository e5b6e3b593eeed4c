//! CLI commands

pub mod export;
pub mod login;
pub mod pull;
pub mod recent;
pub mod stats;
pub mod utils;
pub mod values;
pub mod view;
