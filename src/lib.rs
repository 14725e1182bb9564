pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod settings;
pub mod textutil;
pub mod tokenizer;

pub use error::RunError;
pub use pipeline::{RunFailure, RunState};
pub use settings::{GenParams, Settings, Strength};
