mod chunker;
mod postprocess;
mod runner;

pub use chunker::{chunk, split_sentences};
pub use postprocess::normalize;
pub use runner::{run, spawn_run, ChunkTrace, RunFailure, RunHandle, RunState};
