use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use serde::Serialize;

use crate::error::RunError;
use crate::models::RewriteModel;
use crate::pipeline::chunker::chunk;
use crate::pipeline::postprocess::normalize;
use crate::progress::{ProgressEvent, ProgressSender};
use crate::settings::{Settings, CHUNK_TOKEN_BUDGET, NUM_VERSIONS, TASK_PREFIX};
use crate::tokenizer::TokenCounter;

/// All candidates recorded for one chunk: the original text plus, per pass,
/// the 4 post-processed candidate strings.
#[derive(Clone, Debug, Serialize)]
pub struct ChunkTrace {
    pub original: String,
    pub outputs: Vec<Vec<String>>,
}

/// Everything one humanization run produced. Constructed fresh per run and
/// handed back to the caller; never shared between runs.
#[derive(Clone, Debug, Default)]
pub struct RunState {
    pub intermediate: Vec<ChunkTrace>,
    pub final_versions: Option<[String; NUM_VERSIONS]>,
    pub completed_units: usize,
    pub total_units: usize,
}

/// A run that aborted mid-flight. Intermediate data recorded up to the
/// failure point stays available for inspection.
#[derive(Debug)]
pub struct RunFailure {
    pub state: RunState,
    pub error: RunError,
}

/// Executes the full chunk × pass schedule sequentially. Pass k+1 of a chunk
/// consumes pass k's candidate[0] verbatim, so there is no intra-run
/// parallelism to exploit. The caller is expected to run this on a dedicated
/// worker thread (see [`spawn_run`]).
pub fn run(
    text: &str,
    settings: &Settings,
    model: &mut dyn RewriteModel,
    counter: &dyn TokenCounter,
    progress: &ProgressSender,
) -> Result<RunState, RunFailure> {
    let chunks = match chunk(text, counter, CHUNK_TOKEN_BUDGET) {
        Ok(v) => v,
        Err(e) => {
            return Err(RunFailure {
                state: RunState::default(),
                error: RunError::Generation(e.to_string()),
            })
        }
    };

    let passes = settings.effective_passes();
    let params = settings.gen_params();
    let total = chunks.len() * passes;

    let mut state = RunState {
        total_units: total,
        ..RunState::default()
    };
    let plural = if passes == 1 { "" } else { "es" };
    progress.report(0, total, format!("Processing with {passes} pass{plural}..."));

    let mut streams: [Vec<String>; NUM_VERSIONS] = Default::default();

    for chunk_text in &chunks {
        let mut trace = ChunkTrace {
            original: chunk_text.clone(),
            outputs: Vec::new(),
        };
        let mut working = chunk_text.clone();
        let mut final_candidates: Vec<String> = Vec::new();

        for pass in 0..passes {
            let prompt = format!("{TASK_PREFIX}{working}");
            let candidates = match model.generate(&prompt, &params) {
                Ok(v) => v,
                Err(e) => {
                    if settings.save_intermediate && !trace.outputs.is_empty() {
                        state.intermediate.push(trace);
                    }
                    return Err(RunFailure {
                        state,
                        error: RunError::Generation(e.to_string()),
                    });
                }
            };
            if candidates.len() != NUM_VERSIONS {
                if settings.save_intermediate && !trace.outputs.is_empty() {
                    state.intermediate.push(trace);
                }
                return Err(RunFailure {
                    state,
                    error: RunError::Generation(format!(
                        "model returned {} candidates, expected {NUM_VERSIONS}",
                        candidates.len()
                    )),
                });
            }

            let processed: Vec<String> = candidates
                .iter()
                .map(|c| normalize(c, settings.remove_dashes))
                .collect();

            if settings.save_intermediate {
                trace.outputs.push(processed.clone());
            }
            if pass + 1 < passes {
                working = processed[0].clone();
            }
            final_candidates = processed;

            state.completed_units += 1;
            progress.report(
                state.completed_units,
                total,
                format!("Processing chunk {}/{total}", state.completed_units),
            );
        }

        if settings.save_intermediate {
            state.intermediate.push(trace);
        }
        for (stream, candidate) in streams.iter_mut().zip(final_candidates) {
            stream.push(candidate);
        }
    }

    state.final_versions = Some(streams.map(|parts| parts.join(" ")));
    progress.report(total, total, "Complete!");
    Ok(state)
}

/// Handle to a run executing on its own worker thread. Progress events arrive
/// on `events`; the sender is dropped when the worker finishes, so draining
/// the receiver to disconnect observes the end of the run.
#[derive(Debug)]
pub struct RunHandle {
    pub events: Receiver<ProgressEvent>,
    handle: JoinHandle<Result<RunState, RunFailure>>,
}

impl RunHandle {
    pub fn join(self) -> Result<RunState, RunFailure> {
        match self.handle.join() {
            Ok(r) => r,
            Err(_) => Err(RunFailure {
                state: RunState::default(),
                error: RunError::Generation("worker thread panicked".to_string()),
            }),
        }
    }
}

/// Launches exactly one worker thread for the run. Empty input is rejected
/// here, before any thread starts.
pub fn spawn_run(
    text: String,
    settings: Settings,
    mut model: Box<dyn RewriteModel + Send>,
    counter: Box<dyn TokenCounter + Send>,
) -> Result<RunHandle, RunError> {
    if text.trim().is_empty() {
        return Err(RunError::EmptyInput);
    }
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = thread::spawn(move || {
        let progress = ProgressSender::new(tx);
        run(&text, &settings, model.as_mut(), counter.as_ref(), &progress)
    });
    Ok(RunHandle {
        events: rx,
        handle,
    })
}
