use std::io::{self, Write};
use std::time::Instant;

use crossbeam_channel::Sender;

/// One discrete progress notification from the worker thread. `completed` is
/// monotonically non-decreasing within a run; `completed == total` with the
/// terminal label is the last event of a successful run.
#[derive(Clone, Debug)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub label: String,
}

impl ProgressEvent {
    pub fn fraction(&self) -> f64 {
        if self.total > 0 {
            self.completed as f64 / self.total as f64
        } else {
            0.0
        }
    }
}

/// Fire-and-forget sender half of the worker-to-coordinator channel. A
/// disconnected receiver is not an error: the run keeps going and the events
/// are dropped.
#[derive(Clone)]
pub struct ProgressSender {
    tx: Option<Sender<ProgressEvent>>,
}

impl ProgressSender {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sender that discards every event, for callers without a listener.
    pub fn sink() -> Self {
        Self { tx: None }
    }

    pub fn report(&self, completed: usize, total: usize, label: impl Into<String>) {
        if let Some(tx) = self.tx.as_ref() {
            let _ = tx.send(ProgressEvent {
                completed,
                total,
                label: label.into(),
            });
        }
    }
}

pub struct ConsoleProgress {
    enabled: bool,
    t0: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            t0: Instant::now(),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.enabled {
            return;
        }
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{ts}] {}", msg.as_ref());
    }

    pub fn event(&self, ev: &ProgressEvent) {
        if !self.enabled {
            return;
        }
        let pct = ev.fraction() * 100.0;
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{ts}] {} {}/{} ({pct:5.1}%)",
            ev.label, ev.completed, ev.total
        );
    }
}

fn fmt_elapsed(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
