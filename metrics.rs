// Per-operation metrics for MemDb
// The buffer has its own lock and is never taken while the tree lock is held

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricItem {
    pub operation: &'static str,
    pub key: Option<String>,
    pub elapsed: Duration,
    pub processed_items: usize,
    pub comment: String,
}

#[derive(Debug, Default)]
pub struct MetricsRecorder {
    enabled: AtomicBool,
    items: Mutex<Vec<MetricItem>>,
}

/// Running measurement for one call. Inert when metrics were off at start.
#[derive(Debug)]
pub struct Timer {
    started: Option<Instant>,
}

impl MetricsRecorder {
    pub fn new(enabled: bool) -> Self {
        MetricsRecorder {
            enabled: AtomicBool::new(enabled),
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn start(&self) -> Timer {
        Timer {
            started: self.is_enabled().then(Instant::now),
        }
    }

    pub fn finish(
        &self,
        timer: Timer,
        operation: &'static str,
        key: Option<&str>,
        processed_items: usize,
        comment: impl Into<String>,
    ) {
        let Some(started) = timer.started else { return };
        let item = MetricItem {
            operation,
            key: key.map(str::to_string),
            elapsed: started.elapsed(),
            processed_items,
            comment: comment.into(),
        };
        self.items.lock().push(item);
    }

    /// Take everything buffered so far, leaving the buffer empty.
    pub fn drain(&self) -> Vec<MetricItem> {
        std::mem::take(&mut *self.items.lock())
    }
}

/// Status comment for operations parameterised by a replace flag.
pub fn replace_comment(ok: bool, replace: bool) -> String {
    let status = if ok { "Done" } else { "Failed" };
    format!("{}/Replace={}", status, replace)
}
