//! Line sinks for assertion reports
//!
//! [`DebugLogger`] is the single capability the report formatter needs:
//! accept one line of text. It is fire-and-forget and must not fail.

use std::sync::{Arc, Mutex};
use unitsim_core_types::schema::{EVENT_REPORT, OP_REPORT};
use unitsim_core_types::SimId;

/// Accepts a rendered line and writes it somewhere
pub trait DebugLogger: Send + Sync {
    fn log(&self, line: &str);
}

/// Emits each line as an `info` event on the active tracing subscriber
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    sim_id: Option<SimId>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every emitted line with the owning engine instance
    pub fn with_sim_id(mut self, sim_id: SimId) -> Self {
        self.sim_id = Some(sim_id);
        self
    }
}

impl DebugLogger for TracingLogger {
    fn log(&self, line: &str) {
        match &self.sim_id {
            Some(sim_id) => tracing::info!(
                component = module_path!(),
                op = OP_REPORT,
                event = EVENT_REPORT,
                sim_id = sim_id.as_str(),
                line = line,
            ),
            None => tracing::info!(
                component = module_path!(),
                op = OP_REPORT,
                event = EVENT_REPORT,
                line = line,
            ),
        }
    }
}

/// Prints lines to stdout, where the test harness captures them per test
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl DebugLogger for ConsoleLogger {
    fn log(&self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps lines in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct BufferLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line logged so far, in order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// All lines joined with `\n`
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().map(|l| l.is_empty()).unwrap_or(true)
    }

    pub fn clear(&self) {
        self.lines.lock().map(|mut l| l.clear()).ok();
    }
}

impl DebugLogger for BufferLogger {
    fn log(&self, line: &str) {
        self.lines
            .lock()
            .map(|mut lines| lines.push(line.to_string()))
            .ok();
    }
}

impl<L: DebugLogger + ?Sized> DebugLogger for Arc<L> {
    fn log(&self, line: &str) {
        (**self).log(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_logger_keeps_order() {
        let logger = BufferLogger::new();
        logger.log("EXPECT: 1");
        logger.log("ACTUAL: 2");
        assert_eq!(logger.lines(), vec!["EXPECT: 1", "ACTUAL: 2"]);
        assert_eq!(logger.contents(), "EXPECT: 1\nACTUAL: 2");
    }

    #[test]
    fn test_buffer_logger_clones_share_lines() {
        let logger = BufferLogger::new();
        let handle = logger.clone();
        logger.log("FAILED sample");
        assert_eq!(handle.lines(), vec!["FAILED sample"]);
        handle.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_arc_logger_delegates() {
        let buffer = BufferLogger::new();
        let shared: Arc<dyn DebugLogger> = Arc::new(buffer.clone());
        shared.log("line");
        assert_eq!(buffer.lines(), vec!["line"]);
    }
}
