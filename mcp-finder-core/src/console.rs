//! Operator console: the panel's scrollback log.
//!
//! Entries are colour-coded by severity and mirrored to `tracing`. A logged
//! line can be rewritten in place, which is how the locator's
//! "Servers checked: N" counter is kept on a single line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Success,
    Warning,
    Info,
    Greyed,
}

impl Severity {
    pub fn color(self) -> &'static str {
        match self {
            Self::Error => "#ff0000",
            Self::Success => "#00d107",
            Self::Warning => "#ffa600",
            Self::Info => "#0fafff",
            Self::Greyed => "#7d7d7d",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleEntry {
    pub id: u64,
    pub severity: Severity,
    pub color: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

struct Inner {
    entries: VecDeque<ConsoleEntry>,
    next_id: u64,
}

pub struct Console {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Console {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                next_id: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Append a line and return its id. Oldest lines fall off past capacity.
    pub fn log(&self, severity: Severity, message: impl Into<String>) -> u64 {
        let message = message.into();
        trace(severity, &message);

        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push_back(ConsoleEntry {
            id,
            severity,
            color: severity.color(),
            message,
            at: Utc::now(),
        });
        while inner.entries.len() > self.capacity {
            inner.entries.pop_front();
        }
        id
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Error, message)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Info, message)
    }

    pub fn greyed(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Greyed, message)
    }

    /// Rewrite line `id`. Returns false if it already scrolled off.
    pub fn update(&self, id: u64, message: impl Into<String>) -> bool {
        let mut inner = self.lock();
        match inner.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.message = message.into();
                entry.at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
        self.greyed("Console has been cleared.");
    }

    /// The newest `limit` entries (all if `None`), oldest first.
    pub fn entries(&self, limit: Option<usize>) -> Vec<ConsoleEntry> {
        let inner = self.lock();
        let skip = limit
            .map(|n| inner.entries.len().saturating_sub(n))
            .unwrap_or(0);
        inner.entries.iter().skip(skip).cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // entries stay consistent across a poisoning panic
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn trace(severity: Severity, message: &str) {
    match severity {
        Severity::Error => tracing::error!(target: "finder::console", "{}", message),
        Severity::Warning => tracing::warn!(target: "finder::console", "{}", message),
        Severity::Success | Severity::Info => {
            tracing::info!(target: "finder::console", "{}", message)
        }
        Severity::Greyed => tracing::debug!(target: "finder::console", "{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_read() {
        let console = Console::default();
        console.success("Modules loaded!");
        console.error("Invalid ID.");

        let entries = console.entries(None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].color, "#00d107");
        assert_eq!(entries[1].severity, Severity::Error);
        assert_eq!(entries[1].message, "Invalid ID.");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let console = Console::new(3);
        for i in 0..5 {
            console.info(format!("line {}", i));
        }
        let messages: Vec<_> = console.entries(None).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_update_in_place() {
        let console = Console::default();
        let id = console.info("Servers checked: 0");
        console.info("other");
        assert!(console.update(id, "Servers checked: 10"));

        let entries = console.entries(None);
        assert_eq!(entries[0].message, "Servers checked: 10");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_update_scrolled_off() {
        let console = Console::new(1);
        let id = console.info("first");
        console.info("second");
        assert!(!console.update(id, "gone"));
    }

    #[test]
    fn test_clear_leaves_notice() {
        let console = Console::default();
        console.info("a");
        console.info("b");
        console.clear();

        let entries = console.entries(None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Greyed);
        assert_eq!(entries[0].message, "Console has been cleared.");
    }

    #[test]
    fn test_entries_limit() {
        let console = Console::default();
        for i in 0..4 {
            console.info(format!("{}", i));
        }
        let tail: Vec<_> = console.entries(Some(2)).into_iter().map(|e| e.message).collect();
        assert_eq!(tail, vec!["2", "3"]);
    }
}
