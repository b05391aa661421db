//! Structured log capture for test assertions.
//!
//! Capture is scoped to a closure through `tracing::subscriber::with_default`,
//! so parallel tests never see each other's events.

use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// A captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Entries recorded while a capture was active.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CapturedLogs {
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    #[must_use]
    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(message))
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.entries.lock().iter().any(|e| e.level == Level::WARN)
    }

    #[must_use]
    pub fn filter_by_level(&self, level: Level) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Format for display on assertion failure.
    #[must_use]
    pub fn format_for_display(&self) -> String {
        let entries = self.entries.lock();
        if entries.is_empty() {
            return String::from("No logs captured");
        }
        let mut output = format!("Captured {} log entries:\n", entries.len());
        for entry in entries.iter() {
            let _ = writeln!(output, "[{}] {}: {}", entry.level, entry.target, entry.message);
            for (key, value) in &entry.fields {
                let _ = writeln!(output, "    {key} = {value}");
            }
        }
        output
    }
}

/// Layer that records every event into a [`CapturedLogs`].
pub struct TestLogLayer {
    logs: CapturedLogs,
}

impl<S> tracing_subscriber::Layer<S> for TestLogLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        struct Visitor<'a> {
            message: &'a mut String,
            fields: &'a mut Vec<(String, String)>,
        }

        impl tracing::field::Visit for Visitor<'_> {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    *self.message = value.to_string();
                } else {
                    self.fields.push((field.name().to_string(), value.to_string()));
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let value = format!("{value:?}");
                if field.name() == "message" {
                    *self.message = value;
                } else {
                    self.fields.push((field.name().to_string(), value));
                }
            }
        }

        let metadata = event.metadata();
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut Visitor {
            message: &mut message,
            fields: &mut fields,
        });
        self.logs.entries.lock().push(LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
            fields,
        });
    }
}

/// Run `f` with every event at `DEBUG` and above captured.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with(TestLogLayer { logs: logs.clone() });
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}

/// Assert that a captured entry with the given level and message exists.
#[macro_export]
macro_rules! assert_log_contains {
    ($logs:expr, $level:expr, $message:expr) => {{
        let logs = &$logs;
        assert!(
            logs.contains($level, $message),
            "Expected log with level {} containing '{}'\n{}",
            $level,
            $message,
            logs.format_for_display()
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::suggestions::{ChefSession, Rating};
    use crate::test_utils::fixtures::{BrokenStore, builtin_session};
    use std::sync::Arc;

    #[test]
    fn captures_fields_of_suggestion_events() {
        let (_, logs) = capture_logs(|| {
            let mut session = builtin_session();
            session.suggest_text("chicken, garlic").unwrap();
        });
        let entry = logs
            .entries()
            .into_iter()
            .find(|e| e.message == "suggestion made")
            .expect("suggestion event");
        assert_eq!(entry.level, Level::INFO);
        assert_eq!(entry.field("template_id"), Some("1"));
    }

    #[test]
    fn unreadable_store_falls_back_with_a_warning() {
        let recommender = Arc::clone(builtin_session().recommender());
        let ((session, err), logs) =
            capture_logs(|| ChefSession::load_or_default(recommender, 50, &BrokenStore));

        assert!(err.is_some_and(|e| e.is_recoverable()));
        assert_eq!(session.snapshot().interaction_count, 0);
        crate::assert_log_contains!(logs, Level::WARN, "could not load saved session");
    }

    #[test]
    fn failed_save_keeps_the_session_usable() {
        let (outcome, logs) = capture_logs(|| {
            let mut session = builtin_session();
            session.suggest_text("rice, eggs").unwrap();
            let save_error = session.persist(&BrokenStore);
            let rated = session.record_feedback(None, Rating::Liked);
            (save_error, rated)
        });
        assert!(outcome.0.is_some());
        assert!(outcome.1.is_ok());
        crate::assert_log_contains!(logs, Level::WARN, "could not save session");
    }

    #[test]
    fn healthy_store_logs_no_warnings() {
        let (_, logs) = capture_logs(|| {
            let store = MemoryStore::default();
            let mut session = builtin_session();
            session.suggest_text("beef, bread").unwrap();
            assert!(session.persist(&store).is_none());
        });
        assert!(!logs.has_warnings(), "{}", logs.format_for_display());
    }
}
