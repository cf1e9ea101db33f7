//! Entry point for the log dispatcher

use tracing::warn;

use crate::engine::RotationEngine;

/// Receives formatted entries from a dispatcher that serializes producers.
///
/// `save` never fails: a sink must not stall the producing side, so
/// errors are reported through `tracing` instead.
pub trait LogSink: Send {
    fn save(&mut self, entry: String);
}

impl LogSink for RotationEngine {
    fn save(&mut self, entry: String) {
        if let Err(e) = self.write(&entry) {
            warn!(path = %self.current_path().display(), error = %e, "dropped log entry");
        }
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn save(&mut self, entry: String) {
        (**self).save(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_engine_as_boxed_sink() {
        let dir = TempDir::new().unwrap();
        let engine = RotationEngine::new("app", dir.path()).unwrap();
        let mut sink: Box<dyn LogSink> = Box::new(engine);

        sink.save("from dispatcher\n".to_string());
        drop(sink);

        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.ends_with("from dispatcher\n"));
    }

    #[test]
    fn test_sink_can_move_to_worker_thread() {
        let dir = TempDir::new().unwrap();
        let mut engine = RotationEngine::new("app", dir.path()).unwrap();
        engine.set_max_log_size(200);

        let handle = std::thread::spawn(move || {
            for i in 0..20 {
                engine.save(format!("entry {:02}\n", i));
            }
            engine
        });
        let engine = handle.join().unwrap();

        assert!(!crate::archive::list_archives(dir.path(), "app").unwrap().is_empty());
        assert!(fs::read_to_string(engine.current_path())
            .unwrap()
            .ends_with("entry 19\n"));
    }
}
