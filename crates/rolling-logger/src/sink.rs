//! In-memory ring of recent log lines, fed by the fmt layer.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

/// Fixed-size circular buffer of formatted log lines
pub(crate) struct RecentLines {
    lines: VecDeque<String>,
    capacity: usize,
}

impl RecentLines {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        if self.capacity == 0 {
            return;
        }
        for line in text.lines().filter(|l| !l.is_empty()) {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line.to_string());
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// Shared ring handed to the tracing fmt layer as a writer
#[derive(Clone)]
pub(crate) struct RingSink {
    inner: Arc<Mutex<RecentLines>>,
}

impl RingSink {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecentLines::new(capacity))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecentLines> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn recent_lines(&self) -> Vec<String> {
        self.lock().snapshot()
    }
}

/// Per-event writer; the fmt layer writes one formatted record per call
pub(crate) struct RingWriter {
    sink: RingSink,
}

impl Write for RingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.lock().push(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingSink {
    type Writer = RingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RingWriter { sink: self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_keeps_newest_lines() {
        let mut ring = RecentLines::new(2);
        ring.push("one\n");
        ring.push("two\nthree\n");
        assert_eq!(ring.snapshot(), vec!["two".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut ring = RecentLines::new(0);
        ring.push("dropped\n");
        assert!(ring.snapshot().is_empty());
    }

    #[test]
    fn test_writer_feeds_ring() {
        let sink = RingSink::new(8);
        let mut writer = sink.make_writer();
        writer.write_all(b"2024-01-01 INFO saved\n").unwrap();
        writer.flush().unwrap();
        assert_eq!(sink.recent_lines(), vec!["2024-01-01 INFO saved".to_string()]);
    }
}
