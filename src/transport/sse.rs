use crate::error::ErrorKind;

/// Longest single line the decoder buffers before giving up
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Incremental decoder for a `text/event-stream` body
///
/// Feeds arbitrary byte chunks and yields the `data` payload of every
/// completed event. Only the `data` field is kept; comments and the
/// `event`, `id` and `retry` fields are ignored.
#[derive(Debug)]
pub struct SseDecoder {
    /// Bytes of the current, not yet terminated line
    pending: Vec<u8>,
    /// `data` lines collected for the event being built
    data_lines: Vec<String>,
    max_line: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            pending: Vec::new(),
            data_lines: Vec::new(),
            max_line,
        }
    }

    /// Consume a chunk and return every event it completed
    ///
    /// A line that grows past the limit without a newline is an error; the
    /// partial line and event are discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, ErrorKind> {
        let mut events = Vec::new();

        for &byte in chunk {
            if byte == b'\n' {
                let line = std::mem::take(&mut self.pending);
                if let Some(event) = self.process_line(&line) {
                    events.push(event);
                }
            } else if self.pending.len() >= self.max_line {
                self.pending.clear();
                self.data_lines.clear();
                return Err(ErrorKind::ParseFailure(format!(
                    "event stream line exceeds {} bytes",
                    self.max_line
                )));
            } else {
                self.pending.push(byte);
            }
        }

        Ok(events)
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<String> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);

        // Blank line terminates the event
        if line.is_empty() {
            if self.data_lines.is_empty() {
                return None;
            }
            let data = self.data_lines.join("\n");
            self.data_lines.clear();
            return Some(data);
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_ref(), ""),
        };

        if field == "data" {
            self.data_lines.push(value.to_string());
        }

        None
    }
}
