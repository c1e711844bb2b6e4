//! NDJSON trace export and import.
//!
//! One JSON object per step, in trace order, with an `index` field added.
//! Keys are written in sorted order:
//! ```json
//! {"action":"initialize","index":0,"input":"(]","position":0,"stack":"Z","state":"initial"}
//! {"action":"push","index":1,"input":"(]","position":0,"read":"(","stack":"Z(","state":"processing"}
//! {"action":"pop","index":2,"input":"(]","position":1,"previousTop":"(","read":"]","rejectReason":"mismatch","stack":"Z(","state":"reject"}
//! ```

use crate::error::{Error, ExportError};
use crate::replay::check_trace;
use crate::trace::{SimulationStep, Trace};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Writes simulation steps as NDJSON.
pub struct TraceEmitter<W: Write = std::io::BufWriter<std::fs::File>> {
    writer: W,
    count: usize,
}

impl TraceEmitter {
    /// Create a new emitter writing to the given file path.
    pub fn new(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::create(path).map_err(ExportError::Io)?;
        Ok(Self::from_writer(std::io::BufWriter::new(file)))
    }
}

impl<W: Write> TraceEmitter<W> {
    pub fn from_writer(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Emit one step. Its `index` is the number of steps emitted before it.
    pub fn emit(&mut self, step: &SimulationStep) -> Result<(), Error> {
        let mut obj = serde_json::to_value(step)?;
        if let Some(map) = obj.as_object_mut() {
            map.insert("index".to_string(), serde_json::Value::from(self.count));
        }

        serde_json::to_writer(&mut self.writer, &obj)?;
        self.writer.write_all(b"\n").map_err(ExportError::Io)?;

        self.count += 1;
        Ok(())
    }

    /// Emit every step of `trace`.
    pub fn emit_trace(&mut self, trace: &Trace) -> Result<(), Error> {
        for step in trace {
            self.emit(step)?;
        }
        debug!(input = trace.input(), steps = trace.len(), "Emitted trace");
        Ok(())
    }

    /// Flush buffered output and return the number of steps emitted.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.writer.flush().map_err(ExportError::Io)?;
        Ok(self.count)
    }

    /// Get the number of steps emitted so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Write `trace` to `path` as NDJSON, returning the number of lines.
pub fn write_ndjson(trace: &Trace, path: &Path) -> Result<usize, Error> {
    let mut emitter = TraceEmitter::new(path)?;
    emitter.emit_trace(trace)?;
    emitter.finish()
}

/// Load a trace from an NDJSON file and check its invariants.
pub fn read_ndjson(path: &Path) -> Result<Trace, Error> {
    if !path.is_file() {
        return Err(ExportError::TraceFileNotFound(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path).map_err(ExportError::Io)?;
    parse_lines(&content, &path.display().to_string())
}

/// Parse an NDJSON trace held in memory and check its invariants.
pub fn parse_ndjson(content: &str) -> Result<Trace, Error> {
    parse_lines(content, "<inline>")
}

fn parse_lines(content: &str, source: &str) -> Result<Trace, Error> {
    let mut steps = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let line_num = i + 1;

        let mut obj: serde_json::Value =
            serde_json::from_str(line).map_err(|e| ExportError::InvalidJson {
                line: line_num,
                reason: e.to_string(),
            })?;

        let map = obj.as_object_mut().ok_or_else(|| ExportError::InvalidRecord {
            line: line_num,
            reason: format!("expected a JSON object, got: {line}"),
        })?;

        if let Some(index) = map.remove("index") {
            let found = index.as_u64().ok_or_else(|| ExportError::InvalidRecord {
                line: line_num,
                reason: format!("'index' must be a non-negative integer, got: {index}"),
            })?;
            if found != steps.len() as u64 {
                return Err(ExportError::OutOfOrder {
                    line: line_num,
                    expected: steps.len(),
                    found: usize::try_from(found).unwrap_or(usize::MAX),
                }
                .into());
            }
        }

        let step: SimulationStep =
            serde_json::from_value(obj).map_err(|e| ExportError::InvalidRecord {
                line: line_num,
                reason: e.to_string(),
            })?;
        steps.push(step);
    }

    if steps.is_empty() {
        return Err(ExportError::EmptyTrace(source.to_string()).into());
    }

    let trace = Trace::from_steps(steps);
    check_trace(&trace)?;
    debug!(source, steps = trace.len(), "Loaded NDJSON trace");
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulate;

    #[test]
    fn emits_one_line_per_step() {
        let mut buf = Vec::new();
        let mut emitter = TraceEmitter::from_writer(&mut buf);
        emitter.emit_trace(&simulate("(]")).unwrap();
        assert_eq!(emitter.finish().unwrap(), 3);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let last: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(last["index"], 2);
        assert_eq!(last["state"], "reject");
        assert_eq!(last["rejectReason"], "mismatch");
        assert_eq!(last["previousTop"], "(");
        assert_eq!(last["stack"], "Z(");
    }

    #[test]
    fn index_is_optional_on_import() {
        let content = concat!(
            r#"{"state":"initial","action":"initialize","stack":"Z","input":"","position":0}"#,
            "\n",
            r#"{"state":"accept","action":"complete","stack":"Z","input":"","position":0}"#,
        );
        let trace = parse_ndjson(content).unwrap();
        assert!(trace.is_accepted());
    }
}
