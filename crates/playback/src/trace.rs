//! Trace Reader - recorded CSV traces
//!
//! The header row is skipped, fields keep their original text, and every
//! restart re-opens the file so edits become visible at the loop boundary.

use std::fs::File;
use std::path::{Path, PathBuf};

use contracts::{ContractError, Field, Sample, StreamKind};
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use tracing::{debug, info};

/// Resolve `<data_root>/<run>/<kind file>`
pub fn trace_path(data_root: &Path, run: &str, kind: StreamKind) -> PathBuf {
    data_root.join(run).join(kind.trace_file_name())
}

/// Entry point for opening traces
pub struct TraceReader;

impl TraceReader {
    /// Open and validate a trace
    ///
    /// Every data row is checked once against `kind`; the file handle is
    /// released before this returns.
    ///
    /// # Errors
    /// - `NotFound` if `path` is not an existing file
    /// - `Format` if the header is missing, a row is malformed, or there are no data rows
    pub fn open(path: impl AsRef<Path>, kind: StreamKind) -> Result<Trace, ContractError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ContractError::not_found(path));
        }

        let mut trace = Trace {
            path: path.to_path_buf(),
            origin: path.display().to_string(),
            kind,
            rows: 0,
        };

        let mut rows = 0usize;
        for row in trace.restart()? {
            row?;
            rows += 1;
        }
        if rows == 0 {
            return Err(ContractError::format(&trace.origin, "trace has no data rows"));
        }
        trace.rows = rows;

        info!(path = %trace.origin, kind = %kind, rows, "Loaded trace");
        Ok(trace)
    }
}

/// A validated trace on disk
#[derive(Debug, Clone)]
pub struct Trace {
    path: PathBuf,
    origin: String,
    kind: StreamKind,
    rows: usize,
}

impl Trace {
    /// Start reading from the first data row
    ///
    /// The returned iterator owns the file handle; dropping it closes the file.
    pub fn restart(&self) -> Result<TraceRows, ContractError> {
        let file = File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ContractError::not_found(&self.path)
            } else {
                ContractError::Io(e)
            }
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(Trim::None)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| ContractError::format_at(&self.origin, 1, e.to_string()))?;
        if headers.is_empty() {
            return Err(ContractError::format(&self.origin, "missing header row"));
        }

        debug!(path = %self.origin, "Trace restarted");

        Ok(TraceRows {
            records: reader.into_records(),
            kind: self.kind,
            origin: self.origin.clone(),
        })
    }

    /// Read one full pass into memory
    pub fn load(&self) -> Result<Vec<Sample>, ContractError> {
        self.restart()?.collect()
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream layout
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Data row count observed at open
    pub fn len_hint(&self) -> usize {
        self.rows
    }
}

/// One lazy pass over a trace
pub struct TraceRows {
    records: StringRecordsIntoIter<File>,
    kind: StreamKind,
    origin: String,
}

impl Iterator for TraceRows {
    type Item = Result<Sample, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                return Some(Err(ContractError::format_at(
                    &self.origin,
                    line,
                    e.to_string(),
                )));
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields: Vec<&str> = record.iter().collect();

        Some(
            self.kind
                .check(fields.as_slice())
                .map(|()| Sample::new(fields.into_iter().map(Field::from).collect()))
                .map_err(|message| ContractError::format_at(&self.origin, line, message)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_trace(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_two_rows_per_restart() {
        let file = write_trace("timestamp,x,y,z\n0.0,0.1,0.2,0.3\n0.01,0.4,0.5,0.6\n");
        let trace = TraceReader::open(file.path(), StreamKind::Haptic).unwrap();
        assert_eq!(trace.len_hint(), 2);

        let first = trace.load().unwrap();
        let second = trace.load().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first[0].encode(), "0.0,0.1,0.2,0.3");
        assert_eq!(first[1].encode(), "0.01,0.4,0.5,0.6");
    }

    #[test]
    fn test_missing_file() {
        let result = TraceReader::open("/nonexistent/run01/tactile.csv", StreamKind::Haptic);
        assert!(matches!(result, Err(ContractError::NotFound { .. })));
    }

    #[test]
    fn test_empty_file_missing_header() {
        let file = write_trace("");
        let result = TraceReader::open(file.path(), StreamKind::Video);
        assert!(matches!(result, Err(ContractError::Format { .. })));
    }

    #[test]
    fn test_header_only_has_no_rows() {
        let file = write_trace("timestamp,bitrate\n");
        let err = TraceReader::open(file.path(), StreamKind::Video).unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_wrong_arity_reports_line() {
        let file = write_trace("timestamp,bitrate\n0.0,4000\n0.033,4100,9\n");
        let err = TraceReader::open(file.path(), StreamKind::Video).unwrap_err();
        match err {
            ContractError::Format { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let file = write_trace("timestamp,bitrate\n0.0,fast\n");
        assert!(matches!(
            TraceReader::open(file.path(), StreamKind::Video),
            Err(ContractError::Format { .. })
        ));
    }

    #[test]
    fn test_restart_sees_file_edits() {
        let file = write_trace("timestamp,bitrate\n0.0,4000\n");
        let trace = TraceReader::open(file.path(), StreamKind::Video).unwrap();

        std::fs::write(file.path(), "timestamp,bitrate\n0.0,5000\n0.1,5100\n").unwrap();
        let samples = trace.load().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].encode(), "0.0,5000");
    }

    #[test]
    fn test_quotes_are_plain_text() {
        // A quoted line break must not survive into a single field
        let file = write_trace("timestamp,label\n0.0,\"left\nright\"\n");
        let result = TraceReader::open(file.path(), StreamKind::Generic(2));
        assert!(matches!(result, Err(ContractError::Format { line: Some(3), .. })));

        let file = write_trace("timestamp,label\n0.0,\"left\"\n");
        let rows = TraceReader::open(file.path(), StreamKind::Generic(2))
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(rows[0].encode(), "0.0,\"left\"");
    }

    #[test]
    fn test_trace_path() {
        assert_eq!(
            trace_path(Path::new("/SimData"), "run01", StreamKind::Video),
            PathBuf::from("/SimData/run01/video.csv")
        );
    }
}
