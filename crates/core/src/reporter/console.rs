//! Terminal reporter.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use thiserror::Error;
use tracing::debug;

use crate::dispatch::{LedgerSnapshot, Outcome, RunStart, RunSummary};

use super::traits::{Reporter, Verbosity};

const BAR_TEMPLATE: &str = "[{bar:30}] %{percent}";

/// Errors raised while setting up a reporter.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to open log file {path}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

type Sink = Mutex<Box<dyn Write + Send>>;

/// Prints progress to the terminal at a fixed verbosity.
///
/// Normal mode draws a progress bar on stdout; verbose mode prints one JSON
/// line per finished file instead. Final results go to stderr and totals to
/// stdout.
pub struct ConsoleReporter {
    verbosity: Verbosity,
    bar: ProgressBar,
    out: Sink,
    err: Sink,
    log: Option<Sink>,
}

impl ConsoleReporter {
    /// Reporter writing to the process stdout and stderr.
    pub fn new(verbosity: Verbosity) -> Self {
        let target = match verbosity {
            Verbosity::Normal => ProgressDrawTarget::stdout(),
            Verbosity::Silent | Verbosity::Verbose => ProgressDrawTarget::hidden(),
        };
        Self::build(
            verbosity,
            target,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Reporter writing to the given sinks, with the progress bar hidden.
    pub fn with_writers(
        verbosity: Verbosity,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self::build(verbosity, ProgressDrawTarget::hidden(), out, err)
    }

    /// Mirrors per-file lines and totals into a log file (verbose mode only).
    pub fn with_log_file(mut self, path: &Path) -> Result<Self, ReporterError> {
        if self.verbosity != Verbosity::Verbose {
            debug!("Ignoring log file {:?} outside verbose mode", path);
            return Ok(self);
        }
        let file = File::create(path).map_err(|source| ReporterError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
        self.log = Some(Mutex::new(Box::new(BufWriter::new(file))));
        Ok(self)
    }

    pub fn with_log_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.log = Some(Mutex::new(writer));
        self
    }

    fn build(
        verbosity: Verbosity,
        target: ProgressDrawTarget,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|s| s.progress_chars("= "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);

        Self {
            verbosity,
            bar,
            out: Mutex::new(out),
            err: Mutex::new(err),
            log: None,
        }
    }

    fn totals(summary: &RunSummary) -> String {
        let mut text = format!(
            "sent: {}\nfailed: {}\ntotal: {}\n",
            summary.succeeded, summary.failed, summary.total
        );
        if summary.cancelled {
            text.push_str(&format!("skipped: {}\n", summary.skipped));
        }
        text
    }
}

fn emit(sink: &Sink, text: &str) {
    let Ok(mut writer) = sink.lock() else {
        return;
    };
    if let Err(e) = writer.write_all(text.as_bytes()).and_then(|_| writer.flush()) {
        debug!("Failed to write report output: {}", e);
    }
}

impl Reporter for ConsoleReporter {
    fn on_start(&self, start: &RunStart) {
        match self.verbosity {
            Verbosity::Silent => {}
            Verbosity::Normal => {
                emit(&self.out, &format!("files to send: {}\n", start.total));
                self.bar.set_length(start.total as u64);
                self.bar.tick();
            }
            Verbosity::Verbose => {
                let mut text = format!("files to send: {}\n", start.total);
                for file in &start.files {
                    text.push_str(&format!("{}\n", file.display()));
                }
                emit(&self.out, &text);
            }
        }
    }

    fn on_progress(&self, outcome: &Outcome, snapshot: &LedgerSnapshot) {
        match self.verbosity {
            Verbosity::Silent => {}
            Verbosity::Normal => self.bar.set_position(snapshot.completed as u64),
            Verbosity::Verbose => {
                let line = outcome.to_report_line();
                emit(&self.out, &format!("[%{}] - {}\n", snapshot.percent, line));
                if let Some(log) = &self.log {
                    emit(log, &format!("{}\n", line));
                }
            }
        }
    }

    fn on_finish(&self, summary: &RunSummary) {
        let results: String = match self.verbosity {
            Verbosity::Silent => return,
            Verbosity::Normal => {
                self.bar.finish();
                emit(&self.out, "\n");
                summary
                    .failures()
                    .map(|o| format!("{}\n", o.to_report_line()))
                    .collect()
            }
            Verbosity::Verbose => summary
                .outcomes
                .iter()
                .map(|o| format!("{}\n", o.to_report_line()))
                .collect(),
        };

        if !results.is_empty() {
            emit(&self.err, &results);
        }

        let totals = Self::totals(summary);
        emit(&self.out, &totals);
        if let Some(log) = &self.log {
            emit(log, &totals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{UploadContext, WorkItem};
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Cloneable in-memory writer for inspecting output.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        reporter: ConsoleReporter,
        out: SharedBuffer,
        err: SharedBuffer,
    }

    fn harness(verbosity: Verbosity) -> Harness {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let reporter =
            ConsoleReporter::with_writers(verbosity, Box::new(out.clone()), Box::new(err.clone()));
        Harness { reporter, out, err }
    }

    fn outcomes() -> (Outcome, Outcome) {
        let context = Arc::new(UploadContext::new("s", None));
        let ok = WorkItem::new("/cv/ok.pdf", Arc::clone(&context));
        let bad = WorkItem::new("/cv/bad.pdf", context);
        (
            Outcome::success(&ok, 0, json!({"code": 200})),
            Outcome::failure(&bad, 1, "Invalid response"),
        )
    }

    fn start() -> RunStart {
        RunStart {
            run_id: Uuid::new_v4(),
            total: 2,
            workers: 2,
            files: vec![PathBuf::from("/cv/ok.pdf"), PathBuf::from("/cv/bad.pdf")],
        }
    }

    fn summary(ok: Outcome, bad: Outcome, cancelled: bool) -> RunSummary {
        RunSummary {
            run_id: Uuid::new_v4(),
            total: 2,
            succeeded: 1,
            failed: 1,
            skipped: 0,
            cancelled,
            outcomes: vec![ok, bad],
        }
    }

    fn snapshot(completed: usize) -> LedgerSnapshot {
        LedgerSnapshot {
            completed,
            failed: 0,
            total: 2,
            percent: (completed * 50) as u8,
        }
    }

    #[test]
    fn test_silent_prints_nothing() {
        let h = harness(Verbosity::Silent);
        let (ok, bad) = outcomes();
        h.reporter.on_start(&start());
        h.reporter.on_progress(&ok, &snapshot(1));
        h.reporter.on_finish(&summary(ok, bad, false));
        assert!(h.out.contents().is_empty());
        assert!(h.err.contents().is_empty());
    }

    #[test]
    fn test_normal_reports_failures_and_totals() {
        let h = harness(Verbosity::Normal);
        let (ok, bad) = outcomes();
        h.reporter.on_start(&start());
        h.reporter.on_progress(&ok, &snapshot(1));
        h.reporter.on_progress(&bad, &snapshot(2));
        h.reporter.on_finish(&summary(ok, bad, false));

        let out = h.out.contents();
        assert!(out.starts_with("files to send: 2\n"));
        assert!(out.contains("sent: 1\nfailed: 1\ntotal: 2\n"));
        assert!(!out.contains("skipped"));

        let err = h.err.contents();
        assert_eq!(err.lines().count(), 1);
        assert!(err.contains("/cv/bad.pdf"));
    }

    #[test]
    fn test_verbose_lists_files_and_every_result() {
        let h = harness(Verbosity::Verbose);
        let (ok, bad) = outcomes();
        h.reporter.on_start(&start());
        h.reporter.on_progress(&ok, &snapshot(1));
        h.reporter.on_finish(&summary(ok, bad, false));

        let out = h.out.contents();
        assert!(out.contains("/cv/ok.pdf\n/cv/bad.pdf\n"));
        assert!(out.contains("[%50] - {\"file\":\"/cv/ok.pdf\",\"sent\":true"));
        assert_eq!(h.err.contents().lines().count(), 2);
    }

    #[test]
    fn test_verbose_mirrors_into_log() {
        let log = SharedBuffer::default();
        let h = harness(Verbosity::Verbose);
        let reporter = h.reporter.with_log_writer(Box::new(log.clone()));
        let (ok, bad) = outcomes();

        reporter.on_progress(&ok, &snapshot(1));
        reporter.on_finish(&summary(ok, bad, true));

        let contents = log.contents();
        assert!(contents.starts_with("{\"file\":\"/cv/ok.pdf\""));
        assert!(contents.contains("skipped: 0\n"));
    }

    #[test]
    fn test_log_file_ignored_when_not_verbose() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let reporter = harness(Verbosity::Normal)
            .reporter
            .with_log_file(&path)
            .unwrap();
        assert!(reporter.log.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_log_file_open_failure() {
        let result = harness(Verbosity::Verbose)
            .reporter
            .with_log_file(Path::new("/nonexistent/dir/run.log"));
        assert!(matches!(result, Err(ReporterError::LogFile { .. })));
    }
}
