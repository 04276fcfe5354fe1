//! Output distribution targets: console sinks and per-statement
//! redirection files.
//!
//! Every console-bound line passes through the display formatter, so
//! Arabic diagnostics render correctly; file writers receive the logical
//! text untouched (files store logical order, terminals get visual order).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::{Arc, Mutex};

use crossterm::style::Stylize;
use tracing::warn;

use core_lang::ParsedCommand;
use core_text::{BaseLevel, DisplayFormatter};

use crate::error::ShellError;
use crate::value::PipelineItem;

/// Console output/error streams. When the terminal width is known, RTL
/// lines are right-aligned to it; in-memory sinks have no width and emit
/// unaligned text.
pub struct Sinks {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    color_errors: bool,
    columns: Option<u16>,
    formatter: DisplayFormatter,
}

impl Sinks {
    pub fn new(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        color_errors: bool,
        columns: Option<u16>,
    ) -> Self {
        Sinks {
            out,
            err,
            color_errors,
            columns,
            formatter: DisplayFormatter::new(),
        }
    }

    /// Process stdout/stderr; `color_errors` should reflect whether stderr
    /// is a terminal. The terminal width is probed once so RTL output can
    /// right-align.
    pub fn stdio(color_errors: bool) -> Self {
        let columns = crossterm::terminal::size().ok().map(|(columns, _)| columns);
        Sinks::new(
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
            color_errors,
            columns,
        )
    }

    /// In-memory sinks for tests and captured runs. Returns the sinks plus
    /// handles to both buffers.
    pub fn memory() -> (Self, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        (
            Sinks::new(Box::new(out.clone()), Box::new(err.clone()), false, None),
            out,
            err,
        )
    }

    pub fn write_output_line(&mut self, text: &str) {
        let visual = self
            .formatter
            .format_line_aligned(text, BaseLevel::Auto, self.columns);
        let _ = writeln!(self.out, "{visual}");
        let _ = self.out.flush();
    }

    pub fn write_error_line(&mut self, text: &str) {
        let visual = self
            .formatter
            .format_line_aligned(text, BaseLevel::Auto, self.columns);
        let line = if self.color_errors {
            format!("{}", visual.red())
        } else {
            visual
        };
        let _ = writeln!(self.err, "{line}");
        let _ = self.err.flush();
    }
}

/// Clonable in-memory byte buffer usable as a sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A line the redirection layer did not write to a file; the caller sends
/// it to the console or a capture buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedLine {
    pub to_stderr: bool,
    pub text: String,
}

struct StreamFile {
    writer: BufWriter<File>,
    path: String,
}

/// Per-statement redirection state, derived from the final stage.
pub struct RedirectionSinks {
    out_file: Option<StreamFile>,
    err_file: Option<StreamFile>,
    merge_err_to_out: bool,
    merge_out_to_err: bool,
}

impl RedirectionSinks {
    /// Open the redirection files for a stage. An unopenable file aborts
    /// the whole statement, per the redirection error contract.
    pub fn for_stage(stage: &ParsedCommand) -> Result<Self, ShellError> {
        let open = |stream: u8| -> Result<Option<StreamFile>, ShellError> {
            match stage.file_target(stream) {
                Some((path, append)) => {
                    let file = OpenOptions::new()
                        .create(true)
                        .write(true)
                        .append(append)
                        .truncate(!append)
                        .open(path)
                        .map_err(|source| ShellError::Redirection {
                            path: path.to_string(),
                            source,
                        })?;
                    Ok(Some(StreamFile {
                        writer: BufWriter::new(file),
                        path: path.to_string(),
                    }))
                }
                None => Ok(None),
            }
        };
        Ok(RedirectionSinks {
            out_file: open(1)?,
            err_file: open(2)?,
            merge_err_to_out: stage.merges_err_into_out(),
            merge_out_to_err: stage.merges_out_into_err(),
        })
    }

    /// Route one pipeline item: merge flags pick the logical stream, then
    /// the stream's file writer consumes it if one is open. A failed file
    /// write closes that writer and falls back to the console for the
    /// remaining items of the stream. Returns the line for the caller's
    /// console (or capture buffer) when no file took it.
    pub fn route(&mut self, item: &PipelineItem) -> Option<RoutedLine> {
        let text = item.value.to_text();
        let to_stderr = if item.is_error {
            !self.merge_err_to_out
        } else {
            self.merge_out_to_err
        };
        let file = if to_stderr {
            &mut self.err_file
        } else {
            &mut self.out_file
        };
        if let Some(stream_file) = file {
            match writeln!(stream_file.writer, "{text}") {
                Ok(()) => return None,
                Err(error) => {
                    warn!(
                        target: "exec.redirect",
                        path = %stream_file.path,
                        %error,
                        "redirection_write_failed_falling_back"
                    );
                    *file = None;
                }
            }
        }
        Some(RoutedLine { to_stderr, text })
    }

    /// Flush and close the statement's writers.
    pub fn finish(mut self) {
        for file in [self.out_file.take(), self.err_file.take()].into_iter().flatten() {
            let mut writer = file.writer;
            if let Err(error) = writer.flush() {
                warn!(target: "exec.redirect", path = %file.path, %error, "redirection_flush_failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_lang::{RedirTarget, Redirection};
    use crate::value::Value;

    #[test]
    fn memory_sinks_capture_lines() {
        let (mut sinks, out, err) = Sinks::memory();
        sinks.write_output_line("hello");
        sinks.write_error_line("oops");
        assert_eq!(out.contents(), "hello\n");
        assert_eq!(err.contents(), "oops\n");
    }

    #[test]
    fn rtl_console_lines_right_align_to_known_width() {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let mut sinks = Sinks::new(Box::new(out.clone()), Box::new(err.clone()), false, Some(8));
        sinks.write_output_line("שלום");
        let line = out.contents();
        // Four Hebrew columns padded out to eight.
        assert!(line.starts_with("    "), "expected left padding: {line:?}");
        assert_eq!(line.trim_start().trim_end().chars().count(), 4);

        // LTR lines keep their left edge.
        sinks.write_output_line("abc");
        assert!(out.contents().ends_with("abc\n"));
    }

    #[test]
    fn routing_honors_merge_flags() {
        let stage = {
            let mut cmd = ParsedCommand::named("اطبع");
            cmd.redirections.push(Redirection {
                source: 2,
                target: RedirTarget::Stream(1),
            });
            cmd
        };
        let mut redirect = RedirectionSinks::for_stage(&stage).unwrap();
        let regular = redirect
            .route(&PipelineItem::output(Value::str("regular")))
            .unwrap();
        let merged = redirect
            .route(&PipelineItem::error(Value::str("broken")))
            .unwrap();
        redirect.finish();
        assert!(!regular.to_stderr);
        assert!(!merged.to_stderr, "2>&1 sends errors to stdout");
        assert_eq!(merged.text, "broken");

        // The mirror merge: regular output lands on stderr.
        let stage = {
            let mut cmd = ParsedCommand::named("اطبع");
            cmd.redirections.push(Redirection {
                source: 1,
                target: RedirTarget::Stream(2),
            });
            cmd
        };
        let mut redirect = RedirectionSinks::for_stage(&stage).unwrap();
        let flipped = redirect
            .route(&PipelineItem::output(Value::str("regular")))
            .unwrap();
        redirect.finish();
        assert!(flipped.to_stderr, "1>&2 sends output to stderr");
    }

    #[test]
    fn file_redirection_writes_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path_str = path.to_str().unwrap().to_string();

        let mut stage = ParsedCommand::named("اطبع");
        stage.redirections.push(Redirection {
            source: 1,
            target: RedirTarget::File {
                path: path_str.clone(),
                append: false,
            },
        });
        let mut redirect = RedirectionSinks::for_stage(&stage).unwrap();
        assert!(redirect
            .route(&PipelineItem::output(Value::str("def")))
            .is_none());
        redirect.finish();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "def\n");

        // Append mode adds instead of truncating.
        stage.redirections[0].target = RedirTarget::File {
            path: path_str,
            append: true,
        };
        let mut redirect = RedirectionSinks::for_stage(&stage).unwrap();
        assert!(redirect
            .route(&PipelineItem::output(Value::str("ghi")))
            .is_none());
        redirect.finish();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "def\nghi\n");
    }

    #[test]
    fn unopenable_redirection_is_an_error() {
        let mut stage = ParsedCommand::named("اطبع");
        stage.redirections.push(Redirection {
            source: 1,
            target: RedirTarget::File {
                path: "/definitely/not/a/real/dir/out.txt".into(),
                append: false,
            },
        });
        assert!(matches!(
            RedirectionSinks::for_stage(&stage),
            Err(ShellError::Redirection { .. })
        ));
    }
}
