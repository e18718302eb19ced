//! External process execution with cooperative cancellation
//!
//! Both runners merge stdout and stderr line by line, hand each line to a
//! callback as it arrives and poll a shared cancel flag. When the flag is
//! observed the child is killed; whatever was read so far is still returned.
//! Lines are decoded lossily so a stray non-UTF-8 byte never ends a stream.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead};
use tracing::debug;

/// How often a quiet child is checked for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured outcome of one external process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// stdout and stderr lines in arrival order
    pub lines: Vec<String>,
    pub cancelled: bool,
}

/// Run `argv` to completion on the calling thread.
pub fn run_blocking(
    argv: &[String],
    cancel: &AtomicBool,
    on_line: &mut dyn FnMut(&str),
) -> io::Result<ProcessOutput> {
    let (program, args) = split_argv(argv)?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    debug!(program, pid = child.id(), "Spawned analyzer process");

    let (tx, rx) = mpsc::channel::<String>();
    let streams: Vec<Box<dyn Read + Send>> = [
        child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
    ]
    .into_iter()
    .flatten()
    .collect();

    let readers: Vec<_> = streams
        .into_iter()
        .map(|stream| {
            let tx = tx.clone();
            thread::spawn(move || {
                let mut reader = BufReader::new(stream);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf) {
                        Ok(0) => break,
                        Ok(_) => {
                            if tx.send(decode_line(&buf)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "Analyzer stream read failed");
                            break;
                        }
                    }
                }
            })
        })
        .collect();
    drop(tx);

    let mut output = ProcessOutput::default();
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                on_line(&line);
                output.lines.push(line);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if !output.cancelled && cancel.load(Ordering::SeqCst) {
            output.cancelled = true;
            debug!(program, "Cancel requested, killing analyzer process");
            // The process may already have exited on its own.
            let _ = child.kill();
        }
    }

    let status = child.wait()?;
    for reader in readers {
        let _ = reader.join();
    }
    output.exit_code = status.code();
    Ok(output)
}

/// Async counterpart of [`run_blocking`] built on `tokio::process`.
pub async fn run_async(
    argv: &[String],
    cancel: &AtomicBool,
    on_line: &mut (dyn FnMut(&str) + Send),
) -> io::Result<ProcessOutput> {
    let (program, args) = split_argv(argv)?;
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;
    debug!(program, pid = ?child.id(), "Spawned analyzer process");

    let mut stdout = child.stdout.take().map(LossyLines::new);
    let mut stderr = child.stderr.take().map(LossyLines::new);
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    let mut output = ProcessOutput::default();
    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            line = next_line(&mut stdout) => match line {
                Some(line) => {
                    on_line(&line);
                    output.lines.push(line);
                }
                None => stdout = None,
            },
            line = next_line(&mut stderr) => match line {
                Some(line) => {
                    on_line(&line);
                    output.lines.push(line);
                }
                None => stderr = None,
            },
            _ = ticker.tick() => {
                if !output.cancelled && cancel.load(Ordering::SeqCst) {
                    output.cancelled = true;
                    debug!(program, "Cancel requested, killing analyzer process");
                    let _ = child.start_kill();
                }
            }
        }
    }

    let status = child.wait().await?;
    output.exit_code = status.code();
    Ok(output)
}

/// Line reader over raw bytes. Partial reads survive a cancelled
/// `read_until`, so it can be polled from `select!`.
struct LossyLines<R> {
    reader: tokio::io::BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LossyLines<R> {
    fn new(stream: R) -> Self {
        Self {
            reader: tokio::io::BufReader::new(stream),
            buf: Vec::new(),
        }
    }

    async fn next_line(&mut self) -> Option<String> {
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) if self.buf.is_empty() => None,
            Ok(_) => {
                let line = decode_line(&self.buf);
                self.buf.clear();
                Some(line)
            }
            Err(e) => {
                debug!(error = %e, "Analyzer stream read failed");
                None
            }
        }
    }
}

/// Next line of an open stream; pending forever once the stream is closed so
/// `select!` stops polling it.
async fn next_line<R>(lines: &mut Option<LossyLines<R>>) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    match lines {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

/// One line without its terminator, invalid UTF-8 replaced.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn split_argv(argv: &[String]) -> io::Result<(&str, &[String])> {
    match argv.split_first() {
        Some((program, args)) if !program.is_empty() => Ok((program.as_str(), args)),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty command line",
        )),
    }
}

/// First non-empty line printed by `program --version`, if it runs at all.
pub fn probe_version(program: &std::path::Path) -> Option<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .ok()?;
    let text = if output.stdout.is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    String::from_utf8_lossy(&text)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_run_blocking_collects_both_streams() {
        let cancel = AtomicBool::new(false);
        let mut seen = 0;
        let output = run_blocking(
            &sh("echo out; echo err 1>&2; exit 3"),
            &cancel,
            &mut |_| seen += 1,
        )
        .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(seen, 2);
        assert!(output.lines.contains(&"out".to_string()));
        assert!(output.lines.contains(&"err".to_string()));
        assert!(!output.cancelled);
    }

    #[test]
    fn test_run_blocking_honours_cancel() {
        let cancel = AtomicBool::new(true);
        let output = run_blocking(&sh("exec sleep 5"), &cancel, &mut |_| {}).unwrap();

        assert!(output.cancelled);
        assert_ne!(output.exit_code, Some(0));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let cancel = AtomicBool::new(false);
        let argv = vec!["/nonexistent/crosslint-test-binary".to_string()];
        assert!(run_blocking(&argv, &cancel, &mut |_| {}).is_err());
        assert!(run_blocking(&[], &cancel, &mut |_| {}).is_err());
    }

    #[tokio::test]
    async fn test_run_async_streams_lines() {
        let cancel = AtomicBool::new(false);
        let mut lines = Vec::new();
        let output = run_async(&sh("echo one; echo two"), &cancel, &mut |l| {
            lines.push(l.to_string())
        })
        .await
        .unwrap();

        assert_eq!(output.exit_code, Some(0));
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_run_async_honours_cancel() {
        let cancel = AtomicBool::new(true);
        let output = run_async(&sh("exec sleep 5"), &cancel, &mut |_| {}).await.unwrap();
        assert!(output.cancelled);
    }

    const MIXED_ENCODING: &str =
        "printf 'a.c:1:1: warning: x [r1]\\n\\377\\na.c:2:1: warning: y [r2]\\n'";

    #[test]
    fn test_run_blocking_survives_invalid_utf8() {
        let cancel = AtomicBool::new(false);
        let output = run_blocking(&sh(MIXED_ENCODING), &cancel, &mut |_| {}).unwrap();

        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.lines.len(), 3);
        assert_eq!(output.lines[1], "\u{FFFD}");
        assert_eq!(output.lines[2], "a.c:2:1: warning: y [r2]");
    }

    #[tokio::test]
    async fn test_run_async_survives_invalid_utf8() {
        let cancel = AtomicBool::new(false);
        let output = run_async(&sh(MIXED_ENCODING), &cancel, &mut |_| {}).await.unwrap();

        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.lines.len(), 3);
        assert_eq!(output.lines[2], "a.c:2:1: warning: y [r2]");
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"abc\r\n"), "abc");
        assert_eq!(decode_line(b"tail"), "tail");
        assert_eq!(decode_line(b"\xffx\n"), "\u{FFFD}x");
    }

    #[test]
    fn test_probe_version() {
        assert!(probe_version(std::path::Path::new("/nonexistent/crosslint-test-binary")).is_none());
    }
}
