//! Privileged execution engine.
//!
//! Each run gets one worker thread that owns the child process. Stdout
//! and stderr are drained by a reader thread apiece, feeding the same
//! channel so the interface sees one merged stream of lines in arrival
//! order. After both streams close the worker waits for the exit status
//! and delivers exactly one terminal `ExecutionResult`.
//!
//! There is no kill path and no timeout: once launched, an operation
//! runs to natural completion.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::{debug, warn};

use crate::command::RenderedCommand;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The process ran and exited with this status code.
    Exited(i32),
    /// The process could not be started at all.
    LaunchFailed(String),
}

impl ExecOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecOutcome::Exited(0))
    }
}

/// Terminal outcome of a run: exit disposition plus every output line
/// captured in arrival order. Partial output survives failure.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub outcome: ExecOutcome,
    pub lines: Vec<String>,
}

/// Events delivered to the interface, lines first, one `Finished` last.
#[derive(Debug, Clone)]
pub enum ExecEvent {
    Line(String),
    Finished(ExecutionResult),
}

/// Launch a rendered command on a worker thread and stream its output.
///
/// The returned receiver yields `Line` events as the child produces
/// them and closes after the single `Finished` event.
pub fn spawn(rendered: RenderedCommand, elevate: bool) -> Receiver<ExecEvent> {
    let (event_tx, event_rx) = mpsc::channel();

    thread::spawn(move || run_to_completion(&rendered, elevate, &event_tx));

    event_rx
}

fn run_to_completion(rendered: &RenderedCommand, elevate: bool, event_tx: &Sender<ExecEvent>) {
    let argv = rendered.launch_argv(elevate);
    // Catalog validation guarantees a non-empty template.
    let Some(program) = argv.first().cloned() else {
        let _ = event_tx.send(ExecEvent::Finished(ExecutionResult {
            outcome: ExecOutcome::LaunchFailed("empty command".to_string()),
            lines: Vec::new(),
        }));
        return;
    };
    debug!("launching: {}", rendered.command_line(elevate));

    let mut child = match Command::new(&program)
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(error) => {
            warn!("failed to launch `{program}`: {error}");
            let _ = event_tx.send(ExecEvent::Finished(ExecutionResult {
                outcome: ExecOutcome::LaunchFailed(format!("failed to launch `{program}`: {error}")),
                lines: Vec::new(),
            }));
            return;
        }
    };

    // Both streams feed one channel; the channel serializes arrival order.
    let (line_tx, line_rx) = mpsc::channel();
    if let Some(stdout) = child.stdout.take() {
        spawn_line_reader(stdout, line_tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, line_tx.clone());
    }
    drop(line_tx);

    // Forward live, but also keep every line for the terminal result.
    let mut captured = Vec::new();
    for line in line_rx {
        captured.push(line.clone());
        let _ = event_tx.send(ExecEvent::Line(line));
    }

    let outcome = match child.wait() {
        // A None code means the child died to a signal; report it as a
        // conventional fatal-signal exit status.
        Ok(status) => ExecOutcome::Exited(status.code().unwrap_or(-1)),
        Err(error) => ExecOutcome::LaunchFailed(format!("failed to reap `{program}`: {error}")),
    };

    let _ = event_tx.send(ExecEvent::Finished(ExecutionResult {
        outcome,
        lines: captured,
    }));
}

fn spawn_line_reader(stream: impl Read + Send + 'static, sender: Sender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    while buffer
                        .last()
                        .is_some_and(|byte| *byte == b'\n' || *byte == b'\r')
                    {
                        buffer.pop();
                    }
                    let line = String::from_utf8_lossy(&buffer).into_owned();
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    let _ = sender.send(format!("<output read error: {error}>"));
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OperationDefinition;
    use crate::command::render;

    fn shell(script: &str) -> RenderedCommand {
        let def = OperationDefinition::new("Test", "shell snippet", &["sh", "-c", script]);
        render(&def, None).unwrap()
    }

    fn collect(rx: Receiver<ExecEvent>) -> (Vec<String>, ExecutionResult) {
        let mut streamed = Vec::new();
        for event in rx {
            match event {
                ExecEvent::Line(line) => streamed.push(line),
                ExecEvent::Finished(result) => return (streamed, result),
            }
        }
        panic!("channel closed without a terminal result");
    }

    #[test]
    fn test_zero_exit_is_success() {
        let (streamed, result) = collect(spawn(shell("printf 'one\\ntwo\\n'"), false));
        assert_eq!(streamed, ["one", "two"]);
        assert_eq!(result.outcome, ExecOutcome::Exited(0));
        assert!(result.outcome.is_success());
        assert_eq!(result.lines, streamed);
    }

    #[test]
    fn test_nonzero_exit_carries_exact_code() {
        let (_, result) = collect(spawn(shell("exit 7"), false));
        assert_eq!(result.outcome, ExecOutcome::Exited(7));
        assert!(!result.outcome.is_success());
    }

    #[test]
    fn test_partial_output_survives_failure() {
        let (streamed, result) = collect(spawn(shell("echo partial; exit 1"), false));
        assert_eq!(streamed, ["partial"]);
        assert_eq!(result.outcome, ExecOutcome::Exited(1));
        assert_eq!(result.lines, ["partial"]);
    }

    #[test]
    fn test_stderr_is_merged_into_the_stream() {
        let (streamed, result) =
            collect(spawn(shell("echo to-stdout; echo to-stderr 1>&2"), false));
        assert!(streamed.contains(&"to-stdout".to_string()));
        assert!(streamed.contains(&"to-stderr".to_string()));
        assert!(result.outcome.is_success());
    }

    #[test]
    fn test_line_order_is_preserved() {
        let script = "for i in 1 2 3 4 5 6 7 8; do echo line-$i; done";
        let (streamed, _) = collect(spawn(shell(script), false));
        let expected: Vec<String> = (1..=8).map(|i| format!("line-{i}")).collect();
        assert_eq!(streamed, expected);
    }

    #[test]
    fn test_launch_failure_is_not_an_exit_code() {
        let def = OperationDefinition::new(
            "Missing",
            "no such binary",
            &["syswiz-test-no-such-binary"],
        );
        let rendered = render(&def, None).unwrap();
        let (streamed, result) = collect(spawn(rendered, false));
        assert!(streamed.is_empty());
        match result.outcome {
            ExecOutcome::LaunchFailed(cause) => {
                assert!(cause.contains("syswiz-test-no-such-binary"));
            }
            ExecOutcome::Exited(code) => panic!("expected launch failure, got exit {code}"),
        }
    }
}
