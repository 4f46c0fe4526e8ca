//! Two-pass compiler invocation and outcome classification.

use crate::{classify, CompileError};
use camino::{Utf8Path, Utf8PathBuf};
use scanforge_types::CompilationResult;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The template file whose presence is checked before any compiler run.
pub const PREAMBLE_FILE: &str = "preamble.tex";

const PASS_COUNT: u32 = 2;

/// Why a finished run did not succeed, in classification priority order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// The log carried the image-not-found signature. Overrides any other
    /// signal, including a nonzero exit code.
    #[error("unresolved image references: {}", .0.join(", "))]
    MissingAssets(Vec<String>),
    /// Nonzero exit from the deciding pass, or a timed-out pass (reported
    /// with exit code -1).
    #[error("compiler exited with status {0}")]
    ToolError(i32),
    /// Exit code zero but no artifact on disk. An anomaly, not a crash.
    #[error("compiler reported success but produced no artifact")]
    SilentFailure,
}

/// One compiler run against a prepared output directory.
#[derive(Clone, Debug)]
pub struct CompilerInvocation<'a> {
    /// Compiler program name or path (`pdflatex` in production).
    pub program: &'a str,
    /// Main source file name, relative to the output directory.
    pub main_file: &'a str,
    pub out_dir: &'a Utf8Path,
    /// Per-pass timeout. A pass that exceeds it is killed and reported as
    /// a tool error.
    pub timeout: Duration,
}

/// The driver's full answer: the serializable result, the classified
/// reason when the run failed, and the combined two-pass log.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub result: CompilationResult,
    pub reason: Option<FailureReason>,
    pub log: String,
}

struct PassOutcome {
    status: Option<i32>,
    timed_out: bool,
    log: String,
}

/// Run the two-pass compilation against a prepared output directory.
///
/// Both passes are required because cross-references and structural
/// numbering only resolve on a second reading of the source. The first
/// pass's exit code is ignored; stdout and stderr of both passes feed one
/// combined log. A timed-out first pass skips the second pass instead of
/// hanging twice.
pub fn compile_document(invocation: &CompilerInvocation<'_>) -> Result<CompileOutput, CompileError> {
    let preamble = invocation.out_dir.join(PREAMBLE_FILE);
    if !preamble.exists() {
        return Err(CompileError::MissingPrecondition { path: preamble });
    }

    let mut combined_log = String::new();

    info!(program = invocation.program, "first compiler pass");
    let first = run_pass(invocation)?;
    combined_log.push_str(&first.log);

    if first.timed_out {
        warn!(timeout = ?invocation.timeout, "first pass timed out; skipping second pass");
        return Ok(classified_output(invocation, combined_log, &first, 1));
    }

    info!(program = invocation.program, "second compiler pass");
    let second = run_pass(invocation)?;
    combined_log.push_str(&second.log);

    Ok(classified_output(invocation, combined_log, &second, PASS_COUNT))
}

/// Apply the failure-classification priority order to a finished run.
fn classified_output(
    invocation: &CompilerInvocation<'_>,
    log: String,
    deciding_pass: &PassOutcome,
    pass_count: u32,
) -> CompileOutput {
    let artifact = artifact_path(invocation);

    let missing = classify::missing_asset_files(&log);
    if !missing.is_empty() {
        let reason = FailureReason::MissingAssets(missing.clone());
        return failure(pass_count, reason, log, missing);
    }

    if deciding_pass.timed_out {
        let reason = FailureReason::ToolError(-1);
        let message = format!(
            "compiler pass exceeded the {:?} timeout and was killed",
            invocation.timeout
        );
        return CompileOutput {
            result: CompilationResult {
                pass_count,
                succeeded: false,
                missing_images: Vec::new(),
                artifact_path: None,
                diagnostic_message: message,
            },
            reason: Some(reason),
            log,
        };
    }

    match deciding_pass.status {
        Some(0) => {}
        status => {
            let code = status.unwrap_or(-1);
            let reason = FailureReason::ToolError(code);
            let message = reason.to_string();
            return CompileOutput {
                result: CompilationResult {
                    pass_count,
                    succeeded: false,
                    missing_images: Vec::new(),
                    artifact_path: None,
                    diagnostic_message: message,
                },
                reason: Some(reason),
                log,
            };
        }
    }

    if !artifact.exists() {
        let reason = FailureReason::SilentFailure;
        let message = format!(
            "compiler exited successfully but '{artifact}' is absent from the output directory"
        );
        return CompileOutput {
            result: CompilationResult {
                pass_count,
                succeeded: false,
                missing_images: Vec::new(),
                artifact_path: None,
                diagnostic_message: message,
            },
            reason: Some(reason),
            log,
        };
    }

    CompileOutput {
        result: CompilationResult {
            pass_count,
            succeeded: true,
            missing_images: Vec::new(),
            artifact_path: Some(artifact.to_string()),
            diagnostic_message: format!("document compiled to {artifact}"),
        },
        reason: None,
        log,
    }
}

fn failure(
    pass_count: u32,
    reason: FailureReason,
    log: String,
    missing_images: Vec<String>,
) -> CompileOutput {
    let message = reason.to_string();
    CompileOutput {
        result: CompilationResult {
            pass_count,
            succeeded: false,
            missing_images,
            artifact_path: None,
            diagnostic_message: message,
        },
        reason: Some(reason),
        log,
    }
}

fn artifact_path(invocation: &CompilerInvocation<'_>) -> Utf8PathBuf {
    let stem = invocation
        .main_file
        .strip_suffix(".tex")
        .unwrap_or(invocation.main_file);
    invocation.out_dir.join(format!("{stem}.pdf"))
}

/// Run one non-interactive compiler pass under the configured timeout.
fn run_pass(invocation: &CompilerInvocation<'_>) -> Result<PassOutcome, CompileError> {
    let mut child = Command::new(invocation.program)
        .arg("-interaction=nonstopmode")
        .arg("-output-directory")
        .arg(invocation.out_dir.as_str())
        .arg(invocation.main_file)
        .current_dir(invocation.out_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CompileError::Spawn {
            program: invocation.program.to_string(),
            source,
        })?;

    // Drain both pipes off-thread so a chatty compiler cannot deadlock
    // against a full pipe buffer while we poll for exit.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = std::thread::spawn(move || read_all(stdout));
    let stderr_reader = std::thread::spawn(move || read_all(stderr));

    let deadline = Instant::now() + invocation.timeout;
    let mut timed_out = false;
    let status = loop {
        let polled = child.try_wait().map_err(|source| CompileError::Io {
            context: format!("wait for {}", invocation.program),
            source,
        })?;
        match polled {
            Some(status) => break Some(status),
            None if Instant::now() >= deadline => {
                timed_out = true;
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
            None => std::thread::sleep(Duration::from_millis(25)),
        }
    };

    let mut log = stdout_reader.join().unwrap_or_default();
    log.push_str(&stderr_reader.join().unwrap_or_default());

    Ok(PassOutcome {
        status: status.and_then(|s| s.code()),
        timed_out,
        log,
    })
}

fn read_all(pipe: Option<impl Read>) -> String {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
