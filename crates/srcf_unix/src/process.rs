//! Thin wrapper around spawning the `adduser`/`usermod`/`chpasswd`-family of
//! external helpers and capturing their output.

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Result, UnixError};

/// Run `program args…`, waiting for exit and capturing stdout/stderr.
/// Returns [`UnixError::CommandFailed`] on a non-zero exit.
pub async fn run(program: &str, args: &[&str]) -> Result<String> {
    tracing::debug!(program, ?args, "running external helper");
    let output = Command::new(program).args(args).output().await?;
    finish(program, output)
}

/// Run `program args…`, writing `stdin` to the child's standard input
/// before waiting — used by `chpasswd` and the Mailman helpers, which all
/// take their secret on stdin rather than argv.
pub async fn run_with_stdin(program: &str, args: &[&str], stdin: &str) -> Result<String> {
    tracing::debug!(program, ?args, "running external helper with stdin");
    let mut child = Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()?;

    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(stdin.as_bytes())
        .await?;

    let output = child.wait_with_output().await?;
    finish(program, output)
}

fn finish(program: &str, output: std::process::Output) -> Result<String> {
    if !output.status.success() {
        return Err(UnixError::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
