//! Thin wrapper around spawning the SRCF site helper scripts
//! (`srcf-updateapachegroups`, `srcf-enqueue-mlsub`, ...), mirroring
//! `srcf_unix::process`.

use tokio::process::Command;

use crate::error::{BespokeError, Result};

pub async fn run(program: &str, args: &[&str]) -> Result<String> {
    tracing::debug!(program, ?args, "running site helper");
    let output = Command::new(program).args(args).output().await?;
    finish(program, output)
}

fn finish(program: &str, output: std::process::Output) -> Result<String> {
    if !output.status.success() {
        return Err(BespokeError::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
