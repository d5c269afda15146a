//! Society home-directory archival on deletion. `srcflib` has no direct
//! counterpart for this (society homes were historically just left in
//! place); per the archival path named in the expanded spec
//! (`/archive/societies/<name>/`), a deleted society's files are tarred up
//! there rather than discarded outright.

use std::io;
use std::path::Path;

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use srcf_task::{State, TaskResult};

use crate::error::Result;

/// Archive `source_dir` (a society's home directory) into a timestamped
/// gzip-compressed tarball under `archive_root/<society>/`, then return the
/// path written. A no-op, returning `Unchanged`, if `source_dir` doesn't
/// exist (nothing to archive).
pub async fn archive_society(society: &str, source_dir: &str, archive_root: &str) -> Result<TaskResult<String>> {
    if tokio::fs::metadata(source_dir).await.is_err() {
        return Ok(TaskResult::new("archive_society", State::Unchanged, String::new()));
    }

    let dest_dir = format!("{archive_root}/{society}");
    tokio::fs::create_dir_all(&dest_dir).await?;

    let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let archive_path = format!("{dest_dir}/{society}-{timestamp}.tar.gz");

    let source_dir = source_dir.to_string();
    let archive_path_owned = archive_path.clone();
    tokio::task::spawn_blocking(move || write_tar_gz(&source_dir, &archive_path_owned, society))
        .await
        .map_err(|e| crate::error::BespokeError::Other(format!("archive task panicked: {e}")))??;

    Ok(TaskResult::new("archive_society", State::Created, archive_path))
}

fn write_tar_gz(source_dir: &str, archive_path: &str, society: &str) -> io::Result<()> {
    let file = std::fs::File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(society, Path::new(source_dir))?;
    builder.into_inner()?.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn archives_existing_directory() {
        let src = tempfile::tempdir().unwrap();
        tokio::fs::write(src.path().join("file.txt"), b"hello").await.unwrap();
        let archive_root = tempfile::tempdir().unwrap();

        let result = archive_society(
            "spqr",
            &src.path().to_string_lossy(),
            &archive_root.path().to_string_lossy(),
        )
        .await
        .unwrap();

        assert_eq!(result.state(), State::Created);
        let path = result.value().unwrap();
        assert!(tokio::fs::metadata(path).await.is_ok());
    }

    #[tokio::test]
    async fn missing_source_is_unchanged() {
        let archive_root = tempfile::tempdir().unwrap();
        let result = archive_society(
            "spqr",
            "/nonexistent/path/for/archive/test",
            &archive_root.path().to_string_lossy(),
        )
        .await
        .unwrap();
        assert_eq!(result.state(), State::Unchanged);
    }
}
