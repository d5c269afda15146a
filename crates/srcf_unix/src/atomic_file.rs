//! Write-to-temp-then-rename helper shared by every line-based text-file
//! edit (`/etc/netgroup`, `.forward`, the website-enablement flat file):
//! a crash mid-write leaves the original file intact instead of truncated.

use std::path::Path;

use crate::error::Result;

/// Read `path` (empty string if it doesn't exist yet), pass its contents to
/// `edit`, and if the result differs, write it to `path` via a temp file in
/// the same directory followed by a rename.
///
/// Returns whether the file was actually rewritten.
pub async fn atomic_rewrite(path: &str, edit: impl FnOnce(&str) -> String) -> Result<bool> {
    let original = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let updated = edit(&original);
    if updated == original {
        return Ok(false);
    }

    let dir = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(
        ".{}.tmp.{}",
        Path::new(path).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
        std::process::id()
    ));

    tokio::fs::write(&tmp_path, updated).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_rewrite_when_edit_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f").to_string_lossy().into_owned();
        tokio::fs::write(&path, "unchanged\n").await.unwrap();
        let rewrote = atomic_rewrite(&path, |s| s.to_string()).await.unwrap();
        assert!(!rewrote);
    }

    #[tokio::test]
    async fn rewrites_when_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f").to_string_lossy().into_owned();
        tokio::fs::write(&path, "a\n").await.unwrap();
        let rewrote = atomic_rewrite(&path, |s| format!("{s}b\n")).await.unwrap();
        assert!(rewrote);
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn treats_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").to_string_lossy().into_owned();
        let rewrote = atomic_rewrite(&path, |s| format!("{s}first\n")).await.unwrap();
        assert!(rewrote);
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "first\n");
    }
}
