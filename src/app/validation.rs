//! Pre-flight validation run before resolution and fan-out.

use std::path::PathBuf;

use tracing::debug;

use super::error::RunError;

/// Validates that every declared PDF attachment exists.
///
/// Runs before resolution so a bad attachment list aborts with no writes
/// anywhere, including the BibTeX cache.
///
/// # Errors
///
/// Returns [`RunError::MissingAttachment`] for the first path that is not
/// an existing file.
pub fn validate_attachments(paths: &[PathBuf]) -> Result<(), RunError> {
    for path in paths {
        if !path.is_file() {
            return Err(RunError::missing_attachment(path.clone()));
        }
        debug!(path = %path.display(), "Attachment validated");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_attachments_empty_list_ok() {
        assert!(validate_attachments(&[]).is_ok());
    }

    #[test]
    fn test_validate_attachments_existing_files_ok() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"%PDF-").unwrap();
        std::fs::write(&b, b"%PDF-").unwrap();

        assert!(validate_attachments(&[a, b]).is_ok());
    }

    #[test]
    fn test_validate_attachments_one_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.pdf");
        std::fs::write(&present, b"%PDF-").unwrap();
        let missing = dir.path().join("missing.pdf");

        let err = validate_attachments(&[present, missing.clone()]).unwrap_err();
        match err {
            RunError::MissingAttachment { path } => assert_eq!(path, missing),
            other => panic!("expected MissingAttachment, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_attachments_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_attachments(&[dir.path().to_path_buf()]);
        assert!(err.is_err());
    }
}
