use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum size of a configuration or device list file (1 MB)
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Maximum size of a local CVE feed (512 MB). NVD yearly feeds are well below this.
pub const MAX_CVE_FEED_SIZE: u64 = 512 * 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is inspected rather than its
/// target.
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|e| VulnTrackError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {} metadata: {}", file_description, e),
    })?;

    if metadata.is_symlink() {
        return Err(VulnTrackError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} is a symbolic link", file_description),
            hint: "Point to the real file instead of a link".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(metadata.len())
}

/// Validates file size is within acceptable limits
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        return Err(VulnTrackError::SecurityError {
            path: path.to_path_buf(),
            reason: format!(
                "File is too large ({} bytes). Maximum allowed size is {} bytes.",
                file_size, max_size
            ),
            hint: "Split the file or check that the right path was given".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Reads a file after the regular-file and size checks pass.
pub fn read_trusted_file(path: &Path, file_description: &str, max_size: u64) -> Result<String> {
    let size = validate_regular_file(path, file_description)?;
    validate_file_size(size, path, max_size)?;

    fs::read_to_string(path).map_err(|e| {
        VulnTrackError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_regular_file_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("devices.yml");
        fs::write(&file_path, "test").unwrap();

        let size = validate_regular_file(&file_path, "device list").unwrap();
        assert_eq!(size, 4);
    }

    #[test]
    fn test_validate_regular_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/feed.json");
        let result = validate_regular_file(&path, "CVE feed");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_validate_regular_file_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_regular_file(temp_dir.path(), "CVE feed");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a regular file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_regular_file_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.json");
        let link = temp_dir.path().join("link.json");
        fs::write(&target, "{}").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = validate_regular_file(&link, "CVE feed");
        assert!(result.unwrap_err().to_string().contains("Security violation"));
    }

    #[test]
    fn test_validate_file_size_exceeds_limit() {
        let path = PathBuf::from("/test/file.txt");
        let result = validate_file_size(MAX_CONFIG_FILE_SIZE + 1, &path, MAX_CONFIG_FILE_SIZE);
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    fn test_read_trusted_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("config.yml");
        fs::write(&file_path, "server:\n  bind: 127.0.0.1:9000\n").unwrap();

        let content = read_trusted_file(&file_path, "config file", MAX_CONFIG_FILE_SIZE).unwrap();
        assert!(content.contains("127.0.0.1:9000"));
    }
}
