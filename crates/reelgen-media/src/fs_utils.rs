//! Publishing finished files out of the request workspace.
//!
//! The work directory and the output directory may sit on different
//! filesystems, where `rename` fails with EXDEV.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Move `src` to `output_dir/file_name`, creating the directory if needed.
pub async fn publish_file(
    src: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    file_name: &str,
) -> MediaResult<PathBuf> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir).await?;

    let dst = output_dir.join(file_name);
    move_file(src.as_ref(), &dst).await?;
    Ok(dst)
}

/// Move a file, falling back to copy + delete across devices.
pub async fn move_file(src: &Path, dst: &Path) -> MediaResult<()> {
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename, copying instead: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_then_remove(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is 18 on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

async fn copy_then_remove(src: &Path, dst: &Path) -> MediaResult<()> {
    // Copy next to the destination so the final rename stays on one filesystem.
    let staging = dst.with_extension("partial");

    fs::copy(src, &staging).await?;
    if let Err(e) = fs::rename(&staging, dst).await {
        let _ = fs::remove_file(&staging).await;
        return Err(e.into());
    }

    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!("Failed to remove {} after copy: {}", src.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_publish_moves_into_output_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("final.mp4");
        fs::write(&src, b"movie").await.unwrap();

        let dst = publish_file(&src, dir.path().join("out"), "abc.mp4").await.unwrap();

        assert!(!src.exists());
        assert_eq!(dst, dir.path().join("out").join("abc.mp4"));
        assert_eq!(fs::read(&dst).await.unwrap(), b"movie");
    }

    #[tokio::test]
    async fn test_copy_then_remove() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        let dst = dir.path().join("b.mp4");
        fs::write(&src, b"data").await.unwrap();

        copy_then_remove(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert!(!dir.path().join("b.partial").exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"data");
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
