use cinder_utils::append_extension;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes `bytes` next to `path` first and renames it into place, so readers never observe
/// a half-written file. Parent directories are created as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp = append_extension(path, "tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

/// Whole seconds since the epoch. Times before the epoch are negative.
pub fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn epoch_seconds_truncates() {
        let t = UNIX_EPOCH + Duration::from_millis(5_999);
        assert_eq!(epoch_seconds(t), 5);
    }

    #[test]
    fn write_atomic_creates_parents() {
        let dir = std::env::temp_dir().join(format!("cinder-fs-{}", uuid::Uuid::new_v4()));
        let file = dir.join("nested/deeper/file.bin");

        write_atomic(&file, b"abc").unwrap();

        assert_eq!(fs::read(&file).unwrap(), b"abc");
        assert!(!append_extension(&file, "tmp").exists());
        fs::remove_dir_all(dir).unwrap();
    }
}
