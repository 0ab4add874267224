use crate::utils::{epoch_seconds, write_atomic};
use log::{debug, trace};
use snafu::{ResultExt, Snafu, ensure};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

const TIMESTAMP_LEN: usize = size_of::<i64>();

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum TimestampError {
    #[snafu(display("Failed to read timestamp {}: {source}", path.display()))]
    Read { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to write timestamp {}: {source}", path.display()))]
    Write { path: PathBuf, source: io::Error },

    #[snafu(display(
        "Timestamp {} holds {len} bytes, expected {TIMESTAMP_LEN}",
        path.display()
    ))]
    Truncated { path: PathBuf, len: usize },
}

/// The stored build time in whole seconds since the epoch, or `None` if there is no
/// timestamp file yet.
pub fn read_timestamp(file: &Path) -> Result<Option<i64>, TimestampError> {
    let bytes = match fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context(ReadErr { path: file }),
    };
    ensure!(
        bytes.len() >= TIMESTAMP_LEN,
        TruncatedErr {
            path: file,
            len: bytes.len()
        }
    );

    let mut raw = [0; TIMESTAMP_LEN];
    raw.copy_from_slice(&bytes[..TIMESTAMP_LEN]);
    Ok(Some(i64::from_le_bytes(raw)))
}

pub fn write_timestamp_at(file: &Path, seconds: i64) -> Result<(), TimestampError> {
    write_atomic(file, &seconds.to_le_bytes()).context(WriteErr { path: file })
}

/// Stores the current time as the last build time.
pub fn write_timestamp(file: &Path) -> Result<(), TimestampError> {
    let now = epoch_seconds(SystemTime::now());
    write_timestamp_at(file, now)?;
    debug!("[Build] Wrote timestamp {now} to {}", file.display());
    Ok(())
}

/// True if there is no timestamp yet or anything under `dir` (including `dir` itself) was
/// modified after it. A missing `dir` counts as unmodified.
pub fn check_for_modifications(dir: &Path, timestamp_file: &Path) -> Result<bool, TimestampError> {
    let Some(last_build) = read_timestamp(timestamp_file)? else {
        debug!("[Build] No timestamp at {}", timestamp_file.display());
        return Ok(true);
    };

    if !dir.exists() {
        return Ok(false);
    }

    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let Ok(modified) = entry.metadata().map_err(io::Error::from).and_then(|m| m.modified())
        else {
            continue;
        };

        if epoch_seconds(modified) > last_build {
            trace!("[Build] {} changed since the last build", entry.path().display());
            return Ok(true);
        }
    }

    Ok(false)
}
