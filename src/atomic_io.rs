//! Atomic file writes
//!
//! Every output file (raw JSON, endpoint marker, table CSVs, summaries) is
//! written to a hidden temporary file in the target directory, synced, then
//! renamed over the target. A failed write removes the temporary file and
//! leaves any previous version of the target untouched.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `path` atomically, letting `write` fill the temporary file
///
/// Parent directories are created as needed.
pub(crate) fn write_atomic_with<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), E>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let tmp = dir.join(format!(
        ".{}.tmp.{}.{}",
        file_name.to_string_lossy(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = (|| -> Result<(), E> {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write(&mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Write `contents` to `path` atomically
pub(crate) fn write_atomic<E: From<io::Error>>(path: &Path, contents: &[u8]) -> Result<(), E> {
    write_atomic_with(path, |out| Ok(out.write_all(contents)?))
}
