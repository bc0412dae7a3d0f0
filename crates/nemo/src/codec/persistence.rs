//! Snapshot file read/write operations.
//!
//! Snapshot files are UTF-8 text in the format of [`super::text`]. Writes go
//! to a temporary sibling first and are renamed into place, so a reader never
//! observes a half-written snapshot.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::text::{decode, encode};
use crate::error::{NemoError, Result};
use crate::indexer::has_line_break;
use crate::store::{snapshot_path, Snapshot};

/// Writes `snapshot` to `path`.
///
/// Fails with [`NemoError::InvalidInput`] if a record would span more than one
/// line. On any failure the temporary file is removed and an existing file at
/// `path` is left as it was.
pub fn write_snapshot_file(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let lines = encode(snapshot);
    if let Some(index) = lines.iter().position(|line| has_line_break(line)) {
        return Err(NemoError::InvalidInput(format!(
            "snapshot record {} contains a line break: {}",
            index + 1,
            lines[index].escape_debug()
        )));
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| NemoError::file_io(parent, error))?;
    }

    let tmp_path = path.with_extension("ser.partial");
    let written = write_lines(&tmp_path, &lines).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|error| NemoError::file_io(path, error))
    });
    if let Err(error) = written {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            if cleanup.kind() != ErrorKind::NotFound {
                log::warn!("failed to remove {}: {}", tmp_path.display(), cleanup);
            }
        }
        return Err(error);
    }

    log::debug!(
        "wrote snapshot '{}' to {} ({} entries)",
        snapshot.name(),
        path.display(),
        snapshot.entry_count()
    );

    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut output = BufWriter::new(File::create(path)?);
        for line in lines {
            output.write_all(line.as_bytes())?;
            output.write_all(b"\n")?;
        }
        output.flush()
    };
    write().map_err(|error| NemoError::file_io(path, error))
}

/// Writes `snapshot` into `index_dir` under its derived file name and returns the path.
pub fn save_snapshot(index_dir: &Path, snapshot: &Snapshot) -> Result<PathBuf> {
    let path = snapshot_path(index_dir, snapshot.name());
    write_snapshot_file(&path, snapshot)?;
    Ok(path)
}

/// Reads and decodes a snapshot file.
///
/// Every failure is wrapped with the file path, so callers can report which
/// file and which record was bad.
pub fn load_snapshot_file(path: &Path) -> Result<Snapshot> {
    let input = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(NemoError::PathNotFound(path.to_path_buf()))
        }
        Err(error) => return Err(NemoError::Io(error).in_snapshot(path)),
    };

    let lines = BufReader::new(input)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|error| NemoError::Io(error).in_snapshot(path))?;

    let snapshot = decode(&lines).map_err(|error| error.in_snapshot(path))?;

    log::debug!(
        "loaded snapshot '{}' from {} ({} entries)",
        snapshot.name(),
        path.display(),
        snapshot.entry_count()
    );

    Ok(snapshot)
}
