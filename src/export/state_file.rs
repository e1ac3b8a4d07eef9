//! Atomic state-file persistence

use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::models::SyncState;

/// Write `state` to `path` via a temp file in the same directory and a
/// rename, so readers never see a half-written file.
pub fn persist_state<P: AsRef<Path>>(path: P, state: &SyncState) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Ensure parent directory exists
    std::fs::create_dir_all(dir)?;

    let file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file());
        serde_json::to_writer_pretty(&mut writer, state)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stream;
    use tempfile::TempDir;

    #[test]
    fn test_persist_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut state = SyncState::default();
        persist_state(&path, &state).unwrap();

        state.advance(Stream::Activities, "2022-02-02T00:00:00Z").unwrap();
        persist_state(&path, &state).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded = SyncState::from_json(&content, "2000-01-01T00:00:00Z").unwrap();
        assert_eq!(reloaded, state);

        // Only the state file remains; the temp file was renamed into place
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
