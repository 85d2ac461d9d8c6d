//! On-disk artifact storage for one destination directory.
//!
//! Artifacts are written to a temporary file in the destination directory and
//! renamed into place, so a reader sees either no file or a complete one.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use mailtpl_config::ConfigError;
use tempfile::NamedTempFile;

use crate::error::CompileError;
use crate::naming::ArtifactName;

/// Store rooted at a single, validated destination directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Opens a store at `dir`, creating the directory if it is missing.
    ///
    /// A relative `dir` is made absolute against the working directory but is
    /// otherwise used as given. An existing non-directory is a configuration
    /// error.
    pub fn open(dir: &Path) -> Result<Self, CompileError> {
        let dir = std::path::absolute(dir).map_err(|e| write_error(dir, e))?;
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    /// The destination directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for an artifact name.
    pub fn artifact_path(&self, name: &ArtifactName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Returns `true` if the artifact already exists as a regular file.
    pub fn contains(&self, name: &ArtifactName) -> bool {
        self.artifact_path(name).is_file()
    }

    /// Writes `data` as the artifact for `name` and returns its path.
    pub fn write_atomic(&self, name: &ArtifactName, data: &[u8]) -> Result<PathBuf, CompileError> {
        let path = self.artifact_path(name);

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| write_error(&self.dir, e))?;
        tmp.write_all(data).map_err(|e| write_error(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| write_error(tmp.path(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(|e| write_error(tmp.path(), e))?;
        }

        // On failure the temp file is dropped and removed.
        tmp.persist(&path).map_err(|e| write_error(&path, e.error))?;
        Ok(path)
    }

    /// Removes expired artifacts of the same source, keeping `keep`.
    ///
    /// Only siblings last written before `source_modified` are removed; one
    /// written after the source last changed may still be in use by a caller
    /// that read it mid-update. Returns the number of files removed. Files
    /// deleted concurrently by another caller are not counted and are not an
    /// error.
    pub fn prune(
        &self,
        keep: &ArtifactName,
        source_modified: SystemTime,
    ) -> Result<usize, CompileError> {
        let keep_name = keep.file_name();
        let mut removed = 0;

        let entries = std::fs::read_dir(&self.dir).map_err(|e| write_error(&self.dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| write_error(&self.dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name == keep_name || !keep.is_sibling(file_name) {
                continue;
            }
            let written = entry.metadata().and_then(|m| m.modified());
            if !matches!(written, Ok(t) if t < source_modified) {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(write_error(&entry.path(), e)),
            }
        }

        Ok(removed)
    }

    /// Lists compiled artifacts in the directory, sorted by path.
    pub fn list(&self) -> Result<Vec<PathBuf>, CompileError> {
        let mut artifacts = Vec::new();
        let entries = std::fs::read_dir(&self.dir).map_err(|e| write_error(&self.dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| write_error(&self.dir, e))?.path();
            let is_artifact = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("template_"));
            if is_artifact && path.is_file() {
                artifacts.push(path);
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }
}

/// Creates `dir` if needed. An existing directory, including one created
/// concurrently, counts as success.
fn ensure_dir(dir: &Path) -> Result<(), CompileError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::NotADirectory {
            path: dir.to_path_buf(),
        }
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(dir).map_err(|e| write_error(dir, e))
        }
        Err(e) => Err(write_error(dir, e)),
    }
}

fn write_error(path: &Path, source: std::io::Error) -> CompileError {
    CompileError::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailtpl_config::CompileOptions;
    use std::time::Duration;

    fn make_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn name(content: &[u8]) -> ArtifactName {
        named("/app/mails/welcome.html.php", content)
    }

    fn named(path: &str, content: &[u8]) -> ArtifactName {
        ArtifactName::for_source(Path::new(path), "identity/1", &CompileOptions::new(), content)
    }

    fn backdate(path: &Path, secs: u64) {
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn open_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("tmp").join("cache").join("mails");
        let store = ArtifactStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested);
    }

    #[test]
    fn open_existing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::open(dir.path()).unwrap();
        ArtifactStore::open(dir.path()).unwrap();
    }

    #[test]
    fn open_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, "x").unwrap();
        let err = ArtifactStore::open(&file).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Config(ConfigError::NotADirectory { .. })
        ));
    }

    #[test]
    fn write_then_contains() {
        let (_dir, store) = make_store();
        let n = name(b"body");
        assert!(!store.contains(&n));
        let path = store.write_atomic(&n, b"body").unwrap();
        assert!(store.contains(&n));
        assert_eq!(std::fs::read(&path).unwrap(), b"body");
        assert!(path.starts_with(store.dir()));
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (dir, store) = make_store();
        store.write_atomic(&name(b"a"), b"a").unwrap();
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn overwrite_replaces_contents() {
        let (_dir, store) = make_store();
        let n = name(b"a");
        store.write_atomic(&n, b"first").unwrap();
        let path = store.write_atomic(&n, b"second").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[cfg(unix)]
    #[test]
    fn artifact_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = make_store();
        let path = store.write_atomic(&name(b"p"), b"p").unwrap();
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o644, 0o644);
    }

    #[test]
    fn prune_removes_only_siblings() {
        let (dir, store) = make_store();
        let old = name(b"v1");
        let new = name(b"v2");
        let unrelated = named("/app/mails/other.php", b"v1");
        let old_path = store.write_atomic(&old, b"v1").unwrap();
        store.write_atomic(&new, b"v2").unwrap();
        let unrelated_path = store.write_atomic(&unrelated, b"v1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        backdate(&old_path, 1_000_000);
        backdate(&unrelated_path, 1_000_000);

        assert_eq!(store.prune(&new, SystemTime::now()).unwrap(), 1);
        assert!(!store.contains(&old));
        assert!(store.contains(&new));
        assert!(store.contains(&unrelated));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn prune_with_nothing_stale() {
        let (_dir, store) = make_store();
        let n = name(b"only");
        store.write_atomic(&n, b"only").unwrap();
        assert_eq!(store.prune(&n, SystemTime::now()).unwrap(), 0);
    }

    #[test]
    fn prune_keeps_siblings_newer_than_source() {
        let (_dir, store) = make_store();
        let old = name(b"v1");
        let new = name(b"v2");
        let old_path = store.write_atomic(&old, b"v1").unwrap();
        store.write_atomic(&new, b"v2").unwrap();
        backdate(&old_path, 2_000_000);

        let source_modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        assert_eq!(store.prune(&new, source_modified).unwrap(), 0);
        assert!(store.contains(&old));
    }

    #[test]
    fn prune_spares_other_transforms() {
        let (_dir, store) = make_store();
        let opts = CompileOptions::new();
        let source = Path::new("/app/mails/welcome.html.php");
        let plain = ArtifactName::for_source(source, "identity/1", &opts, b"v1");
        let upper = ArtifactName::for_source(source, "upper/1", &opts, b"v1");
        let plain_path = store.write_atomic(&plain, b"v1").unwrap();
        store.write_atomic(&upper, b"V1").unwrap();
        backdate(&plain_path, 1_000_000);

        assert_eq!(store.prune(&upper, SystemTime::now()).unwrap(), 0);
        assert!(store.contains(&plain));
    }

    #[test]
    fn list_is_sorted_artifacts_only() {
        let (dir, store) = make_store();
        store.write_atomic(&name(b"1"), b"1").unwrap();
        store
            .write_atomic(
                &named("/a/b.php", b"2"),
                b"2",
            )
            .unwrap();
        std::fs::write(dir.path().join("README"), "x").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
    }
}
