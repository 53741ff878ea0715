//! Test fixtures for administered roots
//!
//! A `RootFixture` is a throwaway root directory with helpers to seed `in/`,
//! `locked/` and state records, and to snapshot the whole tree so tests can
//! assert that a refused operation mutated nothing.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ingest_admin::state::{JsonStateStore, RecordError, StateRecord, StateStore, TransitionStatus};

pub struct RootFixture {
    temp_dir: TempDir,
}

impl RootFixture {
    /// Empty root
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp root"),
        }
    }

    /// Root whose `in/` holds the given relative files
    pub fn with_inbound(files: &[(&str, &str)]) -> Self {
        let fixture = Self::new();
        fixture.populate("in", files);
        fixture
    }

    /// Root that looks like a crash right after the rename: `locked/` only
    pub fn with_locked(files: &[(&str, &str)]) -> Self {
        let fixture = Self::new();
        fixture.populate("locked", files);
        fixture
    }

    pub fn populate(&self, dir: &str, files: &[(&str, &str)]) {
        let base = self.root().join(dir);
        fs::create_dir_all(&base).expect("create data dir");
        for (name, contents) in files {
            let path = base.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create nested dir");
            }
            fs::write(path, contents).expect("write data file");
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn inbound(&self) -> PathBuf {
        self.root().join("in")
    }

    pub fn locked(&self) -> PathBuf {
        self.root().join("locked")
    }

    pub fn state_file(&self) -> PathBuf {
        self.root().join("ingest.state.json")
    }

    /// Persist a record with `status` as a previous run would have
    pub fn seed_state(&self, status: TransitionStatus) -> StateRecord {
        let pending = StateRecord::pending(self.root(), None);
        let record = match status {
            TransitionStatus::Pending => pending,
            TransitionStatus::Locked => pending.into_locked(),
            TransitionStatus::Failed => pending.into_failed(RecordError {
                kind: "permission_denied".to_string(),
                message: "Permission denied (os error 13)".to_string(),
            }),
        };
        JsonStateStore::new()
            .save(self.root(), &record)
            .expect("seed state record");
        record
    }

    pub fn read_state(&self) -> serde_json::Value {
        let contents = fs::read_to_string(self.state_file()).expect("read state file");
        serde_json::from_str(&contents).expect("parse state file")
    }

    pub fn state_status(&self) -> String {
        self.read_state()["status"]
            .as_str()
            .expect("status field")
            .to_string()
    }

    /// Relative path -> contents of every file under `dir`
    pub fn files_under(&self, dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect_files(dir, dir, false, &mut files);
        files
    }

    /// Every file and directory under the root, state file included
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut entries = BTreeMap::new();
        collect_files(self.root(), self.root(), true, &mut entries);
        entries
    }
}

fn collect_files(
    base: &Path,
    dir: &Path,
    include_dirs: bool,
    files: &mut BTreeMap<PathBuf, Vec<u8>>,
) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.expect("read dir entry").path();
        if path.is_dir() {
            if include_dirs {
                files.insert(path.strip_prefix(base).unwrap().to_path_buf(), Vec::new());
            }
            collect_files(base, &path, include_dirs, files);
        } else {
            let contents = fs::read(&path).expect("read file");
            files.insert(path.strip_prefix(base).unwrap().to_path_buf(), contents);
        }
    }
}

pub fn expected_files(files: &[(&str, &str)]) -> BTreeMap<PathBuf, Vec<u8>> {
    files
        .iter()
        .map(|(name, contents)| (PathBuf::from(name), contents.as_bytes().to_vec()))
        .collect()
}
