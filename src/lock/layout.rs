use std::path::{Path, PathBuf};

use crate::state::state_file_path;

/// Directory holding data awaiting ingestion
pub const INBOUND_DIR: &str = "in";
/// Directory downstream ingestion waits on
pub const LOCKED_DIR: &str = "locked";

/// Fixed paths under an administered root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLayout {
    root: PathBuf,
    inbound: PathBuf,
    locked: PathBuf,
    state_file: PathBuf,
}

impl RootLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            inbound: root.join(INBOUND_DIR),
            locked: root.join(LOCKED_DIR),
            state_file: state_file_path(&root),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn inbound(&self) -> &Path {
        &self.inbound
    }

    pub fn locked(&self) -> &Path {
        &self.locked
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }
}
