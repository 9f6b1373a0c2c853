use std::path::{Path, PathBuf};

use desk_config::PROJECT_DIR_NAME;

/// Walk upwards from `start` until a `.shopdesk` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_DIR_NAME).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
