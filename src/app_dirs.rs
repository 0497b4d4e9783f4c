use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// History database under $HOME/.local/state/repset
    pub fn history_db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("history.db"))
    }

    /// In-progress session snapshot, next to the history db
    pub fn snapshot_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("session.json"))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("repset"),
            )
        } else {
            ProjectDirs::from("", "", "repset")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
