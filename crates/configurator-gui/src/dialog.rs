use configurator_core::DirectoryPrompt;
use std::path::{Path, PathBuf};

/// Native folder picker. Blocks the calling (UI) thread until closed.
pub struct NativeDirectoryPrompt {
    start_dir: Option<PathBuf>,
}

impl NativeDirectoryPrompt {
    /// Open in `current` if it is an existing directory, else in the home directory.
    pub fn starting_at(current: &str) -> Self {
        let current = Path::new(current);
        let start_dir = if !current.as_os_str().is_empty() && current.is_dir() {
            Some(current.to_path_buf())
        } else {
            dirs::home_dir()
        };
        Self { start_dir }
    }
}

impl DirectoryPrompt for NativeDirectoryPrompt {
    fn pick_directory(&mut self, title: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title(title);
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_folder()
    }
}
