//! Directory selection flow for the server configs setting

use crate::{ConfigError, UserConfigs};
use std::path::PathBuf;

pub const SELECT_DIR_TITLE: &str = "Please set Onvif Server configs directory";

/// A blocking, modal "choose a directory" prompt.
pub trait DirectoryPrompt {
    /// Returns `None` when the user dismisses the prompt without choosing.
    fn pick_directory(&mut self, title: &str) -> Option<PathBuf>;
}

impl UserConfigs {
    /// Keep asking until a non-empty directory is chosen.
    ///
    /// There is no way out of this loop other than choosing a directory.
    pub fn select_directory<P: DirectoryPrompt + ?Sized>(&mut self, prompt: &mut P) {
        while !self.has_server_configs_dir() {
            match prompt.pick_directory(SELECT_DIR_TITLE) {
                Some(dir) => self.set_server_configs_dir(dir.to_string_lossy()),
                None => tracing::warn!("No server configs directory chosen, asking again"),
            }
        }
        tracing::info!("Server configs directory: {}", self.server_configs_dir());
    }

    /// Ask once for a new directory. Dismissing the prompt keeps the current
    /// value. Returns whether the value changed.
    pub fn browse_directory<P: DirectoryPrompt + ?Sized>(&mut self, prompt: &mut P) -> bool {
        let Some(dir) = prompt.pick_directory(SELECT_DIR_TITLE) else {
            return false;
        };
        let dir = dir.to_string_lossy();
        if dir.is_empty() || dir == self.server_configs_dir() {
            return false;
        }
        self.set_server_configs_dir(dir);
        true
    }

    /// Prompt for and persist the directory when none is configured yet.
    /// Returns whether the prompt was shown.
    pub async fn ensure_server_configs_dir<P: DirectoryPrompt + ?Sized>(
        &mut self,
        prompt: &mut P,
    ) -> Result<bool, ConfigError> {
        if self.has_server_configs_dir() {
            return Ok(false);
        }
        self.select_directory(prompt);
        self.save().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::APP_CONFIG_FILENAME;
    use std::collections::VecDeque;
    use tempfile::tempdir;

    struct ScriptedPrompt {
        answers: VecDeque<Option<PathBuf>>,
        calls: usize,
    }

    impl ScriptedPrompt {
        fn new(answers: Vec<Option<&str>>) -> Self {
            Self {
                answers: answers.into_iter().map(|a| a.map(PathBuf::from)).collect(),
                calls: 0,
            }
        }
    }

    impl DirectoryPrompt for ScriptedPrompt {
        fn pick_directory(&mut self, title: &str) -> Option<PathBuf> {
            assert_eq!(title, SELECT_DIR_TITLE);
            self.calls += 1;
            self.answers.pop_front().expect("prompt called more often than scripted")
        }
    }

    #[test]
    fn test_select_directory_asks_again_after_cancel() {
        let mut configs = UserConfigs::with_path("unused.ini");
        let mut prompt = ScriptedPrompt::new(vec![None, Some(""), Some("/srv/configs")]);

        configs.select_directory(&mut prompt);

        assert_eq!(prompt.calls, 3);
        assert_eq!(configs.server_configs_dir(), "/srv/configs");
    }

    #[test]
    fn test_select_directory_skips_prompt_when_set() {
        let mut configs = UserConfigs::with_path("unused.ini");
        configs.set_server_configs_dir("/already/set");
        let mut prompt = ScriptedPrompt::new(vec![]);

        configs.select_directory(&mut prompt);

        assert_eq!(prompt.calls, 0);
        assert_eq!(configs.server_configs_dir(), "/already/set");
    }

    #[test]
    fn test_browse_directory_keeps_value_on_cancel() {
        let mut configs = UserConfigs::with_path("unused.ini");
        configs.set_server_configs_dir("/old");

        assert!(!configs.browse_directory(&mut ScriptedPrompt::new(vec![None])));
        assert_eq!(configs.server_configs_dir(), "/old");

        assert!(!configs.browse_directory(&mut ScriptedPrompt::new(vec![Some("/old")])));

        assert!(configs.browse_directory(&mut ScriptedPrompt::new(vec![Some("/new")])));
        assert_eq!(configs.server_configs_dir(), "/new");
    }

    #[tokio::test]
    async fn test_empty_value_triggers_prompt_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);

        let mut configs = UserConfigs::with_path(&path);
        configs.load().await.unwrap();
        let mut prompt = ScriptedPrompt::new(vec![Some("/srv/configs")]);

        let prompted = configs.ensure_server_configs_dir(&mut prompt).await.unwrap();

        assert!(prompted);
        assert_eq!(prompt.calls, 1);

        let mut reloaded = UserConfigs::with_path(&path);
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.server_configs_dir(), "/srv/configs");
    }

    #[tokio::test]
    async fn test_stored_value_does_not_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_CONFIG_FILENAME);
        std::fs::write(&path, "[OnvifServerEmulator]\nserverConfigs = /srv/configs\n").unwrap();

        let mut configs = UserConfigs::with_path(&path);
        configs.load().await.unwrap();
        let mut prompt = ScriptedPrompt::new(vec![]);

        let prompted = configs.ensure_server_configs_dir(&mut prompt).await.unwrap();

        assert!(!prompted);
        assert_eq!(prompt.calls, 0);
    }
}
