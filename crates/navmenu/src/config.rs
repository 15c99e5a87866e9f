use {
    crate::{
        constants::{
            DEFAULT_LOG_FILE_NAME, DEFAULT_LOG_LEVEL, DEFAULT_PROMPT, NAVMENU_CONFIG_RELATIVE_PATH,
        },
        error::NavError,
        misc::helpers::expand_tilde,
    },
    log::LevelFilter,
    serde::{Deserialize, Serialize},
    std::{
        env, fs,
        path::{Path, PathBuf},
    },
};

pub fn navmenu_config_path() -> Result<PathBuf, NavError> {
    let mut path = dirs::home_dir().ok_or(NavError::HomeDirectoryNotFound)?;
    path.push(NAVMENU_CONFIG_RELATIVE_PATH);
    Ok(path)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct NavConfig {
    /// Written before every read.
    pub prompt: String,
    /// Accept `q` as an exit command.
    pub quit_shortcut: bool,
    /// Maximum number of menus stacked above the main menu.
    pub max_depth: Option<usize>,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            quit_shortcut: false,
            max_depth: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl NavConfig {
    /// Loads `~/.config/navmenu.toml`, or the defaults when there is no such file.
    pub fn load() -> Result<NavConfig, NavError> {
        let path = navmenu_config_path()?;
        if !path.exists() {
            return Ok(NavConfig::default());
        }
        Self::load_from(path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<NavConfig, NavError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NavError::ConfigPathDoesNotExist(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        let config: NavConfig = toml::from_str(&data)?;
        Ok(config)
    }

    /// Unknown level names fall back to `info`.
    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn log_file_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => expand_tilde(path),
            None => env::temp_dir().join(DEFAULT_LOG_FILE_NAME),
        }
    }
}
