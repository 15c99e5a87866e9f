use {std::path::PathBuf, thiserror::Error};

pub type NavResult<T> = Result<T, NavError>;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("reader closed")]
    ReaderClosed,
    #[error("writer closed")]
    WriterClosed,
    #[error("no active menu: the navigation stack is empty and no default menu is set")]
    NoActiveNode,
    #[error("menu name cannot be empty")]
    EmptyName,
    #[error("navigation stack exceeded the maximum depth of {0}")]
    DepthExceeded(usize),
    #[error("invalid command pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("navmenu config path doesnt exist: {}", .0.display())]
    ConfigPathDoesNotExist(PathBuf),
    #[error("Could not determine home directory. Please set the HOME environment variable.")]
    HomeDirectoryNotFound,
    #[error("Io error")]
    IoError(#[from] std::io::Error),
    #[error("Toml Parse error")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Anyhow err")]
    Anyhow(#[from] anyhow::Error),
}
