pub const NAVMENU_CONFIG_RELATIVE_PATH: &str = ".config/navmenu.toml";
pub const DEFAULT_LOG_FILE_NAME: &str = "navmenu.log";

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ESCAPE_COMMANDS: [&str; 3] = ["exit", "close", "quit"];
pub const QUIT_SHORTCUT: &str = "q";
pub const BACK_COMMANDS: [&str; 3] = ["back", "previous", "prev"];
pub const HELP_COMMANDS: [&str; 1] = ["help"];

/// Options offered to the resolver while asking a yes/no question.
pub const CONFIRM_OPTIONS: [&str; 4] = ["n", "y", "no", "yes"];

pub const INPUT_INVALID_MESSAGE: &str = "input invalid";
pub const INPUT_NULL_MESSAGE: &str = "input unexpected, received nothing";

pub const CONFIRM_EXIT_MESSAGE: &str = "Closing the program, are you sure? (yes/no)";
pub const CONFIRM_SAVE_ON_EXIT_MESSAGE: &str =
    "Closing with changes, do you want to save your changes? (yes/no)";
pub const CONFIRM_SAVE_ON_BACK_MESSAGE: &str =
    "Leaving with changes, do you want to save your changes? (yes/no)";
