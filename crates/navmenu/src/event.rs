use std::fmt;

pub const SUCCESS_MESSAGE: &str = "event success";
pub const MISSING_MESSAGE: &str = "event ignored, as an event listener is missing";
pub const INVALID_MESSAGE: &str = "event failed, as null or illegal event provided";
pub const ERROR_MESSAGE: &str = "event failed, as an error occurred";

/// The phases a menu node can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PreRender,
    Render,
    PostRender,
    Select,
    Execute,
    OnClose,
}

impl EventKind {
    pub fn all() -> [EventKind; 6] {
        [
            EventKind::PreRender,
            EventKind::Render,
            EventKind::PostRender,
            EventKind::Select,
            EventKind::Execute,
            EventKind::OnClose,
        ]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::PreRender => "PRE_RENDER",
            EventKind::Render => "RENDER",
            EventKind::PostRender => "POST_RENDER",
            EventKind::Select => "SELECT",
            EventKind::Execute => "EXECUTE",
            EventKind::OnClose => "ON_CLOSE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    kind: Option<EventKind>,
    command: Option<String>,
    args: Vec<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind: Some(kind),
            command: None,
            args: Vec::new(),
        }
    }

    /// An event carrying the command token the user typed and any trailing arguments.
    pub fn with_command(kind: EventKind, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: Some(kind),
            command: Some(command.into()),
            args,
        }
    }

    /// An event without a kind. Nodes reject it as invalid.
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Outcome of handing an [`Event`] to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventResult {
    message: String,
    has_error: bool,
}

impl EventResult {
    pub fn new(message: impl Into<String>, has_error: bool) -> Self {
        Self {
            message: message.into(),
            has_error,
        }
    }

    pub fn success() -> Self {
        Self::new(SUCCESS_MESSAGE, false)
    }

    pub fn missing(kind: EventKind) -> Self {
        Self::new(format!("{MISSING_MESSAGE}: for {kind}"), false)
    }

    pub fn invalid() -> Self {
        Self::new(INVALID_MESSAGE, true)
    }

    pub fn failed(err: &anyhow::Error) -> Self {
        Self::new(format!("{ERROR_MESSAGE}: {err:#}"), true)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// True when the event completed without a listener being registered for it.
    pub fn is_missing_listener(&self) -> bool {
        !self.has_error && self.message.starts_with(MISSING_MESSAGE)
    }
}

impl fmt::Display for EventResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
