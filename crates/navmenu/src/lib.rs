//! Interactive, text-driven menu navigation.
//!
//! A tree of [`MenuNode`]s is shown one level at a time. Each line the user types is resolved
//! against the visible options of the active menu by the [`InputResolver`]; the [`Runner`]
//! dispatches the resulting event to the chosen node, whose listeners move the
//! [`NavContext`] around.

pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod event;
pub mod menu;
pub mod misc;
pub mod navigation;
pub mod resolver;
pub mod runner;

pub use {
    config::NavConfig,
    console::{ConsoleReader, ConsoleWriter},
    error::{NavError, NavResult},
    event::{Event, EventKind, EventResult},
    menu::{ListenerCtx, MenuNode, MenuRef},
    navigation::NavContext,
    resolver::{
        InputResolver, ParsedInput, ReservedCommand, ReservedCommands, Resolution, whole_line,
    },
    runner::{CycleFlow, Runner},
};
