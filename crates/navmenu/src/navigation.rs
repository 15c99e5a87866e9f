use {
    crate::{
        error::{NavError, NavResult},
        menu::MenuRef,
    },
    log::debug,
    std::rc::Rc,
};

/// Tracks the active menu as a stack of nodes.
///
/// Navigation flow:
/// - `set_default()` names the menu shown whenever the stack is empty
/// - `current()` returns the active menu for rendering and prompting
/// - `push()` opens a menu (a no-op if it is already active)
/// - `pop()` goes back, falling back to the default menu
///
/// Every change of the active menu raises a dirty flag that the run loop reads with
/// `consume_dirty()`.
#[derive(Debug, Default)]
pub struct NavContext {
    stack: Vec<MenuRef>,
    default_node: Option<MenuRef>,
    max_depth: Option<usize>,
    dirty: bool,
}

impl NavContext {
    /// Creates an empty navigation context with no default menu.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(node: MenuRef) -> Self {
        Self {
            default_node: Some(node),
            ..Self::default()
        }
    }

    /// Limits how many menus can be stacked on top of the default one.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the menu on top of the stack, or the default menu when the stack is empty.
    pub fn current(&self) -> Option<MenuRef> {
        self.stack.last().or(self.default_node.as_ref()).cloned()
    }

    /// Opens `node`. Pushing the menu that is already active changes nothing.
    pub fn push(&mut self, node: MenuRef) -> NavResult<()> {
        if self.current().is_some_and(|active| Rc::ptr_eq(&active, &node)) {
            return Ok(());
        }
        if let Some(max) = self.max_depth {
            if self.stack.len() >= max {
                return Err(NavError::DepthExceeded(max));
            }
        }

        debug!("navigation: push '{}'", node.name());
        self.stack.push(node);
        self.dirty = true;
        Ok(())
    }

    /// Navigates back to the previous menu and returns the one that was removed.
    ///
    /// Returns `None` when the stack was already empty; the default menu stays active. The
    /// dirty flag is raised either way.
    pub fn pop(&mut self) -> Option<MenuRef> {
        self.dirty = true;
        let popped = self.stack.pop();
        if let Some(node) = &popped {
            debug!("navigation: pop '{}'", node.name());
        }
        popped
    }

    pub fn default_node(&self) -> Option<MenuRef> {
        self.default_node.clone()
    }

    pub fn set_default(&mut self, node: Option<MenuRef>) {
        self.default_node = node;
    }

    /// Returns whether the active menu changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// True when nothing is stacked on top of the default menu, i.e. `pop()` cannot go back
    /// any further.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if the active menu is nested within another stacked menu.
    pub fn is_nested(&self) -> bool {
        self.stack.len() >= 2
    }

    /// Clears the stack and the dirty flag, keeping the default menu.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.dirty = false;
    }

    /// Drops all stacked menus so the default one becomes active.
    pub fn reset_to_default(&mut self) {
        if !self.stack.is_empty() {
            self.stack.clear();
            self.dirty = true;
        }
    }
}
