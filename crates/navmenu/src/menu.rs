use {
    crate::{
        error::{NavError, NavResult},
        event::{Event, EventKind, EventResult},
        misc::helpers::capitalize_word,
        navigation::NavContext,
        resolver::whole_line,
    },
    log::{debug, warn},
    regex::Regex,
    std::{
        cell::{Cell, RefCell},
        collections::HashMap,
        fmt,
        rc::Rc,
    },
};

pub type MenuRef = Rc<MenuNode>;

/// A registered reaction to one [`EventKind`].
pub type Listener = Rc<dyn Fn(&Event, &mut ListenerCtx<'_>) -> anyhow::Result<()>>;

/// What a listener gets to work with while it runs: the node that received the event and the
/// navigation context of the session.
pub struct ListenerCtx<'a> {
    node: &'a MenuRef,
    nav: &'a mut NavContext,
}

impl<'a> ListenerCtx<'a> {
    pub fn new(node: &'a MenuRef, nav: &'a mut NavContext) -> Self {
        Self { node, nav }
    }

    pub fn node(&self) -> &MenuRef {
        self.node
    }

    pub fn nav(&mut self) -> &mut NavContext {
        self.nav
    }

    /// Makes the receiving node the active menu.
    pub fn open_self(&mut self) -> NavResult<()> {
        self.nav.push(Rc::clone(self.node))
    }

    pub fn open(&mut self, node: &MenuRef) -> NavResult<()> {
        self.nav.push(Rc::clone(node))
    }

    pub fn back(&mut self) -> Option<MenuRef> {
        self.nav.pop()
    }
}

/// A named point in the menu tree.
///
/// Nodes are shared (`Rc`) between their parent and the navigation stack, so everything a
/// listener may want to change while the node is active sits behind a `Cell`/`RefCell`.
/// The name is fixed at construction.
pub struct MenuNode {
    name: String,
    key: String,
    lists_children: bool,
    display_text: RefCell<Option<String>>,
    hidden: Cell<bool>,
    disabled: Cell<bool>,
    unsaved_changes: Cell<bool>,
    command_pattern: RefCell<Option<Regex>>,
    children: RefCell<Vec<MenuRef>>,
    listeners: RefCell<HashMap<EventKind, Listener>>,
}

impl MenuNode {
    fn build(name: &str, lists_children: bool) -> NavResult<MenuRef> {
        if name.trim().is_empty() {
            return Err(NavError::EmptyName);
        }
        Ok(Rc::new(Self {
            name: name.to_string(),
            key: name.to_lowercase(),
            lists_children,
            display_text: RefCell::new(None),
            hidden: Cell::new(false),
            disabled: Cell::new(false),
            unsaved_changes: Cell::new(false),
            command_pattern: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(HashMap::new()),
        }))
    }

    /// A plain node. Its display text is its name until one is set.
    pub fn new(name: &str) -> NavResult<MenuRef> {
        Self::build(name, false)
    }

    /// A node whose display is the numbered list of its visible children, optionally headed by
    /// its display text.
    pub fn listing(name: &str) -> NavResult<MenuRef> {
        Self::build(name, true)
    }

    pub fn with_display_text(name: &str, text: &str) -> NavResult<MenuRef> {
        let node = Self::new(name)?;
        node.set_display_text(text);
        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lists_children(&self) -> bool {
        self.lists_children
    }

    pub fn display_text(&self) -> String {
        let text = self.display_text.borrow().clone();
        if self.lists_children {
            let options = self.render_options();
            return match text {
                Some(header) if options.is_empty() => header,
                Some(header) => format!("{header}\n{options}"),
                None => options,
            };
        }
        text.unwrap_or_else(|| self.name.clone())
    }

    pub fn set_display_text(&self, text: impl Into<String>) {
        *self.display_text.borrow_mut() = Some(text.into());
    }

    pub fn clear_display_text(&self) {
        *self.display_text.borrow_mut() = None;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    pub fn toggle_hidden(&self) {
        self.hidden.set(!self.hidden.get());
    }

    /// A node is disabled when flagged so, or when it has nothing to react with.
    pub fn is_disabled(&self) -> bool {
        self.disabled.get() || self.listeners.borrow().is_empty()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn toggle_disabled(&self) {
        self.disabled.set(!self.disabled.get());
    }

    /// Whether leaving this node should offer to dispatch `ON_CLOSE` first.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes.get()
    }

    pub fn set_unsaved_changes(&self, unsaved: bool) {
        self.unsaved_changes.set(unsaved);
    }

    /// Turns this node into a command menu: while it is active, lines matching `pattern` in
    /// full are sent to it as `EXECUTE` events, and options are chosen by name only.
    pub fn set_command_pattern(&self, pattern: &str) -> NavResult<()> {
        *self.command_pattern.borrow_mut() = Some(whole_line(pattern)?);
        Ok(())
    }

    pub fn clear_command_pattern(&self) {
        *self.command_pattern.borrow_mut() = None;
    }

    pub fn command_pattern(&self) -> Option<Regex> {
        self.command_pattern.borrow().clone()
    }

    // Children

    /// Registers `child` under its lowercased name. A child with the same name is replaced
    /// in place, keeping its position.
    pub fn add_child(&self, child: MenuRef) {
        let mut children = self.children.borrow_mut();
        match children.iter().position(|c| c.key == child.key) {
            Some(slot) => {
                debug!("menu '{}': replacing child '{}'", self.name, child.name);
                children[slot] = child;
            }
            None => children.push(child),
        }
    }

    pub fn add_children(&self, children: impl IntoIterator<Item = MenuRef>) {
        for child in children {
            self.add_child(child);
        }
    }

    pub fn remove_child(&self, name: &str) -> Option<MenuRef> {
        let key = name.to_lowercase();
        let mut children = self.children.borrow_mut();
        let slot = children.iter().position(|c| c.key == key)?;
        Some(children.remove(slot))
    }

    /// Case-insensitive lookup by name.
    pub fn child(&self, name: &str) -> Option<MenuRef> {
        let key = name.to_lowercase();
        self.children
            .borrow()
            .iter()
            .find(|c| c.key == key)
            .cloned()
    }

    /// Lookup by position in insertion order, hidden children included.
    pub fn child_at(&self, index: usize) -> Option<MenuRef> {
        self.children.borrow().get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn children(&self) -> Vec<MenuRef> {
        self.children.borrow().clone()
    }

    pub fn visible_children(&self) -> Vec<MenuRef> {
        self.children
            .borrow()
            .iter()
            .filter(|c| !c.is_hidden())
            .cloned()
            .collect()
    }

    /// Names of the visible children in order, as offered to the input resolver.
    pub fn visible_option_names(&self) -> Vec<String> {
        self.children
            .borrow()
            .iter()
            .filter(|c| !c.is_hidden())
            .map(|c| c.name.clone())
            .collect()
    }

    /// `1. Resume`, `2. Start`, ... one visible child per line.
    pub fn render_options(&self) -> String {
        self.visible_option_names()
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {}", i + 1, capitalize_word(name)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Events

    /// Sets the listener for `kind`, replacing any previous one.
    pub fn add_event_listener<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Event, &mut ListenerCtx<'_>) -> anyhow::Result<()> + 'static,
    {
        self.listeners.borrow_mut().insert(kind, Rc::new(listener));
    }

    pub fn remove_event_listener(&self, kind: EventKind) -> bool {
        self.listeners.borrow_mut().remove(&kind).is_some()
    }

    pub fn has_listener(&self, kind: EventKind) -> bool {
        self.listeners.borrow().contains_key(&kind)
    }

    fn listener(&self, kind: EventKind) -> Option<Listener> {
        self.listeners.borrow().get(&kind).cloned()
    }

    /// Hands `event` to the listener registered for its kind.
    ///
    /// A missing listener is not an error. A listener error is turned into an error result;
    /// whatever the listener changed before failing stays changed.
    pub fn receive_event(self: &Rc<Self>, event: &Event, nav: &mut NavContext) -> EventResult {
        let Some(kind) = event.kind() else {
            return EventResult::invalid();
        };
        let Some(listener) = self.listener(kind) else {
            debug!("menu '{}': no listener for {kind}", self.name);
            return EventResult::missing(kind);
        };

        debug!("menu '{}': dispatching {kind}", self.name);
        let mut ctx = ListenerCtx::new(self, nav);
        match listener(event, &mut ctx) {
            Ok(()) => EventResult::success(),
            Err(err) => {
                warn!("menu '{}': {kind} listener failed: {err:#}", self.name);
                EventResult::failed(&err)
            }
        }
    }
}

impl fmt::Debug for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self
            .children
            .borrow()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        let listeners: Vec<EventKind> = self.listeners.borrow().keys().copied().collect();
        f.debug_struct("MenuNode")
            .field("name", &self.name)
            .field("hidden", &self.hidden.get())
            .field("disabled", &self.disabled.get())
            .field("unsaved_changes", &self.unsaved_changes.get())
            .field(
                "command_pattern",
                &self.command_pattern.borrow().as_ref().map(Regex::as_str),
            )
            .field("children", &children)
            .field("listeners", &listeners)
            .finish()
    }
}

impl fmt::Display for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
