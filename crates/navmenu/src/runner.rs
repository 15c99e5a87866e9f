use {
    crate::{
        console::ConsoleWriter,
        constants::{
            CONFIRM_EXIT_MESSAGE, CONFIRM_SAVE_ON_BACK_MESSAGE, CONFIRM_SAVE_ON_EXIT_MESSAGE,
        },
        error::{NavError, NavResult},
        event::{Event, EventKind, EventResult},
        menu::MenuRef,
        navigation::NavContext,
        resolver::{InputResolver, ParsedInput, ReservedCommand, Resolution},
    },
    log::{debug, error, info, warn},
    std::io::{self, BufRead, Stderr, Write},
};

/// What a single interaction cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleFlow {
    /// The same menu stays active.
    Processed,
    /// The navigation context changed; a `back` at the main menu counts too.
    Navigated,
    /// The user confirmed leaving.
    Exit,
}

/// Drives the render / read / dispatch cycle over one navigation context.
///
/// Listener failures go to the error sink and the session carries on. A cycle that cannot
/// find an active menu ends the session.
pub struct Runner<R, W: Write, E: Write = Stderr> {
    nav: NavContext,
    resolver: InputResolver<R>,
    writer: ConsoleWriter<W>,
    errors: E,
}

impl<R: BufRead, W: Write> Runner<R, W, Stderr> {
    /// A runner reporting errors on stderr.
    pub fn new(nav: NavContext, resolver: InputResolver<R>, writer: ConsoleWriter<W>) -> Self {
        Self::with_error_sink(nav, resolver, writer, io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> Runner<R, W, E> {
    pub fn with_error_sink(
        nav: NavContext,
        resolver: InputResolver<R>,
        writer: ConsoleWriter<W>,
        errors: E,
    ) -> Self {
        Self {
            nav,
            resolver,
            writer,
            errors,
        }
    }

    pub fn nav(&self) -> &NavContext {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut NavContext {
        &mut self.nav
    }

    pub fn output(&self) -> &W {
        self.writer.get_ref()
    }

    pub fn errors(&self) -> &E {
        &self.errors
    }

    pub fn is_ready(&self) -> bool {
        self.resolver.is_open() && self.writer.is_open() && self.nav.current().is_some()
    }

    /// Runs cycles until the user confirms leaving, then closes the console. Returns the
    /// error that stopped the session early, if any.
    pub fn run(&mut self) -> NavResult<()> {
        info!("session started");
        let outcome = self.run_until_exit();
        let closed = self.close();
        info!("session ended");
        outcome.and(closed)
    }

    fn run_until_exit(&mut self) -> NavResult<()> {
        loop {
            match self.run_cycle() {
                Ok(CycleFlow::Exit) => return Ok(()),
                Ok(flow) => debug!("cycle finished: {flow:?}"),
                Err(err) => {
                    error!("session aborted: {err}");
                    if let Err(report_err) = writeln!(self.errors, "{err}") {
                        warn!("could not report the error: {report_err}");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// One pass of render, read, resolve and dispatch for the active menu.
    pub fn run_cycle(&mut self) -> NavResult<CycleFlow> {
        if !self.resolver.is_open() {
            return Err(NavError::ReaderClosed);
        }
        if !self.writer.is_open() {
            return Err(NavError::WriterClosed);
        }
        let active = self.nav.current().ok_or(NavError::NoActiveNode)?;
        // only changes made from here on count for this cycle
        self.nav.consume_dirty();

        self.dispatch(&active, &Event::new(EventKind::PreRender))?;
        self.writer.write_line(&active.display_text())?;
        self.dispatch(&active, &Event::new(EventKind::Render))?;
        self.dispatch(&active, &Event::new(EventKind::PostRender))?;

        let options = active.visible_option_names();
        let pattern = active.command_pattern();
        let resolution = match &pattern {
            Some(pattern) => self.resolver.resolve_command(&mut self.writer, &options, pattern)?,
            None => self.resolver.resolve(&mut self.writer, &options)?,
        };
        // command menus answer with EXECUTE, regular menus with SELECT
        let kind = if pattern.is_some() {
            EventKind::Execute
        } else {
            EventKind::Select
        };

        match resolution {
            Resolution::EndOfInput
            | Resolution::Reserved {
                command: ReservedCommand::Escape,
                ..
            } => {
                if self.confirm_exit(&active)? {
                    return Ok(CycleFlow::Exit);
                }
            }
            Resolution::Reserved {
                command: ReservedCommand::Back,
                ..
            } => self.leave(&active)?,
            Resolution::Reserved {
                command: ReservedCommand::Help,
                ..
            } => self.write_help(&active)?,
            Resolution::Selected { option, input } => self.select(&active, &option, input, kind)?,
            Resolution::Command { input } => self.execute(&active, input)?,
        }

        if self.nav.consume_dirty() {
            return Ok(CycleFlow::Navigated);
        }
        Ok(CycleFlow::Processed)
    }

    fn dispatch(&mut self, node: &MenuRef, event: &Event) -> NavResult<EventResult> {
        let result = node.receive_event(event, &mut self.nav);
        if result.has_error() {
            writeln!(self.errors, "{}", result.message())?;
            self.errors.flush()?;
        }
        Ok(result)
    }

    fn confirm_exit(&mut self, active: &MenuRef) -> NavResult<bool> {
        // no answer means no more input, so there is nothing left to stay for
        let close = self
            .resolver
            .confirm(&mut self.writer, CONFIRM_EXIT_MESSAGE)?
            .unwrap_or(true);
        if !close {
            debug!("exit cancelled");
            return Ok(false);
        }

        if active.has_unsaved_changes() {
            let save = self
                .resolver
                .confirm(&mut self.writer, CONFIRM_SAVE_ON_EXIT_MESSAGE)?
                .unwrap_or(false);
            if save {
                self.dispatch(active, &Event::new(EventKind::OnClose))?;
            }
        }
        Ok(true)
    }

    fn leave(&mut self, active: &MenuRef) -> NavResult<()> {
        if active.has_unsaved_changes() {
            let save = self
                .resolver
                .confirm(&mut self.writer, CONFIRM_SAVE_ON_BACK_MESSAGE)?
                .unwrap_or(false);
            if save {
                self.dispatch(active, &Event::new(EventKind::OnClose))?;
            }
        }
        if self.nav.pop().is_none() {
            debug!("back from '{}': already at the main menu", active.name());
        }
        Ok(())
    }

    fn select(
        &mut self,
        active: &MenuRef,
        option: &str,
        input: ParsedInput,
        kind: EventKind,
    ) -> NavResult<()> {
        let Some(child) = active.child(option) else {
            warn!("menu '{}' has no child '{option}'", active.name());
            return Ok(());
        };
        if child.is_disabled() {
            self.writer
                .write_line(&format!("option {} is disabled", child.name()))?;
            return Ok(());
        }

        let event = Event::with_command(kind, input.command, input.args);
        self.dispatch(&child, &event)?;
        Ok(())
    }

    /// Sends a pattern-matched line to the visible option named by its first token, or to the
    /// command menu itself when there is no such option.
    fn execute(&mut self, active: &MenuRef, input: ParsedInput) -> NavResult<()> {
        let target = active
            .child(&input.command)
            .filter(|child| !child.is_hidden());
        match target {
            Some(child) => self.select(active, child.name(), input, EventKind::Execute),
            None => {
                let event = Event::with_command(EventKind::Execute, input.command, input.args);
                self.dispatch(active, &event)?;
                Ok(())
            }
        }
    }

    fn write_help(&mut self, active: &MenuRef) -> NavResult<()> {
        let reserved = self.resolver.reserved();
        let mut help = format!(
            "Commands:\n  {}: leave the program\n  {}: return to the previous menu\n  {}: show this message",
            reserved.escape().join(", "),
            reserved.back().join(", "),
            reserved.help().join(", "),
        );
        let options = active.render_options();
        if !options.is_empty() {
            help.push_str("\nOptions:\n");
            help.push_str(&options);
        }
        self.writer.write_line(&help)
    }

    /// Closes input and output. Safe to call more than once.
    ///
    /// The error sink is flushed even when closing the writer fails; the first error wins.
    pub fn close(&mut self) -> NavResult<()> {
        self.resolver.close();
        let flushed = self.errors.flush().map_err(NavError::from);
        let closed = self.writer.close();
        flushed.and(closed)
    }
}
