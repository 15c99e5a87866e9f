/// Tests for the interaction cycle and the full run loop
use anyhow::anyhow;
use navmenu::constants::{
    CONFIRM_EXIT_MESSAGE, CONFIRM_SAVE_ON_BACK_MESSAGE, INPUT_INVALID_MESSAGE, INPUT_NULL_MESSAGE,
};
use navmenu::{
    ConsoleWriter, CycleFlow, EventKind, InputResolver, MenuNode, MenuRef, NavContext, NavError,
    Runner,
};
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

type TestRunner = Runner<&'static [u8], Vec<u8>, Vec<u8>>;
type EventLog = Rc<RefCell<Vec<(String, EventKind)>>>;

fn runner_with(nav: NavContext, input: &'static str) -> TestRunner {
    Runner::with_error_sink(
        nav,
        InputResolver::new(input.as_bytes()),
        ConsoleWriter::new(Vec::new()),
        Vec::new(),
    )
}

fn runner(main: &MenuRef, input: &'static str) -> TestRunner {
    runner_with(NavContext::with_default(Rc::clone(main)), input)
}

fn output(runner: &TestRunner) -> String {
    String::from_utf8_lossy(runner.output()).into_owned()
}

fn errors(runner: &TestRunner) -> String {
    String::from_utf8_lossy(runner.errors()).into_owned()
}

/// Records every event kind `node` receives.
fn record_all(node: &MenuRef, log: &EventLog) {
    for kind in EventKind::all() {
        let log = Rc::clone(log);
        node.add_event_listener(kind, move |_, ctx| {
            log.borrow_mut().push((ctx.node().name().to_string(), kind));
            Ok(())
        });
    }
}

/// A submenu that opens itself when selected.
fn submenu(name: &str, log: &EventLog) -> MenuRef {
    let node = MenuNode::listing(name).unwrap();
    let log = Rc::clone(log);
    node.add_event_listener(EventKind::Select, move |_, ctx| {
        log.borrow_mut().push((ctx.node().name().to_string(), EventKind::Select));
        Ok(ctx.open_self()?)
    });
    node
}

/// Main menu with Resume, Start and Exit, where Start is a submenu with Basic.
fn main_menu(log: &EventLog) -> MenuRef {
    let main = MenuNode::listing("main").unwrap();
    record_all(&main, log);

    let start = submenu("Start", log);
    let basic = MenuNode::new("Basic").unwrap();
    record_all(&basic, log);
    start.add_child(basic);

    main.add_children([MenuNode::new("Resume").unwrap(), start, MenuNode::new("Exit").unwrap()]);
    main
}

fn count(log: &EventLog, name: &str, kind: EventKind) -> usize {
    log.borrow()
        .iter()
        .filter(|(n, k)| n == name && *k == kind)
        .count()
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_events_fire_in_order_before_input() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "bogus\nresume\n");

    let flow = runner.run_cycle().unwrap();

    assert_eq!(flow, CycleFlow::Processed);
    let kinds: Vec<EventKind> = log.borrow().iter().map(|(_, k)| *k).collect();
    assert_eq!(
        kinds,
        vec![EventKind::PreRender, EventKind::Render, EventKind::PostRender]
    );
    assert_eq!(count(&log, "main", EventKind::Select), 0);
}

#[test]
fn test_display_text_written_after_pre_render() {
    let main = MenuNode::listing("main").unwrap();
    main.add_child(MenuNode::new("Resume").unwrap());
    main.add_event_listener(EventKind::PreRender, |_, ctx| {
        ctx.node().set_display_text("Welcome back");
        Ok(())
    });
    let mut runner = runner(&main, "1\n");

    runner.run_cycle().unwrap();

    assert!(output(&runner).starts_with("Welcome back\n1. Resume\n> "));
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_index_input_selects_option() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "2\n");

    let flow = runner.run_cycle().unwrap();

    assert_eq!(count(&log, "Start", EventKind::Select), 1);
    assert_eq!(flow, CycleFlow::Navigated);
    assert_eq!(runner.nav().current().unwrap().name(), "Start");
}

#[test]
fn test_exit_in_any_case_is_escape() {
    for input in ["EXIT\nyes\n", "exit\ny\n", "eXiT\nYES\n", "quit\nyes\n"] {
        let main = MenuNode::listing("main").unwrap();
        main.add_child(MenuNode::new("Resume").unwrap());
        let mut runner = runner(&main, input);

        assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Exit, "input {input:?}");
        assert!(output(&runner).contains(CONFIRM_EXIT_MESSAGE));
    }
}

#[test]
fn test_exit_cancelled_resumes_loop() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "exit\nno\n");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Processed);
    assert!(runner.is_ready());
}

#[test]
fn test_back_at_root_keeps_root_active() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "back\n");

    runner.run_cycle().unwrap();

    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &main));
    assert!(runner.nav().is_empty());
}

#[test]
fn test_invalid_input_reprompts_without_state_change() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "bogus\nresume\n");

    let flow = runner.run_cycle().unwrap();

    assert_eq!(flow, CycleFlow::Processed);
    assert_eq!(output(&runner).matches(INPUT_INVALID_MESSAGE).count(), 1);
    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &main));
    assert_eq!(count(&log, "Start", EventKind::Select), 0);
}

#[test]
fn test_back_with_unsaved_changes_dispatches_on_close_before_leaving() {
    let main = MenuNode::listing("main").unwrap();
    let custom = MenuNode::listing("Custom").unwrap();
    custom.set_unsaved_changes(true);
    let active_during_close = Rc::new(RefCell::new(Vec::new()));
    custom.add_event_listener(EventKind::OnClose, {
        let seen = Rc::clone(&active_during_close);
        move |_, ctx| {
            let active = ctx.nav().current().map(|n| n.name().to_string());
            seen.borrow_mut().push(active);
            Ok(())
        }
    });
    main.add_child(Rc::clone(&custom));

    let mut nav = NavContext::with_default(Rc::clone(&main));
    nav.push(Rc::clone(&custom)).unwrap();
    nav.consume_dirty();
    let mut runner = runner_with(nav, "back\nyes\n");

    let flow = runner.run_cycle().unwrap();

    assert_eq!(flow, CycleFlow::Navigated);
    assert_eq!(*active_during_close.borrow(), vec![Some("Custom".to_string())]);
    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &main));
    assert!(output(&runner).contains(CONFIRM_SAVE_ON_BACK_MESSAGE));
}

#[test]
fn test_back_with_unsaved_changes_declined_skips_on_close() {
    let log = EventLog::default();
    let main = MenuNode::listing("main").unwrap();
    let custom = MenuNode::listing("Custom").unwrap();
    custom.set_unsaved_changes(true);
    record_all(&custom, &log);

    let mut nav = NavContext::with_default(Rc::clone(&main));
    nav.push(Rc::clone(&custom)).unwrap();
    nav.consume_dirty();
    let mut runner = runner_with(nav, "back\nno\n");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Navigated);

    assert_eq!(count(&log, "Custom", EventKind::OnClose), 0);
    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &main));
}

#[test]
fn test_exit_with_unsaved_changes_asks_to_save() {
    for (input, expected_closes) in [("exit\nyes\nyes\n", 1), ("exit\nyes\nno\n", 0)] {
        let log = EventLog::default();
        let main = MenuNode::listing("main").unwrap();
        record_all(&main, &log);
        main.set_unsaved_changes(true);
        let mut runner = runner(&main, input);

        assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Exit);
        assert_eq!(
            count(&log, "main", EventKind::OnClose),
            expected_closes,
            "input {input:?}"
        );
    }
}

// ============================================================================
// Selection edge cases
// ============================================================================

#[test]
fn test_disabled_option_is_not_dispatched() {
    let log = EventLog::default();
    let main = MenuNode::listing("main").unwrap();
    let locked = MenuNode::new("Locked").unwrap();
    record_all(&locked, &log);
    locked.set_disabled(true);
    main.add_child(locked);
    let mut runner = runner(&main, "locked\n");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Processed);
    assert!(log.borrow().is_empty());
    assert!(output(&runner).contains("option Locked is disabled"));
}

#[test]
fn test_hidden_option_cannot_be_selected() {
    let log = EventLog::default();
    let main = MenuNode::listing("main").unwrap();
    let secret = MenuNode::new("Secret").unwrap();
    record_all(&secret, &log);
    secret.set_hidden(true);
    main.add_child(secret);
    let mut runner = runner(&main, "secret\n1\n");

    // both lines are rejected, then the exhausted input ends the session
    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Exit);
    assert!(!output(&runner).contains("Secret"));
    assert_eq!(output(&runner).matches(INPUT_INVALID_MESSAGE).count(), 2);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_listener_failure_reported_on_error_channel() {
    let main = MenuNode::listing("main").unwrap();
    let broken = MenuNode::new("Broken").unwrap();
    broken.add_event_listener(EventKind::Select, |_, _| Err(anyhow!("boom")));
    main.add_child(broken);
    let mut runner = runner(&main, "broken\n");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Processed);
    assert!(errors(&runner).contains("boom"));
    assert!(!output(&runner).contains("boom"));
}

#[test]
fn test_help_lists_commands_and_options() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "help\n");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Processed);
    let out = output(&runner);
    assert!(out.contains("Commands:"));
    assert!(out.contains("exit, close, quit"));
    assert!(out.contains("back, previous, prev"));
    assert!(out.contains("Options:\n1. Resume\n2. Start\n3. Exit"));
}

// ============================================================================
// Run loop and lifecycle
// ============================================================================

#[test]
fn test_run_navigates_and_exits() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let args = Rc::new(RefCell::new(Vec::new()));
    let basic = main.child("start").unwrap().child("basic").unwrap();
    basic.add_event_listener(EventKind::Select, {
        let args = Rc::clone(&args);
        move |event, _| {
            args.borrow_mut().push(event.args().to_vec());
            Ok(())
        }
    });
    let mut runner = runner(&main, "2\nbasic fast mode\nback\nexit\nyes\n");

    runner.run().unwrap();

    assert_eq!(*args.borrow(), vec![vec!["fast".to_string(), "mode".to_string()]]);
    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &main));
    let out = output(&runner);
    assert!(out.contains("1. Resume\n2. Start\n3. Exit"));
    assert!(out.contains("1. Basic"));
    assert!(!runner.is_ready(), "run closes the console");
}

#[test]
fn test_run_ends_on_end_of_input() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "");

    runner.run().unwrap();

    assert!(output(&runner).contains(INPUT_NULL_MESSAGE));
    assert_eq!(count(&log, "main", EventKind::PreRender), 1);
}

#[test]
fn test_run_without_active_menu_stops_with_error() {
    let mut runner = runner_with(NavContext::new(), "1\n");

    let err = runner.run().unwrap_err();

    assert!(matches!(err, NavError::NoActiveNode));
    assert!(errors(&runner).contains("no active menu"));
    assert!(!runner.is_ready());
}

#[test]
fn test_cycle_after_close_fails_and_close_is_idempotent() {
    let log = EventLog::default();
    let main = main_menu(&log);
    let mut runner = runner(&main, "1\n");

    runner.close().unwrap();
    runner.close().unwrap();

    assert!(matches!(runner.run_cycle(), Err(NavError::ReaderClosed)));
    assert!(log.borrow().is_empty(), "nothing is rendered on a closed runner");
}

// ============================================================================
// Navigation reporting
// ============================================================================

/// `parent` with a child `leaf` whose SELECT listener does nothing.
fn with_leaf(parent: &str) -> MenuRef {
    let node = MenuNode::listing(parent).unwrap();
    let leaf = MenuNode::new("leaf").unwrap();
    leaf.add_event_listener(EventKind::Select, |_, _| Ok(()));
    node.add_child(leaf);
    node
}

#[test]
fn test_navigation_before_the_cycle_is_not_reported() {
    let sub = with_leaf("sub");
    let mut nav = NavContext::with_default(MenuNode::listing("main").unwrap());
    nav.push(Rc::clone(&sub)).unwrap();
    let mut runner = runner_with(nav, "leaf\n");

    let flow = runner.run_cycle().unwrap();

    assert_eq!(flow, CycleFlow::Processed);
    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &sub));
}

#[test]
fn test_navigation_between_cycles_is_not_reported() {
    let main = with_leaf("main");
    let sub = with_leaf("sub");
    let mut runner = runner(&main, "leaf\nleaf\n");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Processed);
    runner.nav_mut().push(Rc::clone(&sub)).unwrap();

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Processed);
    assert!(Rc::ptr_eq(&runner.nav().current().unwrap(), &sub));
}

// ============================================================================
// Command menus
// ============================================================================

/// A command menu accepting dice rolls like `2d6`, with a `Say` option.
fn command_menu(log: &EventLog, seen: &Rc<RefCell<Vec<(String, Vec<String>)>>>) -> MenuRef {
    let console = MenuNode::new("Console").unwrap();
    console.set_command_pattern(r"\d+d\d+( .*)?").unwrap();
    record_all(&console, log);
    console.add_event_listener(EventKind::Execute, {
        let seen = Rc::clone(seen);
        move |event, ctx| {
            let command = event.command().unwrap_or_default().to_string();
            seen.borrow_mut().push((command, event.args().to_vec()));
            assert_eq!(ctx.node().name(), "Console");
            Ok(())
        }
    });

    let say = MenuNode::new("Say").unwrap();
    record_all(&say, log);
    console.add_child(say);
    console
}

#[test]
fn test_command_matching_pattern_executes_on_active_menu() {
    let log = EventLog::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let console = command_menu(&log, &seen);
    let mut runner = runner(&console, "2d6 loud\n");

    let flow = runner.run_cycle().unwrap();

    assert_eq!(flow, CycleFlow::Processed);
    assert_eq!(
        *seen.borrow(),
        vec![("2d6".to_string(), vec!["loud".to_string()])]
    );
}

#[test]
fn test_command_menu_option_by_name_receives_execute() {
    let log = EventLog::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let console = command_menu(&log, &seen);
    let mut runner = runner(&console, "SAY hello\n");

    runner.run_cycle().unwrap();

    assert_eq!(count(&log, "Say", EventKind::Execute), 1);
    assert_eq!(count(&log, "Say", EventKind::Select), 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_command_menu_ignores_option_index() {
    let log = EventLog::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let console = command_menu(&log, &seen);
    let mut runner = runner(&console, "1\nsay\n");

    runner.run_cycle().unwrap();

    assert_eq!(output(&runner).matches(INPUT_INVALID_MESSAGE).count(), 1);
    assert_eq!(count(&log, "Say", EventKind::Execute), 1);
}

#[test]
fn test_command_menu_end_of_input_exits() {
    let log = EventLog::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let console = command_menu(&log, &seen);
    let mut runner = runner(&console, "");

    assert_eq!(runner.run_cycle().unwrap(), CycleFlow::Exit);
    assert!(output(&runner).contains(CONFIRM_EXIT_MESSAGE));
}

// ============================================================================
// Closing
// ============================================================================

struct BrokenFlush;

impl Write for BrokenFlush {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("flush failed"))
    }
}

struct CountingSink(Rc<Cell<usize>>);

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

#[test]
fn test_close_flushes_error_sink_when_writer_fails() {
    let flushes = Rc::new(Cell::new(0));
    let mut runner = Runner::with_error_sink(
        NavContext::with_default(MenuNode::listing("main").unwrap()),
        InputResolver::new("".as_bytes()),
        ConsoleWriter::new(BrokenFlush),
        CountingSink(Rc::clone(&flushes)),
    );

    let err = runner.close().unwrap_err();

    assert!(matches!(err, NavError::IoError(_)));
    assert_eq!(flushes.get(), 1, "the error sink is flushed regardless");
    assert!(!runner.is_ready());
}
