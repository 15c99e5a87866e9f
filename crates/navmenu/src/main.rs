use {
    anyhow::{Context, bail},
    cli::CliCommand,
    navmenu::{
        ConsoleWriter, EventKind, InputResolver, MenuNode, MenuRef, NavConfig, NavContext, Runner,
    },
    simplelog::{ConfigBuilder, WriteLogger},
    std::{cell::RefCell, fs::File, io, path::PathBuf, process::ExitCode, rc::Rc},
    ui::{print_banner, print_error, print_goodbye, print_info},
};

mod cli;
mod ui;

fn load_config(path: Option<PathBuf>) -> anyhow::Result<NavConfig> {
    let config = match path {
        Some(path) => NavConfig::load_from(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => NavConfig::load()?,
    };
    Ok(config)
}

fn init_logging(config: &NavConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    // logging is best effort; the menu works without it
    if let Ok(log_file) = File::create(config.log_file_path()) {
        let _ = WriteLogger::init(config.log_level_filter(), log_config, log_file);
    }
}

/// Main menu: Resume, Start (Basic, Advanced, Custom), Console and Exit.
fn build_menu() -> anyhow::Result<MenuRef> {
    let main = MenuNode::listing("main")?;
    main.set_display_text("Main menu");

    let resume = MenuNode::new("Resume")?;
    resume.add_event_listener(EventKind::Select, |_, _| {
        print_info("Nothing to resume yet.");
        Ok(())
    });

    let start = MenuNode::listing("Start")?;
    start.set_display_text("Start a new game");
    start.add_event_listener(EventKind::Select, |_, ctx| Ok(ctx.open_self()?));

    let basic = MenuNode::new("Basic")?;
    let advanced = MenuNode::new("Advanced")?;
    for mode in [&basic, &advanced] {
        mode.add_event_listener(EventKind::Select, |event, ctx| {
            let name = ctx.node().name().to_lowercase();
            match event.args() {
                [] => print_info(format!("Starting a {name} game.")),
                args => print_info(format!("Starting a {name} game with {}.", args.join(" "))),
            }
            Ok(())
        });
    }

    start.add_children([basic, advanced, build_custom_menu()?]);
    main.add_children([resume, start, build_console()?, MenuNode::new("Exit")?]);
    Ok(main)
}

/// A settings menu that tracks unsaved changes and saves them on `ON_CLOSE`.
fn build_custom_menu() -> anyhow::Result<MenuRef> {
    let difficulty = Rc::new(RefCell::new(String::from("normal")));

    let custom = MenuNode::listing("Custom")?;
    custom.add_event_listener(EventKind::Select, |_, ctx| Ok(ctx.open_self()?));
    custom.add_event_listener(EventKind::PreRender, {
        let difficulty = Rc::clone(&difficulty);
        move |_, ctx| {
            let marker = if ctx.node().has_unsaved_changes() {
                " (unsaved)"
            } else {
                ""
            };
            let header = format!("Custom game, difficulty: {}{marker}", difficulty.borrow());
            ctx.node().set_display_text(header);
            Ok(())
        }
    });
    custom.add_event_listener(EventKind::OnClose, {
        let difficulty = Rc::clone(&difficulty);
        move |_, ctx| {
            print_info(format!("Saved difficulty: {}", difficulty.borrow()));
            ctx.node().set_unsaved_changes(false);
            Ok(())
        }
    });

    for level in ["Easy", "Hard"] {
        let option = MenuNode::new(level)?;
        let difficulty = Rc::clone(&difficulty);
        option.add_event_listener(EventKind::Select, move |_, ctx| {
            *difficulty.borrow_mut() = ctx.node().name().to_lowercase();
            if let Some(active) = ctx.nav().current() {
                active.set_unsaved_changes(true);
            }
            Ok(())
        });
        custom.add_child(option);
    }

    Ok(custom)
}

/// A command menu: dice rolls like `2d6` go to the console itself, `say <text>` to its child.
fn build_console() -> anyhow::Result<MenuRef> {
    let console = MenuNode::with_display_text(
        "Console",
        "Console: roll dice with NdM (e.g. 2d6), or say <text>",
    )?;
    console.set_command_pattern(r"\d+d\d+")?;
    console.add_event_listener(EventKind::Select, |_, ctx| Ok(ctx.open_self()?));
    console.add_event_listener(EventKind::Execute, |event, _| {
        let Some(roll) = event.command() else {
            bail!("nothing to roll");
        };
        let (count, sides) = roll.split_once('d').context("dice are written as NdM")?;
        let count: u32 = count.parse()?;
        let sides: u32 = sides.parse()?;
        if count == 0 || sides == 0 {
            bail!("cannot roll {roll}");
        }
        let most = count.checked_mul(sides).context("too many dice")?;
        print_info(format!("Rolling {count} dice with {sides} sides, at most {most}."));
        Ok(())
    });

    let say = MenuNode::new("Say")?;
    say.add_event_listener(EventKind::Execute, |event, _| {
        print_info(event.args().join(" "));
        Ok(())
    });
    console.add_child(say);

    Ok(console)
}

fn run(config: &NavConfig) -> anyhow::Result<()> {
    let main = build_menu()?;
    let nav = NavContext::with_default(main).with_max_depth(config.max_depth);
    let resolver = InputResolver::from_config(io::stdin().lock(), config);
    let writer = ConsoleWriter::new(io::stdout());

    let mut runner = Runner::new(nav, resolver, writer);
    runner.run()?;
    Ok(())
}

fn main() -> ExitCode {
    let result = match cli::parse_from_env() {
        CliCommand::Help => {
            cli::print_usage();
            Ok(())
        }
        CliCommand::ShowConfig(path) => load_config(path).and_then(|config| {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }),
        CliCommand::Run(path) => load_config(path).and_then(|config| {
            init_logging(&config);
            print_banner();
            run(&config)?;
            print_goodbye();
            Ok(())
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
