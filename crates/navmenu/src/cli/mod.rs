use std::{env, path::PathBuf};

pub enum CliCommand {
    Run(Option<PathBuf>),
    ShowConfig(Option<PathBuf>),
    Help,
}

pub fn parse_from_env() -> CliCommand {
    parse(env::args().skip(1))
}

pub fn parse(args: impl IntoIterator<Item = String>) -> CliCommand {
    let mut args = args.into_iter();
    let mut config = None;
    let mut show_config = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let Some(path) = args.next().map(PathBuf::from) else {
                    return CliCommand::Help;
                };
                config = Some(path);
            }
            "config" => show_config = true,
            _ => return CliCommand::Help,
        }
    }

    if show_config {
        CliCommand::ShowConfig(config)
    } else {
        CliCommand::Run(config)
    }
}

pub fn print_usage() {
    println!("Usage: navmenu [--config <path>] [config]");
    println!();
    println!("  config           print the resolved configuration and exit");
    println!("  -c, --config     read configuration from <path>");
    println!("  -h, --help       show this message");
}
