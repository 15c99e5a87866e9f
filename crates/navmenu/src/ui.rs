use console::style;

pub fn print_banner() {
    println!("{}", style("navmenu: type a number or a name, 'help' for commands").bold().cyan());
}

pub fn print_goodbye() {
    println!("{}", style("Goodbye 👋").dim());
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("\n{}\n", style(message).red().bold());
}

pub fn print_info(message: impl std::fmt::Display) {
    println!("{}", style(message).green());
}
