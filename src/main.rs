//! `mbox-dp` entry point: parse arguments, run the command, and print
//! failures with a suggestion.

use clap::Parser;
use mbox_dependency_manager::cli::Cli;
use mbox_dependency_manager::core::user_friendly_error;

fn main() {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}
