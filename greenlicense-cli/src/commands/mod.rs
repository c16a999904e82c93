//! Subcommands and their dispatch.

mod key;
mod license;
mod software;

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use greenlicense_license::LicenseManager;
use greenlicense_store::LicenseStore;

use crate::config::Config;
use crate::output::Output;

pub use key::KeyCommand;
pub use license::LicenseCommand;
pub use software::SoftwareCommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage signing key pairs
    #[command(subcommand)]
    Key(KeyCommand),

    /// Manage software entries
    #[command(subcommand)]
    Software(SoftwareCommand),

    /// Issue and verify license keys
    #[command(subcommand)]
    License(LicenseCommand),
}

pub fn dispatch<S: LicenseStore>(
    command: &Command,
    manager: &LicenseManager<S>,
    config: &Config,
) -> Output {
    let result = match command {
        Command::Key(cmd) => key::run(cmd, manager),
        Command::Software(cmd) => software::run(cmd, manager, config),
        Command::License(cmd) => license::run(cmd, manager),
    };
    result.unwrap_or_else(|e| Output::error(&e))
}

/// Asks a y/n question on the terminal. The prompt goes to stderr so stdout
/// carries only the command output. Anything but "y" or "yes" declines.
fn confirm(question: &str) -> bool {
    ask(question, &mut io::stdin().lock(), &mut io::stderr())
}

fn ask(question: &str, input: &mut impl BufRead, prompt: &mut impl Write) -> bool {
    if write!(prompt, "{question} y/n: ").is_err() || prompt.flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
