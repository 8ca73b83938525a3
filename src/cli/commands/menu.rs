//! `rqc menu` command - the interactive operation menu
//!
//! Uses dialoguer prompts on a terminal. When stdin is piped, answers are
//! read one per line with the same validation, so sessions can be scripted:
//!
//! ```bash
//! printf '3\nshipments\n' | rqc menu
//! ```

use miette::Result;
use std::io::{self, IsTerminal};

use crate::cli::commands::utils::{show_outcome, Settings};
use crate::cli::prompt::{LinePrompter, TerminalPrompter};
use crate::cli::session::Session;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load(global)?;
    let suppliers = settings.config.suppliers();

    let outcome = if io::stdin().is_terminal() {
        let mut prompter = TerminalPrompter::new();
        Session::new(
            &mut prompter,
            suppliers,
            settings.log_dir.clone(),
            settings.options,
        )
        .run()?
    } else {
        let mut prompter = LinePrompter::new(io::stdin().lock(), io::stdout());
        Session::new(
            &mut prompter,
            suppliers,
            settings.log_dir.clone(),
            settings.options,
        )
        .run()?
    };

    show_outcome(
        outcome,
        settings.options.failure_basis,
        settings.format,
        global,
    )
}
