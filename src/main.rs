use clap::Parser;
use miette::Result;
use rqc::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    rqc::core::logging::init(global.verbose);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => rqc::cli::commands::menu::run(&global),
        Commands::Batch(args) => rqc::cli::commands::batch::run(args, &global),
        Commands::Decode(args) => rqc::cli::commands::decode::run(args, &global),
        Commands::Palette => rqc::cli::commands::palette::run(&global),
        Commands::Log(cmd) => rqc::cli::commands::log::run(cmd, &global),
        Commands::Config(cmd) => rqc::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => rqc::cli::commands::completions::run(args),
    }
}
