//! Command-line entry point for caudit.

use std::process::ExitCode;

use caudit::cli::{CommandContext, args::parse_cli, commands};

fn main() -> ExitCode {
    let cli = parse_cli();
    let context = if cli.command.needs_config() {
        CommandContext::load()
    } else {
        CommandContext::load_cwd_only()
    };
    match context {
        Ok(ctx) => commands::run(cli.command, &ctx),
        Err(code) => code,
    }
}
