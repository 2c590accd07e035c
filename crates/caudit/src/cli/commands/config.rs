//! Implementation of `caudit config`.

use std::process::ExitCode;

use super::shared::fail;
use crate::cli::{context::CommandContext, output::Highlighter};

/// Prints the effective settings as highlighted TOML.
pub fn run(ctx: &CommandContext) -> ExitCode {
    match ctx.config.settings_to_toml() {
        Ok(toml) => {
            print!("{}", Highlighter::new().highlight_toml(&toml));
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
