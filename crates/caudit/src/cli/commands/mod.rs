//! Command implementations and dispatch.

pub mod config;
pub mod full;
pub mod gaps;
pub mod init;
mod shared;
pub mod sitemap;
pub mod status;
pub mod update_webmaster;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Full(cmd) => full::run(ctx, &cmd),
        Commands::Sitemap(cmd) => sitemap::run(ctx, &cmd),
        Commands::UpdateWebmaster(cmd) => update_webmaster::run(ctx, &cmd),
        Commands::Gaps(cmd) => gaps::run(ctx, &cmd),
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Status => status::run(ctx),
        Commands::Config => config::run(ctx),
    }
}
