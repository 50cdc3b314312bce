mod certificate;
mod chain;
mod cli;
mod cmd;
mod config;
mod form;
mod log;
mod output;
mod rpc;
mod session;
mod tx;
mod util;
mod validator;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use cmd::Context;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = log::init_logger(&cli) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(&cli)?;
    tracing::debug!("node {} / validator {}", ctx.config.node_url, ctx.config.validator_url);
    match cli.command {
        Command::Lookup(args) => cmd::lookup::run(&ctx, args).await,
        Command::Register(args) => cmd::certificate::register(&ctx, args).await,
        Command::Modify(args) => cmd::certificate::modify(&ctx, args).await,
        Command::Remove(args) => cmd::certificate::remove(&ctx, args).await,
        Command::Validate(args) => cmd::validate::run(&ctx, args).await,
        Command::Dump(args) => cmd::dump::run(&ctx, args).await,
        Command::Reverse(args) => cmd::reverse::run(&ctx, args).await,
        Command::Transfer(args) => cmd::transfer::run(&ctx, args).await,
        Command::Balance(args) => cmd::balance::run(&ctx, args).await,
        Command::Democracy(args) => cmd::democracy::run(&ctx, args).await,
        Command::Node(args) => cmd::node::run(&ctx, args).await,
    }
}
