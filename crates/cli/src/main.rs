// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers` — launch and manage short-lived cloud dev instances.

mod color;
mod commands;
mod env;
mod errors;
mod events;
mod exit_error;
mod pricing;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use commands::{destroy, doctor, info, init, list, run, setup, start, stop};
use env::CampersEnv;
use exit_error::ExitError;

#[derive(Parser, Debug)]
#[command(name = "campers", version, about = "Launch and manage short-lived cloud dev instances")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Launch or reuse a camp and execute its command
    Run(run::RunArgs),
    /// List managed camps
    List(list::ListArgs),
    /// Stop a managed camp
    Stop(stop::StopArgs),
    /// Start a stopped camp
    Start(start::StartArgs),
    /// Permanently destroy a managed camp
    Destroy(destroy::DestroyArgs),
    /// Show details of a managed camp
    Info(info::InfoArgs),
    /// Validate provider prerequisites, offering to fix what's missing
    Setup(setup::SetupArgs),
    /// Read-only provider diagnostics
    Doctor(doctor::DoctorArgs),
    /// Write a starter campers.yaml
    Init(init::InitArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let command = Cli::command().styles(color::styles());
    let cli = match Cli::from_arg_matches(&command.get_matches()) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    let env = CampersEnv::load();

    let result = dispatch(cli.command, &env).await;

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if env.debug {
                eprintln!("{err:?}");
            } else {
                eprintln!("Error: {}", err.message);
            }
            std::process::exit(err.code);
        }
    }
}

async fn dispatch(command: Command, env: &CampersEnv) -> Result<i32, ExitError> {
    match command {
        Command::Run(args) => run::run(args, env).await,
        Command::List(args) => list::run(args, env).await,
        Command::Stop(args) => stop::run(args, env).await,
        Command::Start(args) => start::run(args, env).await,
        Command::Destroy(args) => destroy::run(args, env).await,
        Command::Info(args) => info::run(args, env).await,
        Command::Setup(args) => setup::run(args, env).await,
        Command::Doctor(args) => doctor::run(args, env).await,
        Command::Init(args) => init::run(args, env).await,
    }
}
