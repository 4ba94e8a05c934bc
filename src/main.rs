use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod config;
mod console;
mod git;
mod logging;
mod markup;
mod paths;
mod pipeline;
mod pull;
mod report;

#[derive(Parser)]
#[command(version, about = "Prepare an Angular build for hosting as a SharePoint page")]
struct Args {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// The command to execute
    #[command(subcommand)]
    command: DistprepCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct RunArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "distprep.yaml")]
    config_file: Option<PathBuf>,

    /// Build output directory, overriding `source` from the config
    #[arg(long)]
    source: Option<PathBuf>,

    /// Deployment directory, overriding `target` from the config
    #[arg(long)]
    target: Option<PathBuf>,

    /// Print the run report as JSON instead of the console summary
    #[arg(long, default_value = "false")]
    json: bool,
}

#[derive(Parser)]
struct PullArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "distprep.yaml")]
    config_file: Option<PathBuf>,

    /// Print the pull report as JSON instead of the console summary
    #[arg(long, default_value = "false")]
    json: bool,
}

#[derive(Subcommand)]
enum DistprepCommand {
    /// Write a default distprep.yaml
    Init(InitArgs),

    /// Clean the deployment directory and post-process the build into it
    Run(RunArgs),

    /// Fetch the published files back from the distribution repository
    Pull(PullArgs),
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    logging::setup_logging(args.verbose)?;

    match args.command {
        DistprepCommand::Init(args) => {
            commands::init::run(&args)?;
        }
        DistprepCommand::Run(args) => {
            commands::run::run(&args)?;
        }
        DistprepCommand::Pull(args) => {
            commands::pull::run(&args)?;
        }
    }

    Ok(())
}
