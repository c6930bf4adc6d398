use std::path::PathBuf;

use clap::Parser;
use info::InfoArgs;
use vllm_common::{
    metadata::LevelFilter,
    util::tracing::{level_from_log, setup_tracing},
};

use crate::{error::VllmCliResult, init::init_config};

mod crd;
mod info;
mod list;
mod run;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Overrides `log_level` from the settings
    #[clap(short('l'), long, value_name("LEVEL"))]
    pub log_level: Option<LevelFilter>,

    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Parser, Clone)]
pub enum Command {
    #[command(about = "Show version and build information")]
    Info(InfoArgs),
    #[command(about = "Run the VllmDeployment controller", alias = "r")]
    Run(run::RunArgs),
    #[command(about = "Print the VllmDeployment CustomResourceDefinition")]
    Crd(crd::CrdArgs),
    #[command(about = "List VllmDeployments and their conditions", alias = "ls")]
    List(list::ListArgs),
}

pub async fn exec() -> VllmCliResult {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let cfg = init_config(&cli)?;

    let level = match (cli.verbose, cli.log_level) {
        (_, Some(level)) => level,
        (true, None) => LevelFilter::DEBUG,
        (false, None) => level_from_log(cfg.log_level),
    };
    setup_tracing(Some(level)).await;

    match cli.cmd {
        Command::Info(args) => info::run(args, cfg).await?,
        Command::Run(args) => run::run(args, cfg).await?,
        Command::Crd(args) => crd::run(args, cfg).await?,
        Command::List(args) => list::run(args, cfg).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli =
            Cli::try_parse_from(["vk", "-l", "debug", "run", "--namespace", "models"]).unwrap();
        assert_eq!(cli.log_level, Some(LevelFilter::DEBUG));
        match cli.cmd {
            Command::Run(args) => assert_eq!(args.namespace.as_deref(), Some("models")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_alias() {
        let cli = Cli::try_parse_from(["vk", "ls", "-n", "models"]).unwrap();
        assert!(matches!(cli.cmd, Command::List(_)));
        assert_eq!(cli.log_level, None);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["vk"]).is_err());
    }
}
