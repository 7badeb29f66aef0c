use crate::commands::{
    run_eligibility_check, run_fee_quote, run_grant_listing, EligibilityCheckArgs, FeeQuoteArgs,
    GrantListArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use grantflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Grantflow",
    about = "Quote application fees, check grant eligibility, and run the grant application API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Application fee tools
    Fee {
        #[command(subcommand)]
        command: FeeCommand,
    },
    /// Walk a grant's eligibility questionnaire with a list of answers
    Eligibility {
        #[command(subcommand)]
        command: EligibilityCommand,
    },
    /// Inspect a grant seed file
    Grants {
        #[command(subcommand)]
        command: GrantsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum FeeCommand {
    /// Quote the application fee for a requested amount
    Quote(FeeQuoteArgs),
}

#[derive(Subcommand, Debug)]
enum EligibilityCommand {
    /// Answer a grant's criteria in order and report the result
    Check(EligibilityCheckArgs),
}

#[derive(Subcommand, Debug)]
enum GrantsCommand {
    /// List grants with their advertised amounts and fees
    List(GrantListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the grant seed file (APP_GRANTS_PATH)
    #[arg(long)]
    pub(crate) grants: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fee {
            command: FeeCommand::Quote(args),
        } => run_fee_quote(args),
        Command::Eligibility {
            command: EligibilityCommand::Check(args),
        } => run_eligibility_check(args),
        Command::Grants {
            command: GrantsCommand::List(args),
        } => run_grant_listing(args),
    }
}
