//! ScoutGate - sign in with the scout database from the command line

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use scoutgate_app::commands::{self, LoginOutcome};
use scoutgate_app::utils::init_tracing_with_env;
use scoutgate_app::AppContext;
use scoutgate_infra::SystemBrowser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Sign in through the browser
    Login,
    /// Drop the local session
    Logout,
    /// Delete the signed-in account
    DeleteAccount,
    /// Show the current session
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    match init_tracing_with_env(args.json_logs, None) {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }

    let config = scoutgate_infra::config::load().context("failed to load configuration")?;
    let ctx = Arc::new(AppContext::new(config).await.context("failed to initialize")?);

    let result = run(&ctx, args.cmd).await;
    ctx.shutdown().await.context("shutdown failed")?;
    result
}

async fn run(ctx: &Arc<AppContext>, cmd: Command) -> Result<()> {
    match cmd {
        Command::Login => login(ctx).await,
        Command::Logout => {
            commands::sign_out(ctx).await.map_err(anyhow::Error::msg)?;
            println!("Signed out.");
            Ok(())
        }
        Command::DeleteAccount => {
            commands::delete_account(ctx).await.map_err(anyhow::Error::msg)?;
            println!("Account deleted.");
            Ok(())
        }
        Command::Status => {
            let status = commands::auth_status(ctx);
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
    }
}

async fn login(ctx: &Arc<AppContext>) -> Result<()> {
    if ctx.start_callback_server().await?.is_none() {
        // Custom-scheme redirects cannot reach a terminal process on their
        // own; accept the callback URL pasted by the user instead.
        let paste = Arc::clone(ctx);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if commands::handle_deep_link(&paste, line.trim()) {
                    break;
                }
            }
        });
        println!("After approving, paste the redirect URL here.");
    }

    let interrupt = Arc::clone(ctx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            commands::cancel_login(&interrupt);
        }
    });

    match commands::login(ctx, &SystemBrowser::new()).await {
        LoginOutcome::Success { uid } => {
            println!("Signed in as {uid}.");
            Ok(())
        }
        outcome @ LoginOutcome::Cancelled => {
            println!("{}", outcome.message().unwrap_or_default());
            Ok(())
        }
        LoginOutcome::Failed { message } => Err(anyhow::Error::msg(message)),
    }
}
