//! dominion-session CLI
//!
//! Drives the session core against the configured dashboard API, keeping the
//! credential in the configured file between runs.
//!
//! ```text
//! dominion-session status
//! DOMINION_PASSWORD=... dominion-session login <username>
//! dominion-session refresh
//! dominion-session logout
//! ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use dominion_session::adapters::HttpSessionGateway;
use dominion_session::application::{RefreshOutcome, Route, SessionManager, SessionView};
use dominion_session::config::AppConfig;
use dominion_session::domain::session::SessionStatus;
use dominion_session::ports::{GatewayError, LoginRequest};
use dominion_session::telemetry;

const PASSWORD_VAR: &str = "DOMINION_PASSWORD";

enum Command {
    Status,
    Login(String),
    Refresh,
    Logout,
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} status\n  {program} login <username>   (password read from {PASSWORD_VAR})\n  {program} refresh\n  {program} logout"
    );
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args {
        [cmd] if cmd == "status" => Some(Command::Status),
        [cmd, username] if cmd == "login" => Some(Command::Login(username.clone())),
        [cmd] if cmd == "refresh" => Some(Command::Refresh),
        [cmd] if cmd == "logout" => Some(Command::Logout),
        _ => None,
    }
}

fn print_view(view: &SessionView) {
    println!("status: {}", view.status);
    if let Some(identity) = &view.identity {
        println!("user: {} ({})", identity.display_name(), identity.username);
    }
    if let Some(snapshot) = &view.dashboard {
        println!(
            "balance: {} {} across {} account(s)",
            snapshot.financial_summary.total_balance,
            snapshot.financial_summary.currency,
            snapshot.account_count()
        );
        if snapshot.verification_required {
            println!("identity verification required");
        }
    }
}

fn report(error: &GatewayError) {
    match error {
        GatewayError::Validation(fields) => {
            eprintln!("{}", fields);
        }
        other => eprintln!("{}", other),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args: Vec<String> = env::args().collect();
    let program = if args.is_empty() {
        "dominion-session".to_string()
    } else {
        args.remove(0)
    };

    let Some(command) = parse_args(&args) else {
        print_usage(&program);
        return ExitCode::from(2);
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = config.validate() {
        eprintln!("Invalid configuration: {}", error);
        return ExitCode::FAILURE;
    }
    telemetry::init_tracing(&config.client);

    let gateway = match HttpSessionGateway::new(config.api.gateway_config()) {
        Ok(gateway) => gateway,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };
    let session = Arc::new(SessionManager::new(
        Arc::new(gateway),
        Arc::new(config.credentials.store()),
    ));

    match command {
        Command::Status => {
            session.bootstrap().await;
            print_view(&session.snapshot());
            ExitCode::SUCCESS
        }
        Command::Login(username) => {
            let Ok(password) = env::var(PASSWORD_VAR) else {
                eprintln!("{PASSWORD_VAR} is not set");
                return ExitCode::from(2);
            };
            match session.login(&LoginRequest::new(username, password)).await {
                Ok(outcome) => {
                    println!("{}", outcome.message);
                    println!("next: {}", Route::from(outcome.next_step));
                    if outcome.kyc_required {
                        println!("identity verification required");
                    }
                    print_view(&session.snapshot());
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    match error.gateway_error() {
                        Some(gateway_error) => report(gateway_error),
                        None => eprintln!("{}", error),
                    }
                    ExitCode::FAILURE
                }
            }
        }
        Command::Refresh => {
            if session.bootstrap().await != SessionStatus::Authenticated {
                eprintln!("Not signed in");
                return ExitCode::FAILURE;
            }
            match session.refresh_snapshot().await {
                RefreshOutcome::Refreshed => {
                    print_view(&session.snapshot());
                    ExitCode::SUCCESS
                }
                outcome => {
                    eprintln!("Refresh did not complete: {:?}", outcome);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out");
            ExitCode::SUCCESS
        }
    }
}
