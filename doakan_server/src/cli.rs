use std::{env, env::VarError};

use chrono::Utc;

use crate::{auth::TokenIssuer, config::AuthConfig};

/// What `main` should do after the command line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliAction {
    RunServer,
    Exit,
}

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> CliAction {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match args.as_slice() {
        [] => CliAction::RunServer,
        [flag, user_id] if flag == "--issue-token" => {
            match user_id.parse::<i64>() {
                Ok(id) => print_token(id),
                Err(e) => eprintln!("'{user_id}' is not a valid user id. {e}"),
            }
            CliAction::Exit
        },
        _ => {
            display_readme();
            display_envs();
            CliAction::Exit
        },
    }
}

fn print_token(user_id: i64) {
    let config = match AuthConfig::try_from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("A token can only be issued with a configured signing secret. {e}");
            return;
        },
    };
    match TokenIssuer::new(&config).issue_token(user_id, Utc::now()) {
        Ok(token) => println!("{token}"),
        Err(e) => eprintln!("Could not issue token. {e}"),
    }
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "DKN_HOST",
        "DKN_PORT",
        "DKN_DATABASE_URL",
        "DKN_TOKEN_LIFETIME_HOURS",
        "DKN_MIDTRANS_API_URL",
        "DKN_MIDTRANS_BANK",
        "DKN_GATEWAY_TIMEOUT_SECS",
        "DKN_MIDTRANS_SIGNATURE_CHECKS",
        "DKN_GATEWAY_STATUS_OVERRIDES",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
