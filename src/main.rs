//! ollama-relay binary entry point.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use ollama_relay::api::{self, AppState};
use ollama_relay::cli::{self, Args, Mode};
use ollama_relay::config::Config;
use ollama_relay::{logging, LineSanitizer, Relay, RunStatus, RunStream};
use tokio::io::AsyncReadExt;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'ollama-relay --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_with_filter(config.log_filter()) {
        eprintln!("warning: logging not initialized: {}", e);
    }

    let sanitizer = match LineSanitizer::standard() {
        Ok(sanitizer) => Arc::new(sanitizer),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let relay = Relay::new(config.runner_settings(), config.model_catalog(), sanitizer);

    match args.mode {
        Mode::Serve => serve(&config, relay).await,
        Mode::Ask => ask(&args, &relay).await,
        Mode::Models => {
            let catalog = relay.catalog();
            for model in catalog.available() {
                let marker = if model == catalog.default_model() { "*" } else { " " };
                println!("{} {}", marker, model);
            }
            ExitCode::SUCCESS
        }
    }
}

async fn serve(config: &Config, relay: Relay) -> ExitCode {
    info!("ollama-relay v{}", env!("CARGO_PKG_VERSION"));

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match api::serve(server_config, AppState::new(Arc::new(relay))).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn ask(args: &Args, relay: &Relay) -> ExitCode {
    let model = relay.catalog().resolve(args.model.as_deref());

    let run = match (&args.file, &args.prompt) {
        (Some(path), _) => relay.submit_file(path, model).await,
        (None, Some(prompt)) => relay.submit(prompt.clone(), model),
        (None, None) => {
            let mut prompt = String::new();
            if let Err(e) = tokio::io::stdin().read_to_string(&mut prompt).await {
                eprintln!("error: failed to read prompt from stdin: {}", e);
                return ExitCode::FAILURE;
            }
            relay.submit(prompt.trim_end_matches('\n').to_string(), model)
        }
    };

    tokio::select! {
        code = print_run(run, args.raw) => code,
        _ = tokio::signal::ctrl_c() => {
            // The run was dropped with the print future, which kills the process.
            eprintln!();
            eprintln!("cancelled");
            ExitCode::from(130)
        }
    }
}

async fn print_run(mut run: RunStream, raw: bool) -> ExitCode {
    let mut stdout = std::io::stdout();
    let mut printed = 0;

    while let Some(emission) = run.next().await {
        match emission.status {
            RunStatus::Error => {
                eprintln!("{}", emission.display());
                return ExitCode::FAILURE;
            }
            _ if raw => {
                let _ = writeln!(stdout, "{}\n", emission.content);
            }
            _ => {
                let body = emission.body();
                if body.len() > printed {
                    let delta = &body[printed..];
                    let _ = writeln!(stdout, "{}", delta.strip_prefix('\n').unwrap_or(delta));
                    let _ = stdout.flush();
                    printed = body.len();
                }
            }
        }
    }

    ExitCode::SUCCESS
}
