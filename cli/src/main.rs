//! Dolly CLI: build or tear down tmux sessions from the command line.

mod prompt;

use std::process;

use clap::{CommandFactory, Parser};
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use dolly_core::command::{Command, Response};
use dolly_core::data::builder::parse_commands;
use dolly_core::data::loader::save_config;
use dolly_core::sys::Sys;
use dolly_core::{DollyError, Result};


#[derive(Debug, Parser)]
#[command(
    name = "dolly",
    version,
    about = "Build tmux sessions from YAML layouts",
    after_help = "Examples:\n  \
        dolly my-project.yml                            Create session from YAML\n  \
        dolly -t my-project.yml                         Terminate session\n  \
        dolly -e \"npm run dev, npm test\" -n myproject   Quick session"
)]
struct Cli {
    /// Session layout file (YAML)
    config: Option<String>,

    /// Terminate the session instead of creating it
    #[arg(short, long)]
    terminate: bool,

    /// Comma-separated commands, one pane each
    #[arg(short, long, value_name = "CMDS")]
    exec: Option<String>,

    /// Session name for --exec mode
    #[arg(short, long)]
    name: Option<String>,

    /// Log every tmux call to stderr
    #[arg(short, long)]
    verbose: bool,
}


fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut sys = Sys::new();
    let result = match cli.exec.as_deref() {
        Some(exec) => run_exec(&mut sys, exec, cli.name.as_deref(), cli.terminate),
        None => run_config(&mut sys, cli.config.as_deref(), cli.terminate),
    };

    if let Err(message) = result {
        eprintln!("dolly: {}", message);
        process::exit(1);
    }
}


/// stderr logging; `RUST_LOG` wins over the default of `warn` (or `debug`
/// with `--verbose`).
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}


fn run_config(sys: &mut Sys, config: Option<&str>, terminate: bool) -> std::result::Result<(), String> {
    let Some(config) = config else {
        let _ = Cli::command().print_help();
        return Err("no config file given".into());
    };
    let cmd = if terminate {
        Command::SessionTerminate {
            config: config.to_string(),
        }
    } else {
        Command::SessionCreate {
            config: config.to_string(),
        }
    };
    respond(sys.execute(cmd))
}


fn run_exec(sys: &mut Sys, exec: &str, name: Option<&str>, terminate: bool) -> std::result::Result<(), String> {
    let commands = parse_commands(exec);
    if commands.is_empty() {
        return Err("no commands provided to --exec".into());
    }
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.to_string(),
        None => prompt::session_name().map_err(|e| e.to_string())?,
    };

    if terminate {
        return respond(sys.execute(Command::SessionKill { name }));
    }

    respond(sys.execute(Command::SessionExec {
        name: name.clone(),
        commands,
        cwd: None,
    }))?;

    if let Some(config) = sys.take_built_config() {
        match offer_save(&name) {
            Ok(Some(path)) => {
                let written = save_config(&config, &path).map_err(|e| e.to_string())?;
                println!("Configuration saved to '{}'", written.display());
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "skipping config save"),
        }
    }
    Ok(())
}


/// Ask whether to save the synthesized config, and where.
fn offer_save(session: &str) -> Result<Option<String>> {
    if !prompt::confirm_save()? {
        return Ok(None);
    }
    let path = prompt::config_path(&format!("{}.yml", session))?;
    if path.is_empty() {
        return Err(DollyError::Prompt("empty path".into()));
    }
    Ok(Some(path))
}


fn respond(response: Response) -> std::result::Result<(), String> {
    match response {
        Response::Ok { output } => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Response::Error { message } => Err(message),
    }
}
