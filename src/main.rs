use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::style::Stylize;
use jiff::Timestamp;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use telnet_client::{ClientConfig, SessionError, SessionResult, TelnetSession, Transcript};

/// Log in to a Telnet host and run commands, waiting for the prompt after each
#[derive(Parser, Debug)]
#[command(name = "telnet-client", version, about, long_about = None)]
struct Cli {
    /// Remote host (defaults to `host` in the config file)
    host: Option<String>,

    /// Remote port
    #[arg(short, long)]
    port: Option<u16>,

    /// Config file, created with defaults if missing
    #[arg(short, long, default_value = "telnet-client.conf")]
    config: PathBuf,

    /// Login name; without one no login is attempted
    #[arg(short, long)]
    user: Option<String>,

    /// Login password
    #[arg(long, env = "TELNET_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Regular expression that marks the shell prompt
    #[arg(long)]
    prompt: Option<String>,

    /// Await timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Command to run; repeat for several. Read from stdin when absent
    #[arg(short = 'e', long = "exec")]
    commands: Vec<String>,

    /// Print a JSON line per command instead of plain output
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = match ClientConfig::load_from_file(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (ClientConfig::default(), Some(e)),
    };
    let config = apply_overrides(config, &cli);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(e) = config_error {
        warn!("Config error: {}. Using defaults.", e);
    }

    match run(&cli, &config) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            warn!("{} command(s) failed", failures);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn apply_overrides(mut config: ClientConfig, cli: &Cli) -> ClientConfig {
    if let Some(host) = &cli.host {
        config.connection.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    if let Some(user) = &cli.user {
        config.login.username = Some(user.clone());
    }
    if let Some(password) = &cli.password {
        config.login.password = Some(password.clone());
    }
    if let Some(prompt) = &cli.prompt {
        config.session.prompt_pattern = prompt.clone();
    }
    if let Some(timeout) = cli.timeout_ms {
        config.session.await_timeout = Duration::from_millis(timeout);
    }
    config
}

/// Returns the number of commands that failed
fn run(cli: &Cli, config: &ClientConfig) -> SessionResult<usize> {
    let mut session = TelnetSession::from_config(config)?;
    info!(
        "Connected to {}:{}",
        config.connection.host, config.connection.port
    );

    if let Some(username) = &config.login.username {
        let password = config.login.password.as_deref().unwrap_or("");
        session.login(username, password, None)?;
        info!("Logged in as {}", username);
    }

    let commands: Box<dyn Iterator<Item = io::Result<String>>> = if cli.commands.is_empty() {
        Box::new(io::stdin().lock().lines())
    } else {
        Box::new(cli.commands.clone().into_iter().map(Ok))
    };

    let mut transcript = Transcript::new(config.connection.host.clone());
    let mut stdout = io::stdout().lock();

    for command in commands {
        let command = command?;
        let command = command.trim_end_matches('\r');

        let at = Timestamp::now();
        let started = Instant::now();
        let result = session.send_message(command, None, None);
        let entry = transcript.record(at, command, &result, started.elapsed());

        if cli.json {
            serde_json::to_writer(&mut stdout, entry).map_err(io::Error::from)?;
            writeln!(stdout)?;
        } else {
            writeln!(stdout, "{}", format!("> {}", command).bold().green())?;
            write!(stdout, "{}", entry.output)?;
            if let Some(e) = &entry.error {
                writeln!(stdout)?;
                writeln!(stdout, "{}", e.as_str().red())?;
            }
            writeln!(stdout)?;
        }
        stdout.flush()?;

        // Nothing more can be read once the remote is gone
        if matches!(
            result,
            Err(SessionError::ConnectionClosed { .. } | SessionError::Connection(_))
        ) {
            break;
        }
    }

    info!(
        "{} command(s) run, {} failed",
        transcript.entries().len(),
        transcript.failures()
    );
    session.disconnect();
    Ok(transcript.failures())
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
    fn test_commands_are_exec_options() {
        let cli = Cli::try_parse_from([
            "telnet-client",
            "router",
            "-e",
            "show version",
            "--exec",
            "show clock",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("router"));
        assert_eq!(cli.commands, vec!["show version", "show clock"]);
    }

    #[test]
    fn test_extra_positional_is_rejected() {
        assert!(Cli::try_parse_from(["telnet-client", "router", "uptime"]).is_err());
    }
}
