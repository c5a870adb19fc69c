//! fleetgrid — lifecycle client for the fleet scheduler.
//!
//! # Usage
//!
//! ```text
//! fleetgrid create billing_v3.web.1 billing/web -- start web
//! fleetgrid start billing_v3.web.1
//! fleetgrid run billing_v3.run.1 billing /bin/sh -- rake db:migrate
//! fleetgrid destroy billing_v3.web.1
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fleetgrid",
    about = "fleetgrid — container lifecycle client for the fleet scheduler",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to fleetgrid.toml (default: ./fleetgrid.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Scheduler API socket, overrides [scheduler].socket
    #[arg(long, global = true)]
    socket: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a unit for a container
    Create {
        /// Workload name: app[_vN][.type].num
        name: String,
        /// Image path within the registry
        image: String,
        /// Machine metadata constraint (repeatable)
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
        #[arg(long)]
        entrypoint: Option<String>,
        /// Wait for the container to come up after submitting
        #[arg(long)]
        start: bool,
        /// Command passed to the container
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Wait until a submitted unit is running
    Start { name: String },
    /// Stop a unit (not supported by the scheduler)
    Stop { name: String },
    /// Delete a unit and wait for it to disappear
    Destroy { name: String },
    /// Run a one-off admin command and print its run id
    Run {
        name: String,
        image: String,
        entrypoint: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Attach to a unit's stdio (not supported by the scheduler)
    Attach { name: String },
    /// Show observed unit state
    Status {
        /// Limit to one unit
        name: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List cluster machines
    Machines {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fleetgrid=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Stop { name } => return commands::unit::stop(name),
        Commands::Attach { name } => return commands::unit::attach(name),
        _ => {}
    }

    let config = commands::load_config(cli.config.as_deref())?;
    let mut session = commands::Session::connect(config, cli.socket).await?;

    match cli.command {
        Commands::Create {
            name,
            image,
            tags,
            entrypoint,
            start,
            command,
        } => {
            commands::unit::create(
                &mut session,
                &name,
                &image,
                &command.join(" "),
                tags,
                entrypoint,
                start,
            )
            .await
        }
        Commands::Start { name } => commands::unit::start(&mut session, &name).await,
        Commands::Destroy { name } => commands::unit::destroy(&mut session, &name).await,
        Commands::Run {
            name,
            image,
            entrypoint,
            command,
        } => commands::unit::run(&mut session, &name, &image, &entrypoint, &command.join(" ")).await,
        Commands::Status { name, format } => {
            commands::status::status(&mut session, name.as_deref(), &format).await
        }
        Commands::Machines { format } => commands::status::machines(&mut session, &format).await,
        Commands::Stop { name } => commands::unit::stop(&name),
        Commands::Attach { name } => commands::unit::attach(&name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_tags_and_trailing_command() {
        let cli = Cli::parse_from([
            "fleetgrid",
            "create",
            "app.web.1",
            "app/web",
            "--tag",
            "region=us",
            "--start",
            "--",
            "start",
            "--port",
            "80",
        ]);
        match cli.command {
            Commands::Create {
                name,
                tags,
                start,
                command,
                ..
            } => {
                assert_eq!(name, "app.web.1");
                assert_eq!(tags, [("region".to_string(), "us".to_string())]);
                assert!(start);
                assert_eq!(command, ["start", "--port", "80"]);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn tag_requires_key_value() {
        assert_eq!(parse_tag("a=b=c"), Ok(("a".into(), "b=c".into())));
        assert!(parse_tag("novalue").is_err());
        assert!(parse_tag("=x").is_err());
    }

    #[test]
    fn global_socket_flag() {
        let cli = Cli::parse_from(["fleetgrid", "status", "--socket", "/tmp/f.sock"]);
        assert_eq!(cli.socket, Some(PathBuf::from("/tmp/f.sock")));
        assert!(matches!(cli.command, Commands::Status { name: None, .. }));
    }
}
