//! dl command - devlink device and port management.

use std::io;

use anyhow::Context;
use clap::{ArgAction, Parser};
use dlink::Devlink;
use dlink::command::{self, Command};
use dlink::output::{OutputFormat, OutputOptions, Printer, Verbosity};

#[derive(Parser)]
#[command(name = "dl", version, about = "Devlink device and port management tool")]
struct Cli {
    /// Increase output detail (repeat for more).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long)]
    pretty: bool,

    /// OBJECT { COMMAND | help } followed by its arguments.
    ///
    /// OBJECT := { dev | port | monitor }; keywords may be abbreviated.
    /// Options may appear anywhere; use `--` before an argument that
    /// starts with `-`.
    #[arg(value_name = "OBJECT")]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let opts = OutputOptions {
        verbosity: Verbosity::from_flag_count(cli.verbose),
        pretty: cli.pretty,
    };

    let result = match command::parse(&cli.args) {
        Ok(cmd) => execute(&cmd, format, opts).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn execute(cmd: &Command, format: OutputFormat, opts: OutputOptions) -> anyhow::Result<()> {
    let mut printer = Printer::new(io::stdout().lock(), format, opts);

    // Usage text needs no socket
    if let Command::Help(topic) = cmd {
        printer.write_text(command::usage(*topic))?;
        return Ok(());
    }

    let mut dl = Devlink::open()
        .await
        .context("Failed to connect to devlink Netlink")?;

    command::run(cmd, &mut dl, &mut printer).await?;
    Ok(())
}
