// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storywerk — layered multi-page story editor, command-line front end.
//
// Entry point. Initialises logging, resolves settings, and dispatches the
// subcommand.

mod commands;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::ExportRequest;
use services::settings;

#[derive(Parser, Debug)]
#[command(
    name = "storywerk",
    version,
    about = "Create, inspect, and export layered eight-page stories"
)]
struct Cli {
    /// Settings file (defaults to the saved settings, if any)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an empty eight-page story
    New {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Print pages and layers, top layer first
    Inspect {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Render every page to PNG, or to one PDF with --pdf
    Export {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
        #[arg(long)]
        pdf: bool,
        #[arg(long, value_name = "PX")]
        width: Option<u32>,
        #[arg(long, value_name = "PX")]
        height: Option<u32>,
        /// Font file for text layers; repeatable
        #[arg(long = "font", value_name = "FILE")]
        fonts: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "storywerk failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> storywerk_core::error::Result<()> {
    let config = settings::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::New { path } => commands::new_document(&path, &config),
        Command::Inspect { path } => {
            print!("{}", commands::inspect(&path)?);
            Ok(())
        }
        Command::Export {
            path,
            out,
            pdf,
            width,
            height,
            fonts,
        } => {
            let request = ExportRequest {
                out,
                pdf,
                width,
                height,
                fonts,
            };
            let written = commands::export(&path, config, &request).await?;
            for file in written {
                println!("{}", file.display());
            }
            Ok(())
        }
    }
}
