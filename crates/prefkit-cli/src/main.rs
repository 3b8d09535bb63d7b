// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// prefkit — inspect and edit a settings store from the command line.
//
// Entry point. Initialises logging, opens the process-wide store (native
// platform backend or SQLite), and runs one subcommand against it.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use prefkit_core::InitContext;
use prefkit_core::error::Result;
use prefkit_store::SettingsStore;

use commands::Command;

#[derive(Parser)]
#[command(name = "prefkit")]
#[command(about = "Inspect and edit a prefkit settings store")]
#[command(version)]
struct Cli {
    /// Directory holding the store (default: $XDG_DATA_HOME/<namespace>)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Application namespace; names the default store file
    #[arg(long, global = true, default_value = "prefkit")]
    namespace: String,

    /// Use the platform's native preference store instead of SQLite
    #[arg(long, global = true)]
    native: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let ctx = match cli.data_dir {
        Some(dir) => InitContext::new(dir, cli.namespace.as_str()),
        None => InitContext::from_env(cli.namespace.as_str()),
    };

    let store = match prefkit_store::get_instance_with(|| open_store(&ctx, cli.native)) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "could not open settings store");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = commands::run(&store, cli.command, &mut stdout) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Open the store for `ctx`, preferring the native backend when asked and
/// available.
fn open_store(ctx: &InitContext, native: bool) -> Result<SettingsStore> {
    if native {
        if prefkit_bridge::has_native_backend() {
            let backend = prefkit_bridge::platform_backend(Some(&ctx.namespace))?;
            tracing::info!(backend = backend.backend_name(), "using native preference store");
            return Ok(SettingsStore::new(backend));
        }
        tracing::warn!("no native preference store on this platform; using SQLite");
    }
    SettingsStore::open(ctx)
}
