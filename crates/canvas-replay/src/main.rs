//! Replay a JSON script of canvas operations and print the resulting state.
//!
//! Usage: `canvas-replay <script.json>`
//!
//! The store configuration comes from `CANVAS_MINT_PRICE`, `CANVAS_ADMIN`
//! and `CANVAS_TREASURY`, with the script's own `mint_price` and `admin`
//! taking precedence. Log verbosity follows `RUST_LOG`.

mod runner;
mod script;

use std::io::Write;

use canvas_store::CanvasConfig;
use tracing::info;

use crate::script::Script;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("canvas_replay=info".parse()?)
                .add_directive("canvas_store=info".parse()?),
        )
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eyre::bail!("usage: canvas-replay <script.json>");
    };

    let script = Script::load(&path)?;
    info!("Replaying {} step(s) from {path}", script.steps.len());

    let report = runner::replay(&script, CanvasConfig::from_env());

    let failed = report.steps.iter().filter(|s| s.error.is_some()).count();
    info!(
        "Done: {} pixel(s), {} log entries, {} event(s), {failed} failed step(s)",
        report.pixels.len(),
        report.log.len(),
        report.events.len()
    );

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;
    Ok(())
}
