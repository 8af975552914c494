use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use omfsig_core::listing::text::{encode_latin1, write_latin1};
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks warn, info, or debug.
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Write `text` as ISO-8859-1 to `output`, or to stdout when no file is given.
pub fn emit(output: Option<&str>, text: &str) -> Result<()> {
    match output {
        Some(path) => write_latin1(Path::new(path), text)
            .with_context(|| format!("Failed to write output file: {path}")),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&encode_latin1(text)).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")
        }
    }
}
