use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use omfsig::commands::{generate_command, match_command};
use omfsig::init_logging;

/// Build routine fingerprints from OMF libraries and locate them in disassembly.
///
/// This CLI is a thin wrapper around `omfsig-core` (exposed in code as `omfsig_core`).
#[derive(Parser, Debug)]
#[command(
    name = "omfsig",
    version,
    about = "Operand-blind routine signatures for OMF libraries",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a signature file from an OMF library.
    ///
    /// The library is unpacked with `wlib` and each member disassembled with
    /// `wdis`. A directory of existing `*.lst` listings is accepted instead.
    Generate {
        /// Path to the OMF library (*.lib) or a directory of listings.
        input: String,

        /// Write signatures to FILE instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// JSON generator config (pattern limit, code segment class, tool paths).
        #[arg(long, value_name = "FILE")]
        config: Option<String>,

        /// Path to the `wlib` librarian. Defaults to $OMFSIG_WLIB or `wlib`.
        #[arg(long)]
        wlib: Option<String>,

        /// Path to the `wdis` disassembler. Defaults to $OMFSIG_WDIS or `wdis`.
        #[arg(long)]
        wdis: Option<String>,
    },

    /// Locate signatures in a disassembly source file.
    Match {
        /// Path to the disassembly source file (*.S).
        source: String,

        /// Path to a signature file created by `generate`.
        signatures: String,

        /// Write matches to FILE instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Emit JSON instead of `label address` lines.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version are successful exits; every usage error exits 1.
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.verbose);
    tracing::debug!(version = omfsig_core::version(), "omfsig starting");

    match cli.command {
        Command::Generate { input, output, config, wlib, wdis } => {
            generate_command(&input, output.as_deref(), config.as_deref(), wlib, wdis)?
        }
        Command::Match { source, signatures, output, json } => {
            match_command(&source, &signatures, output.as_deref(), json)?
        }
    }

    Ok(())
}
