//! Cryptext CLI - Passphrase-based text encryption
//!
//! Thin adapter around [`cryptext::CipherService`]: reads text and a
//! passphrase, invokes the matching operation, and prints either the result
//! or a fixed failure message. The structured error kind goes to stderr for
//! diagnostics; passphrases and plaintext are never logged.

use std::io::{self, BufRead, Read};
use std::process;

use clap::{Parser, Subcommand};
use zeroize::Zeroizing;

use cryptext::passphrase::{LinePassphraseReader, PassphraseReader, TerminalPassphraseReader};
use cryptext::{CipherService, CryptextError, ErrorCategory, ErrorKind, Result};

/// Shown in place of a result when an operation fails.
const OPERATION_FAILED_MSG: &str = "Please check the decryption key or text string and try again.";

#[derive(Parser)]
#[command(name = "cryptext")]
#[command(version)]
#[command(about = "Passphrase-based text encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from the first line of stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text into an armored envelope
    #[command(alias = "e")]
    Encrypt {
        /// Text to encrypt; read from stdin when omitted
        text: Option<String>,
    },

    /// Decrypt an armored envelope back into text
    #[command(alias = "d")]
    Decrypt {
        /// Envelope to decrypt; read from stdin when omitted
        envelope: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let service = CipherService::default();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let result = run(&cli, &service, &mut input);
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            report_failure(&e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli, service: &CipherService, input: &mut impl BufRead) -> Result<String> {
    // With --passphrase-stdin the passphrase occupies the first stdin line
    // and any text read from stdin follows it.
    let passphrase = read_passphrase(cli.passphrase_stdin, &mut *input)?;

    match &cli.command {
        Commands::Encrypt { text } => {
            let text = read_input(text.as_deref(), input)?;
            service.encrypt(&text, &passphrase)
        }
        Commands::Decrypt { envelope } => {
            let envelope = read_input(envelope.as_deref(), input)?;
            service.decrypt(envelope.trim(), &passphrase)
        }
    }
}

fn read_passphrase(use_stdin: bool, input: &mut impl BufRead) -> Result<Zeroizing<String>> {
    if use_stdin {
        LinePassphraseReader::new(input).read_passphrase()
    } else {
        TerminalPassphraseReader.read_passphrase()
    }
}

/// Returns the positional argument when given, otherwise reads the rest of
/// stdin with one trailing newline stripped.
fn read_input(arg: Option<&str>, input: &mut impl BufRead) -> Result<String> {
    match arg {
        Some(value) => Ok(value.to_string()),
        None => {
            let mut text = String::new();
            input.read_to_string(&mut text).map_err(|e| {
                CryptextError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("error reading text from stdin: {}", e),
                    e,
                )
            })?;
            if text.ends_with('\n') {
                text.pop();
                if text.ends_with('\r') {
                    text.pop();
                }
            }
            Ok(text)
        }
    }
}

fn report_failure(err: &CryptextError) {
    match err.kind {
        Some(ErrorKind::Io) | Some(ErrorKind::PassphraseUnavailable) => {
            eprintln!("error: {}", err);
        }
        kind => {
            println!("{}", OPERATION_FAILED_MSG);
            let kind = kind.map_or_else(|| "unknown".to_string(), |k| format!("{:?}", k));
            eprintln!("error [{:?}/{}]: {}", err.category, kind, err);
        }
    }
}
