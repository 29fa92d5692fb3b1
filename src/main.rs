//! Command-line entry point for the TSS recovery toolkit.
//!
//! All terminal interaction lives here: flag parsing, passphrase prompts and
//! logging setup. The recovery flows themselves take their inputs as plain
//! values and report typed errors, which this binary prints to the log
//! stream before exiting non-zero.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tss_recovery::{
    ckd::ExtendedKey,
    errors::{Error, Result},
    recovery::{self, GroupSource, RecoverOptions},
    wallet::Token,
};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(
    name = "tss-recovery-tool",
    version,
    about = "Reconstruct the root private key from TSS recovery group files and derive child keys"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    recover: RecoverArgs,
}

#[derive(Args)]
struct RecoverArgs {
    /// TSS recovery group files, comma separated, such as
    /// recovery/recovery-secrets-node1-time1,recovery/recovery-secrets-node2-time2
    #[arg(long, value_delimiter = ',')]
    recovery_group_files: Vec<PathBuf>,

    /// Recovery group id
    #[arg(long)]
    group_id: Option<String>,

    /// Show the reconstructed TSS root private key
    #[arg(long)]
    show_root_private_key: bool,

    /// Key HD derivation paths, comma separated
    #[arg(long, value_delimiter = ',')]
    paths: Vec<String>,

    /// Address csv file containing HD derivation paths
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// Directory the derived-keys csv file is written to
    #[arg(long, default_value = "recovery")]
    csv_output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Reconstruct the root public key from share public keys and verify the
    /// recovery group file parameters
    Verify {
        #[arg(long, value_delimiter = ',')]
        recovery_group_files: Vec<PathBuf>,

        #[arg(long)]
        group_id: String,
    },
    /// Derive child public keys and addresses from an extended root key
    Derive {
        /// Extended root key, base58
        #[arg(long)]
        key: String,

        /// Key HD derivation paths, comma separated
        #[arg(long, value_delimiter = ',')]
        paths: Vec<String>,

        /// Token symbol to render addresses for
        #[arg(long)]
        token: Option<String>,
    },
    /// Print the tool version
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Version) => {
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Verify {
            recovery_group_files,
            group_id,
        }) => {
            let files = read_group_files(&recovery_group_files)?;
            recovery::verify(&files, &group_id, &mut prompt_passphrase)
        }
        Some(Command::Derive { key, paths, token }) => derive(&key, &paths, token.as_deref()),
        None => {
            let args = cli.recover;
            if !args.paths.is_empty() && args.csv_file.is_some() {
                return Err(Error::BadInput(
                    "flags 'paths' and 'csv-file' cannot be combined".into(),
                ));
            }
            let options = RecoverOptions {
                group_id: args.group_id.unwrap_or_default(),
                show_root_private: args.show_root_private_key,
                paths: args.paths,
                csv_file: args.csv_file,
                csv_output_dir: args.csv_output_dir,
            };
            let files = read_group_files(&args.recovery_group_files)?;
            recovery::recover(&files, &options, &mut prompt_passphrase)
        }
    }
}

/// Standalone derivation from a serialized extended key, optionally
/// rendering token addresses per derived path.
fn derive(key: &str, paths: &[String], token: Option<&str>) -> Result<()> {
    if key.is_empty() {
        return Err(Error::BadInput("no root key".into()));
    }
    let root = ExtendedKey::b58_deserialize(key)?;
    let token = token.map(Token::from_name).transpose()?;

    for path in paths {
        let derived = recovery::derive_path(&root, path)?;
        if let Some(token) = token {
            for address in token.generate_addresses(&derived)? {
                info!(
                    "Token {token} Address Type: {}, Address: {}",
                    address.kind, address.address
                );
            }
        }
    }
    Ok(())
}

fn read_group_files(paths: &[PathBuf]) -> Result<Vec<GroupSource>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|e| {
                Error::BadInput(format!("recovery group file {}: {e}", path.display()))
            })?;
            Ok(GroupSource {
                name: path.display().to_string(),
                bytes,
            })
        })
        .collect()
}

/// Prompt for the passphrase of one group file, hiding the input. Empty and
/// short passphrases are rejected outright.
fn prompt_passphrase(file: &str) -> Result<Zeroizing<String>> {
    println!("Enter password to decrypt share secret from {file}");
    let raw = Zeroizing::new(
        rpassword::prompt_password("Password:")
            .map_err(|e| Error::BadInput(format!("cannot read password from terminal: {e}")))?,
    );
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::BadInput("empty password is not allowed".into()));
    }
    if trimmed.len() < 8 {
        return Err(Error::BadInput("password is too short".into()));
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}
