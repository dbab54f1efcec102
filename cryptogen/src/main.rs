mod commands;
mod pem;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use he_ledger::preset::{DEFAULT_PROFILE, resolve};

use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cryptogen",
    version,
    about = "Key generation and party-side helpers for the homomorphic report ledger"
)]
struct Cli {
    /// Parameter profile the keys belong to.
    #[arg(short, long, global = true, default_value = DEFAULT_PROFILE)]
    param: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a key pair into `<outpath>/secret.pem` and `<outpath>/public.pem`.
    Genkey {
        #[arg(short, long, default_value = ".out")]
        outpath: PathBuf,
    },
    /// Encrypt a value and print the base64 ciphertext.
    Encrypt {
        #[arg(long)]
        pubkey: PathBuf,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Decrypt a base64 ciphertext, such as a query result.
    Decrypt {
        #[arg(long)]
        secret: PathBuf,
        ciphertext: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::init();

    let cli = Cli::parse();
    let profile = resolve(&cli.param)?;

    match cli.command {
        Command::Genkey { outpath } => {
            let (secret, public) = commands::genkey(profile, &outpath)?;
            println!("{}\n{}", secret.display(), public.display());
        }
        Command::Encrypt { pubkey, value } => {
            println!("{}", commands::encrypt(profile, &pubkey, value)?);
        }
        Command::Decrypt { secret, ciphertext } => {
            println!("{}", commands::decrypt(profile, &secret, &ciphertext)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["cryptogen", "genkey"]);
        assert_eq!(cli.param, "PN13QP218");
        assert!(matches!(cli.command, Command::Genkey { outpath } if outpath == PathBuf::from(".out")));
    }

    #[test]
    fn test_negative_value() {
        let cli = Cli::parse_from(["cryptogen", "encrypt", "--pubkey", "k.pem", "-p", "PN12QP109", "-1000"]);
        assert_eq!(cli.param, "PN12QP109");
        assert!(matches!(cli.command, Command::Encrypt { value: -1000, .. }));
    }
}
