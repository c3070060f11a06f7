//! Command-line interface for the fwsign firmware image tool.
//!
//! Builds single-signed firmware images, counter-signs them, decodes their
//! headers and verifies them against public keys.

use clap::{ArgAction, Parser, Subcommand};
use fwsign::crypto::{export, generate_signing_key, load_signing_key, load_verifying_key};
use fwsign::FwSign;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fwsign")]
#[command(about = "Dual-signed firmware image tool")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a P-256 key pair as embeddable C headers
    GenKey {
        /// Index used in file and variable names (private_key{N}.h)
        #[arg(long, default_value_t = 1)]
        index: u32,

        /// Directory for the generated headers
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Add the header block and first signatures to a raw binary
    AddHeader {
        /// Private key of the first signer
        #[arg(short = 'k', long, env = "FWSIGN_PRIVATE_KEY")]
        private_key: PathBuf,

        /// Raw firmware binary
        #[arg(short, long)]
        input: PathBuf,

        /// Version manifest (firmware version, hardware version, magic number)
        #[arg(long = "version", value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Output image (default: <input stem>_Header.bin)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Attach the second signature to a single-signed image
    SignHeader {
        /// Private key of the second signer
        #[arg(short = 'k', long, env = "FWSIGN_SECOND_PRIVATE_KEY")]
        private_key: PathBuf,

        /// Single-signed image
        #[arg(short, long)]
        input: PathBuf,

        /// Output image (default: <input stem>_Signed.bin)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Allow the second signature to come from the first signer's key
        #[arg(long)]
        allow_same_key: bool,
    },

    /// Decode and print the header of an image
    DecodeHeader {
        /// Image to decode
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Verify an image against the signers' public keys
    Verify {
        /// Public key of the first signer
        #[arg(short = 'p', long, env = "FWSIGN_PUBLIC_KEY")]
        public_key: PathBuf,

        /// Public key of the second signer
        #[arg(short = 's', long)]
        second_public_key: Option<PathBuf>,

        /// Image to verify
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    match cli.command {
        Command::GenKey { index, out_dir } => gen_key(index, &out_dir)?,
        Command::AddHeader {
            private_key,
            input,
            manifest,
            output,
        } => {
            let output = output.unwrap_or_else(|| sibling(&input, "_Header.bin"));
            FwSign::new()
                .signing_key(load_signing_key(&private_key)?)
                .add_header(&input, &manifest, &output)?;
            println!("Wrote: {}", output.display());
        }
        Command::SignHeader {
            private_key,
            input,
            output,
            allow_same_key,
        } => {
            let output = output.unwrap_or_else(|| sibling(&input, "_Signed.bin"));
            FwSign::new()
                .signing_key(load_signing_key(&private_key)?)
                .allow_same_key(allow_same_key)
                .sign_header(&input, &output)?;
            println!("Wrote: {}", output.display());
        }
        Command::DecodeHeader { input } => {
            let report = fwsign::decode_header(&input)?;
            println!("{report}");
        }
        Command::Verify {
            public_key,
            second_public_key,
            input,
        } => {
            let first = load_verifying_key(&public_key)?;
            let second = second_public_key.map(load_verifying_key).transpose()?;
            let report = fwsign::verify_file(&input, &first, second.as_ref())?;
            println!("{report}");
            if !report.is_trusted() {
                return Err(format!("{} is not trusted", input.display()).into());
            }
        }
    }

    Ok(())
}

fn gen_key(index: u32, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let key = generate_signing_key();
    let headers = export::key_pair_headers(&key, index);

    std::fs::create_dir_all(out_dir)?;
    let private_path = out_dir.join(&headers.private_file_name);
    let public_path = out_dir.join(&headers.public_file_name);
    std::fs::write(&private_path, &headers.private_header)?;
    std::fs::write(&public_path, &headers.public_header)?;

    println!("Private key: {}", private_path.display());
    println!("Public key: {}", public_path.display());
    Ok(())
}

/// `dir/fw.bin` -> `dir/fw_Header.bin`, `dir/fw_Header.bin` -> `dir/fw_Signed.bin`
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("firmware");
    let stem = stem.strip_suffix("_Header").unwrap_or(stem);
    input.with_file_name(format!("{stem}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_output_names() {
        assert_eq!(
            sibling(Path::new("out/BlinkLed.bin"), "_Header.bin"),
            PathBuf::from("out/BlinkLed_Header.bin")
        );
        assert_eq!(
            sibling(Path::new("out/BlinkLed_Header.bin"), "_Signed.bin"),
            PathBuf::from("out/BlinkLed_Signed.bin")
        );
    }

    #[test]
    fn test_parse_sign_header() {
        let cli = Cli::try_parse_from([
            "fwsign", "-vv", "sign-header", "-k", "private_key2.h", "--input", "fw_Header.bin",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::SignHeader { private_key, output, allow_same_key, .. } => {
                assert_eq!(private_key, PathBuf::from("private_key2.h"));
                assert!(output.is_none());
                assert!(!allow_same_key);
            }
            _ => panic!("expected sign-header"),
        }
    }
}
