use clap::{Parser, Subcommand};

mod asn1parse;
mod enc;
mod pkey;

/// cryptcore command-line tool for DER inspection and block cipher modes.
#[derive(Parser)]
#[command(name = "cryptcore")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the structure of a DER file.
    Asn1parse {
        /// Input file (raw DER).
        #[arg(short, long)]
        input: String,
        /// Start parsing at this byte offset.
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Number of bytes to parse (default: to the end of the file).
        #[arg(long)]
        length: Option<usize>,
    },
    /// Symmetric encryption/decryption with a block cipher mode.
    Enc(enc::EncArgs),
    /// Display or convert an RSA key.
    Pkey {
        /// Input file (DER: SubjectPublicKeyInfo, RSAPublicKey or RSAPrivateKey).
        #[arg(short, long)]
        input: String,
        /// Print key details.
        #[arg(short, long)]
        text: bool,
        /// Write the SubjectPublicKeyInfo to this file.
        #[arg(long)]
        pubout: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Asn1parse {
            input,
            offset,
            length,
        } => asn1parse::run(input, *offset, *length),
        Commands::Enc(args) => enc::run(args),
        Commands::Pkey {
            input,
            text,
            pubout,
        } => pkey::run(input, *text, pubout.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
