//! Symmetric encryption/decryption command.
//!
//! Supported ciphers: aes-128, aes-192, aes-256, in any of the modes
//! ecb, cbc, cfb, ofb, cts. The input is streamed in 4 KiB chunks.

use std::fs::File;
use std::io::{BufWriter, Read, Write};

use cryptcore_crypto::aes::{AesKey, AES_BLOCK_SIZE};
use cryptcore_crypto::modes::{CipherMode, ModeParams, PaddingMode};
use zeroize::Zeroizing;

const CHUNK_SIZE: usize = 4096;

#[derive(clap::Args)]
pub struct EncArgs {
    /// Cipher algorithm (aes-128, aes-192, aes-256).
    #[arg(short, long, default_value = "aes-128")]
    cipher: String,
    /// Mode of operation (ecb, cbc, cfb, ofb, cts).
    #[arg(short, long, default_value = "cbc")]
    mode: String,
    /// Padding for ecb/cbc (none, zeros, pkcs7).
    #[arg(short, long, default_value = "pkcs7")]
    padding: String,
    /// Key as hex.
    #[arg(short, long)]
    key: String,
    /// IV as hex (every mode except ecb).
    #[arg(long)]
    iv: Option<String>,
    /// CFB segment size in bytes.
    #[arg(long)]
    feedback: Option<usize>,
    /// Decrypt mode.
    #[arg(short, long)]
    decrypt: bool,
    /// Input file.
    #[arg(short, long)]
    input: String,
    /// Output file.
    #[arg(short, long)]
    output: String,
}

pub fn run(args: &EncArgs) -> Result<(), Box<dyn std::error::Error>> {
    let op = if args.decrypt { "Decrypting" } else { "Encrypting" };
    eprintln!(
        "{op} {} -> {} with {}-{}",
        args.input, args.output, args.cipher, args.mode
    );

    let key = Zeroizing::new(hex::decode(&args.key)?);
    let expected = key_len(&args.cipher)?;
    if key.len() != expected {
        return Err(format!(
            "{} needs a {expected}-byte key, got {} bytes",
            args.cipher,
            key.len()
        )
        .into());
    }
    let cipher = AesKey::new(&key)?;

    let mode: CipherMode = args.mode.parse()?;
    let padding: PaddingMode = args.padding.parse()?;
    let mut params = ModeParams::new(mode).with_padding(padding);
    if let Some(iv) = &args.iv {
        params = params.with_iv(&hex::decode(iv)?);
    }
    if let Some(k) = args.feedback {
        params = params.with_feedback_size(k);
    }
    let mut transform = if args.decrypt {
        params.decryptor(cipher)?
    } else {
        params.encryptor(cipher)?
    };

    let mut reader = File::open(&args.input)?;
    let mut writer = BufWriter::new(File::create(&args.output)?);
    let mut inbuf = Zeroizing::new(vec![0u8; CHUNK_SIZE]);
    // CTS may release up to two held-back blocks along with a full chunk.
    let mut outbuf = Zeroizing::new(vec![0u8; CHUNK_SIZE + 2 * AES_BLOCK_SIZE]);
    let (mut read, mut written) = (0usize, 0usize);

    loop {
        let n = reader.read(&mut inbuf)?;
        if n == 0 {
            break;
        }
        let m = transform.transform_block(&inbuf[..n], &mut outbuf)?;
        writer.write_all(&outbuf[..m])?;
        read += n;
        written += m;
    }
    let tail = Zeroizing::new(transform.transform_final_block(&[])?);
    writer.write_all(&tail)?;
    writer.flush()?;
    written += tail.len();

    log::info!("enc: {read} bytes in, {written} bytes out");
    eprintln!("Wrote {written} bytes to {}", args.output);
    Ok(())
}

fn key_len(cipher: &str) -> Result<usize, Box<dyn std::error::Error>> {
    match cipher.to_lowercase().as_str() {
        "aes-128" => Ok(16),
        "aes-192" => Ok(24),
        "aes-256" => Ok(32),
        _ => Err(format!("cipher '{cipher}' not supported. Supported: aes-128, aes-192, aes-256").into()),
    }
}
