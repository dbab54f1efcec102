use crate::pem::{self, PUBLIC_KEY_LABEL, SECRET_KEY_LABEL};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use color_eyre::eyre::{Result, WrapErr};
use he_ledger::keypair::{KeyPair, PublicKey, SecretKey};
use he_ledger::preset::ParameterProfile;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SECRET_KEY_FILE: &str = "secret.pem";
pub const PUBLIC_KEY_FILE: &str = "public.pem";

/// Generates a key pair and writes both halves under `outpath`, returning the file paths.
pub fn genkey(profile: Arc<ParameterProfile>, outpath: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(outpath)
        .wrap_err_with(|| format!("creating {}", outpath.display()))?;

    let keys = KeyPair::generate(profile)?;

    let secret_path = outpath.join(SECRET_KEY_FILE);
    let public_path = outpath.join(PUBLIC_KEY_FILE);

    write_secret(
        &secret_path,
        pem::armor(SECRET_KEY_LABEL, &keys.secret_key.encode()?).as_bytes(),
    )?;
    fs::write(
        &public_path,
        pem::armor(PUBLIC_KEY_LABEL, &keys.public_key.encode()?),
    )
    .wrap_err_with(|| format!("writing {}", public_path.display()))?;

    log::info!(
        "Wrote {} and {}",
        secret_path.display(),
        public_path.display()
    );

    Ok((secret_path, public_path))
}

/// Encrypts `value` under the public key stored at `pubkey` and returns the base64 ciphertext.
pub fn encrypt(profile: Arc<ParameterProfile>, pubkey: &Path, value: i64) -> Result<String> {
    let encoded = read_armored(pubkey, PUBLIC_KEY_LABEL)?;
    let public_key = PublicKey::decode_for(profile, &encoded)?;

    Ok(STANDARD.encode(public_key.encrypt(value)?))
}

pub fn decrypt(profile: Arc<ParameterProfile>, secret: &Path, ciphertext: &str) -> Result<i64> {
    let encoded = read_armored(secret, SECRET_KEY_LABEL)?;
    let secret_key = SecretKey::decode_for(profile, &encoded)?;

    let ciphertext = STANDARD
        .decode(ciphertext.trim())
        .wrap_err("ciphertext is not valid base64")?;

    Ok(secret_key.decrypt(&ciphertext)?)
}

fn read_armored(path: &Path, label: &str) -> Result<Vec<u8>> {
    let text =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    pem::unarmor(label, &text).wrap_err_with(|| format!("parsing {}", path.display()))
}

fn write_secret(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .wrap_err_with(|| format!("writing {}", path.display()))
}
