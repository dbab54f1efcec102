//! Minimal PEM armour for key files: a labelled header and footer around the encoded key,
//! wrapped at 64 columns.

use color_eyre::eyre::{Result, bail, eyre};

pub const SECRET_KEY_LABEL: &str = "BFV SECRET KEY";
pub const PUBLIC_KEY_LABEL: &str = "BFV PUBLIC KEY";

const LINE_WIDTH: usize = 64;

pub fn armor(label: &str, body: &[u8]) -> String {
    let mut out = format!("-----BEGIN {}-----\n", label);
    for line in body.chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}

/// Strips the armour named `label` and returns the joined body.
pub fn unarmor(label: &str, text: &str) -> Result<Vec<u8>> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);

    let mut lines = text.lines().map(str::trim).skip_while(|line| line.is_empty());

    match lines.next() {
        Some(line) if line == begin => {}
        Some(line) => bail!("expected `{}`, found `{}`", begin, line),
        None => bail!("empty key file"),
    }

    let mut body = Vec::new();
    for line in lines.by_ref() {
        if line == end {
            return if body.is_empty() {
                Err(eyre!("no key material between `{}` and `{}`", begin, end))
            } else {
                Ok(body)
            };
        }
        body.extend_from_slice(line.as_bytes());
    }

    bail!("missing `{}`", end)
}
