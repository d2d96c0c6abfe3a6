//! OBJECT IDENTIFIER values.
//!
//! The codec itself only moves encoded OID bytes around; [`Oid`] converts
//! between those bytes, arc lists and dotted text.

use core::fmt;
use core::str::FromStr;

use cryptcore_types::CryptoError;

/// An OID as a sequence of arc values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Create an OID from arc values.
    ///
    /// Fails unless there are at least two arcs, the first is 0, 1 or 2,
    /// the second is below 40 under roots 0 and 1, and the packed first
    /// subidentifier `first * 40 + second` fits in 32 bits.
    pub fn new(arcs: &[u32]) -> Result<Self, CryptoError> {
        match arcs {
            [first, second, ..] if packed_head(*first, *second).is_some() => Ok(Self {
                arcs: arcs.to_vec(),
            }),
            _ => Err(CryptoError::InvalidArg),
        }
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Encode to DER value bytes (no tag or length).
    pub fn to_der_value(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let [first, second, rest @ ..] = self.arcs.as_slice() {
            // Checked on construction.
            encode_arc(&mut buf, packed_head(*first, *second).unwrap_or_default());
            for &arc in rest {
                encode_arc(&mut buf, arc);
            }
        }
        buf
    }

    /// Parse DER value bytes.
    pub fn from_der_value(data: &[u8]) -> Result<Self, CryptoError> {
        if data.is_empty() {
            return Err(CryptoError::Asn1Malformed);
        }
        let mut arcs = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let (arc, consumed) = decode_arc(&data[i..])?;
            if arcs.is_empty() {
                // The first subidentifier packs the first two arcs.
                let top = (arc / 40).min(2);
                arcs.push(top);
                arcs.push(arc - top * 40);
            } else {
                arcs.push(arc);
            }
            i += consumed;
        }
        Ok(Self { arcs })
    }

    /// Dotted text form, e.g. `"1.2.840.113549.1.1.1"`.
    pub fn to_dot_string(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dot_string())
    }
}

impl FromStr for Oid {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| CryptoError::InvalidArg))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&arcs)
    }
}

/// The first subidentifier, which packs the first two arcs.
fn packed_head(first: u32, second: u32) -> Option<u32> {
    match first {
        0 | 1 if second >= 40 => None,
        0..=2 => (first * 40).checked_add(second),
        _ => None,
    }
}

/// Base-128 encoding, high bit set on every byte but the last.
fn encode_arc(buf: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7F) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        buf.push(groups[i] | continuation);
    }
}

fn decode_arc(data: &[u8]) -> Result<(u32, usize), CryptoError> {
    if data.first() == Some(&0x80) {
        // Leading 0x80 is a non-minimal subidentifier.
        return Err(CryptoError::Asn1Malformed);
    }
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(CryptoError::Asn1Malformed);
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(CryptoError::Asn1Malformed)
}

/// OIDs used by the key-material layer.
pub mod known {
    use super::Oid;

    pub fn rsa_encryption() -> Oid {
        Oid {
            arcs: vec![1, 2, 840, 113549, 1, 1, 1],
        }
    }

    pub fn dsa() -> Oid {
        Oid {
            arcs: vec![1, 2, 840, 10040, 4, 1],
        }
    }

    pub fn sha1() -> Oid {
        Oid {
            arcs: vec![1, 3, 14, 3, 2, 26],
        }
    }

    pub fn sha256() -> Oid {
        Oid {
            arcs: vec![2, 16, 840, 1, 101, 3, 4, 2, 1],
        }
    }

    /// Short name of a known OID, for display.
    pub fn name(oid: &Oid) -> Option<&'static str> {
        match oid.arcs() {
            [1, 2, 840, 113549, 1, 1, 1] => Some("rsaEncryption"),
            [1, 2, 840, 10040, 4, 1] => Some("dsaEncryption"),
            [1, 3, 14, 3, 2, 26] => Some("sha1"),
            [2, 16, 840, 1, 101, 3, 4, 2, 1] => Some("sha256"),
            _ => None,
        }
    }
}
