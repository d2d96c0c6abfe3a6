//! RSA key parameters and their DER encodings.
//!
//! Three layouts are recognized on import:
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm         AlgorithmIdentifier,   -- rsaEncryption, NULL
//!     subjectPublicKey  BIT STRING             -- RSAPublicKey
//! }
//!
//! RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }
//!
//! RSAPrivateKey ::= SEQUENCE {
//!     version INTEGER (0), modulus, publicExponent, privateExponent,
//!     prime1, prime2, exponent1, exponent2, coefficient
//! }
//! ```
//!
//! Only the encodings are handled here; no RSA arithmetic is performed.

use core::fmt;

use cryptcore_types::PkiError;
use cryptcore_utils::asn1::{Builder, Parser};
use cryptcore_utils::oid::{known, Oid};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// DER layout of an RSA key blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// X.509 SubjectPublicKeyInfo.
    SubjectPublicKeyInfo,
    /// PKCS#1 RSAPublicKey.
    RsaPublicKey,
    /// PKCS#1 RSAPrivateKey.
    RsaPrivateKey,
}

impl KeyFormat {
    /// Work out which layout `der` uses from the shape of its outer
    /// SEQUENCE. The contents are not validated.
    pub fn detect(der: &[u8]) -> Result<Self, PkiError> {
        let mut outer = Parser::new(der);
        let mut seq = outer.get_sequence()?;
        outer.at_end()?;

        if seq.is_sequence() {
            return Ok(KeyFormat::SubjectPublicKeyInfo);
        }
        if !seq.is_integer() {
            return Err(PkiError::UnsupportedKeyFormat(format!(
                "unexpected first element tag {:#04x}",
                seq.peek_type()?
            )));
        }
        let mut count = 0;
        while !seq.is_empty() {
            seq.skip()?;
            count += 1;
        }
        match count {
            2 => Ok(KeyFormat::RsaPublicKey),
            n if n >= 9 => Ok(KeyFormat::RsaPrivateKey),
            n => Err(PkiError::UnsupportedKeyFormat(format!("SEQUENCE of {n} elements"))),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFormat::SubjectPublicKeyInfo => f.write_str("SubjectPublicKeyInfo"),
            KeyFormat::RsaPublicKey => f.write_str("RSAPublicKey"),
            KeyFormat::RsaPrivateKey => f.write_str("RSAPrivateKey"),
        }
    }
}

/// CRT private components, wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
struct PrivateComponents {
    d: Vec<u8>,
    p: Vec<u8>,
    q: Vec<u8>,
    dp: Vec<u8>,
    dq: Vec<u8>,
    inverse_q: Vec<u8>,
}

impl PrivateComponents {
    fn fields(&self) -> [&[u8]; 6] {
        [&self.d, &self.p, &self.q, &self.dp, &self.dq, &self.inverse_q]
    }
}

/// RSA key parameters as unsigned big-endian magnitudes.
#[derive(Clone)]
pub struct RsaKeyParameters {
    modulus: Vec<u8>,
    exponent: Vec<u8>,
    private: Option<PrivateComponents>,
}

impl RsaKeyParameters {
    /// Public key from modulus and public exponent. Leading zero bytes are
    /// dropped; both values must be non-zero.
    pub fn new(modulus: &[u8], exponent: &[u8]) -> Result<Self, PkiError> {
        let modulus = trim_magnitude(modulus);
        let exponent = trim_magnitude(exponent);
        if modulus.is_empty() || exponent.is_empty() {
            return Err(PkiError::UnsupportedKeyFormat("zero modulus or exponent".into()));
        }
        Ok(Self {
            modulus: modulus.to_vec(),
            exponent: exponent.to_vec(),
            private: None,
        })
    }

    /// Attach the private exponent and CRT values.
    pub fn with_private_components(
        mut self,
        d: &[u8],
        p: &[u8],
        q: &[u8],
        dp: &[u8],
        dq: &[u8],
        inverse_q: &[u8],
    ) -> Self {
        self.private = Some(PrivateComponents {
            d: trim_magnitude(d).to_vec(),
            p: trim_magnitude(p).to_vec(),
            q: trim_magnitude(q).to_vec(),
            dp: trim_magnitude(dp).to_vec(),
            dq: trim_magnitude(dq).to_vec(),
            inverse_q: trim_magnitude(inverse_q).to_vec(),
        });
        self
    }

    /// Import any of the three supported DER layouts.
    pub fn from_der(der: &[u8]) -> Result<Self, PkiError> {
        let format = KeyFormat::detect(der)?;
        log::debug!("rsa key: importing {format} ({} bytes)", der.len());
        let mut outer = Parser::new(der);
        let key = match format {
            KeyFormat::SubjectPublicKeyInfo => parse_spki(&mut outer)?,
            KeyFormat::RsaPublicKey => parse_public(&mut outer)?,
            KeyFormat::RsaPrivateKey => parse_private(&mut outer)?,
        };
        outer.at_end()?;
        Ok(key)
    }

    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    /// Size of the modulus in bits.
    pub fn modulus_bits(&self) -> usize {
        match self.modulus.first() {
            Some(&top) => self.modulus.len() * 8 - top.leading_zeros() as usize,
            None => 0,
        }
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    pub fn private_exponent(&self) -> Option<&[u8]> {
        self.private.as_ref().map(|k| k.d.as_slice())
    }

    pub fn prime1(&self) -> Option<&[u8]> {
        self.private.as_ref().map(|k| k.p.as_slice())
    }

    pub fn prime2(&self) -> Option<&[u8]> {
        self.private.as_ref().map(|k| k.q.as_slice())
    }

    pub fn exponent1(&self) -> Option<&[u8]> {
        self.private.as_ref().map(|k| k.dp.as_slice())
    }

    pub fn exponent2(&self) -> Option<&[u8]> {
        self.private.as_ref().map(|k| k.dq.as_slice())
    }

    pub fn coefficient(&self) -> Option<&[u8]> {
        self.private.as_ref().map(|k| k.inverse_q.as_slice())
    }

    /// A copy without the private components.
    pub fn public_only(&self) -> Self {
        Self {
            modulus: self.modulus.clone(),
            exponent: self.exponent.clone(),
            private: None,
        }
    }

    /// PKCS#1 RSAPublicKey.
    pub fn to_public_der(&self) -> Vec<u8> {
        self.public_builder().to_der()
    }

    /// X.509 SubjectPublicKeyInfo with an rsaEncryption identifier.
    pub fn to_spki_der(&self) -> Vec<u8> {
        let mut spki = Builder::new();
        spki.add_sequence()
            .add_object_identifier(&known::rsa_encryption().to_der_value())
            .add_null();
        spki.add_bit_string_contents()
            .add_raw(&self.to_public_der());
        spki.to_der()
    }

    /// PKCS#1 RSAPrivateKey (version 0).
    pub fn to_private_der(&self) -> Result<Zeroizing<Vec<u8>>, PkiError> {
        let private = self.private.as_ref().ok_or(PkiError::MissingPrivateKey)?;
        let mut key = Builder::new();
        key.add_int32(0)
            .add_big_int(&self.modulus)
            .add_big_int(&self.exponent);
        for field in private.fields() {
            key.add_big_int(field);
        }
        Ok(Zeroizing::new(key.to_der()))
    }

    fn public_builder(&self) -> Builder {
        let mut key = Builder::new();
        key.add_big_int(&self.modulus).add_big_int(&self.exponent);
        key
    }
}

impl PartialEq for RsaKeyParameters {
    fn eq(&self, other: &Self) -> bool {
        if self.modulus != other.modulus || self.exponent != other.exponent {
            return false;
        }
        match (&self.private, &other.private) {
            (None, None) => true,
            (Some(a), Some(b)) => a
                .fields()
                .iter()
                .zip(b.fields())
                .fold(1u8, |acc, (x, y)| acc & x.ct_eq(y).unwrap_u8())
                == 1,
            _ => false,
        }
    }
}

impl Eq for RsaKeyParameters {}

impl fmt::Debug for RsaKeyParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyParameters")
            .field("modulus_bits", &self.modulus_bits())
            .field("exponent", &self.exponent)
            .field("has_private", &self.has_private())
            .finish()
    }
}

fn trim_magnitude(value: &[u8]) -> &[u8] {
    let start = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    &value[start..]
}

/// Read an INTEGER as a magnitude without leading zeros. Both the raw
/// contents and the result are wiped on drop.
fn read_unsigned(seq: &mut Parser<'_>) -> Result<Zeroizing<Vec<u8>>, PkiError> {
    let raw = Zeroizing::new(seq.get_big_int()?);
    Ok(Zeroizing::new(trim_magnitude(&raw).to_vec()))
}

fn parse_public(p: &mut Parser<'_>) -> Result<RsaKeyParameters, PkiError> {
    let mut seq = p.get_sequence()?;
    let modulus = read_unsigned(&mut seq)?;
    let exponent = read_unsigned(&mut seq)?;
    seq.at_end()?;
    RsaKeyParameters::new(&modulus, &exponent)
}

fn parse_spki(p: &mut Parser<'_>) -> Result<RsaKeyParameters, PkiError> {
    let mut seq = p.get_sequence()?;

    let mut alg = seq.get_sequence()?;
    let oid = alg.get_object_identifier()?;
    if !Parser::is_object_id(&oid, &known::rsa_encryption().to_der_value()) {
        let name = Oid::from_der_value(&oid)
            .map(|o| o.to_string())
            .unwrap_or_else(|_| "<malformed>".into());
        return Err(PkiError::UnsupportedAlgorithm(name));
    }
    // Parameters are NULL for rsaEncryption, but absent is tolerated.
    if !alg.is_empty() {
        alg.get_null()?;
    }
    alg.at_end()?;

    let mut key = seq.get_bit_string_contents()?;
    seq.at_end()?;
    let params = parse_public(&mut key)?;
    key.at_end()?;
    Ok(params)
}

fn parse_private(p: &mut Parser<'_>) -> Result<RsaKeyParameters, PkiError> {
    let mut seq = p.get_sequence()?;
    let version = seq.get_int32()?;
    if version != 0 {
        return Err(PkiError::UnsupportedKeyFormat(format!(
            "RSAPrivateKey version {version}"
        )));
    }
    let modulus = read_unsigned(&mut seq)?;
    let exponent = read_unsigned(&mut seq)?;
    let mut private = Vec::with_capacity(6);
    for _ in 0..6 {
        private.push(read_unsigned(&mut seq)?);
    }
    seq.at_end()?;

    Ok(RsaKeyParameters::new(&modulus, &exponent)?.with_private_components(
        &private[0],
        &private[1],
        &private[2],
        &private[3],
        &private[4],
        &private[5],
    ))
}
