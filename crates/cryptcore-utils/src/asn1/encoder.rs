//! ASN.1 DER encoder.

use zeroize::Zeroize;

use super::tags;

/// Largest content length the encoder supports.
///
/// Lengths are written with at most four bytes after the `0x80 | n` prefix;
/// this codec caps them below 2^28.
pub const MAX_LENGTH: usize = (1 << 28) - 1;

/// A single element of the tree being built. Leaf payloads are wiped
/// when the node is dropped, so a builder may carry key material.
enum Node {
    /// Raw contents written as-is (OCTET STRING, OID, strings, NULL).
    Bytes { tag: u8, value: Vec<u8> },
    Int32 { tag: u8, value: i32 },
    Int64 { tag: u8, value: i64 },
    /// Unsigned big-endian magnitude.
    BigInt { tag: u8, value: Vec<u8> },
    /// Payload preceded by a zero "unused bits" byte.
    BitString { tag: u8, value: Vec<u8> },
    /// Already DER-encoded element, spliced verbatim.
    Raw(Vec<u8>),
    Container(Builder),
}

/// A builder for DER-encoded ASN.1 structures.
///
/// A `Builder` is itself a container node (a SEQUENCE by default). Leaves
/// and nested containers are appended in call order and serialized in
/// that order; SET members are not sorted.
///
/// ```
/// use cryptcore_utils::asn1::Builder;
///
/// let mut seq = Builder::new();
/// seq.add_int32(65537).add_octet_string(&[0xDE, 0xAD, 0xBE, 0xEF]);
/// assert_eq!(
///     seq.to_der(),
///     [0x30, 0x09, 0x02, 0x03, 0x01, 0x00, 0x01, 0x04, 0x04, 0xDE, 0xAD, 0xBE, 0xEF]
/// );
/// ```
pub struct Builder {
    tag: u8,
    /// Emit a zero unused-bits byte before the children (BIT STRING wrapping).
    bit_string_contents: bool,
    children: Vec<Node>,
}

impl Builder {
    /// Create a SEQUENCE builder.
    pub fn new() -> Self {
        Self::with_tag(tags::SEQUENCE)
    }

    /// Create a container builder with an arbitrary tag.
    pub fn with_tag(tag: u8) -> Self {
        Self {
            tag,
            bit_string_contents: false,
            children: Vec::new(),
        }
    }

    /// The tag this container is written with.
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Number of direct children appended so far.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn push_container(&mut self, container: Builder) -> &mut Builder {
        self.children.push(Node::Container(container));
        match self.children.last_mut() {
            Some(Node::Container(child)) => child,
            _ => unreachable!("container was just pushed"),
        }
    }

    /// Append a nested container and return it.
    pub fn add_container(&mut self, tag: u8) -> &mut Builder {
        self.push_container(Builder::with_tag(tag))
    }

    /// Append a nested SEQUENCE and return it.
    pub fn add_sequence(&mut self) -> &mut Builder {
        self.add_container(tags::SEQUENCE)
    }

    /// Append a nested SET and return it.
    pub fn add_set(&mut self) -> &mut Builder {
        self.add_container(tags::SET)
    }

    /// Append a BIT STRING whose payload is the encoding of further
    /// children, e.g. the public key SEQUENCE inside SubjectPublicKeyInfo.
    pub fn add_bit_string_contents(&mut self) -> &mut Builder {
        self.push_container(Builder {
            tag: tags::BIT_STRING,
            bit_string_contents: true,
            children: Vec::new(),
        })
    }

    /// Append a 32-bit INTEGER in its shortest two's-complement form.
    pub fn add_int32(&mut self, value: i32) -> &mut Self {
        self.add_int32_tagged(tags::INTEGER, value)
    }

    /// Append a 32-bit integer under a custom tag.
    pub fn add_int32_tagged(&mut self, tag: u8, value: i32) -> &mut Self {
        self.children.push(Node::Int32 { tag, value });
        self
    }

    /// Append a 64-bit INTEGER in its shortest two's-complement form.
    pub fn add_int64(&mut self, value: i64) -> &mut Self {
        self.add_int64_tagged(tags::INTEGER, value)
    }

    /// Append a 64-bit integer under a custom tag.
    pub fn add_int64_tagged(&mut self, tag: u8, value: i64) -> &mut Self {
        self.children.push(Node::Int64 { tag, value });
        self
    }

    /// Append a non-negative INTEGER from its big-endian magnitude.
    ///
    /// A zero byte is prepended when the top bit of the magnitude is set.
    /// An empty magnitude encodes zero.
    pub fn add_big_int(&mut self, magnitude: &[u8]) -> &mut Self {
        self.add_big_int_tagged(tags::INTEGER, magnitude)
    }

    /// Append a big integer under a custom tag.
    pub fn add_big_int_tagged(&mut self, tag: u8, magnitude: &[u8]) -> &mut Self {
        self.children.push(Node::BigInt {
            tag,
            value: magnitude.to_vec(),
        });
        self
    }

    /// Append a BIT STRING with zero unused bits.
    pub fn add_bit_string(&mut self, value: &[u8]) -> &mut Self {
        self.add_bit_string_tagged(tags::BIT_STRING, value)
    }

    /// Append a bit string under a custom tag.
    pub fn add_bit_string_tagged(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        self.children.push(Node::BitString {
            tag,
            value: value.to_vec(),
        });
        self
    }

    /// Append a primitive element whose contents are `value` unchanged.
    pub fn add_bytes(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        self.children.push(Node::Bytes {
            tag,
            value: value.to_vec(),
        });
        self
    }

    /// Append an OCTET STRING.
    pub fn add_octet_string(&mut self, value: &[u8]) -> &mut Self {
        self.add_bytes(tags::OCTET_STRING, value)
    }

    /// Append an OBJECT IDENTIFIER from its encoded value bytes.
    pub fn add_object_identifier(&mut self, value: &[u8]) -> &mut Self {
        self.add_bytes(tags::OID, value)
    }

    /// Append an IA5String.
    pub fn add_string(&mut self, value: &str) -> &mut Self {
        self.add_string_tagged(tags::IA5_STRING, value)
    }

    /// Append text as UTF-8 bytes under a custom tag. The character set
    /// of the string type is not checked.
    pub fn add_string_tagged(&mut self, tag: u8, value: &str) -> &mut Self {
        self.add_bytes(tag, value.as_bytes())
    }

    /// Append a PrintableString.
    pub fn add_printable_string(&mut self, value: &str) -> &mut Self {
        self.add_string_tagged(tags::PRINTABLE_STRING, value)
    }

    /// Append a UTCTime given as text, e.g. `"250115120000Z"`.
    pub fn add_utc_time(&mut self, value: &str) -> &mut Self {
        self.add_string_tagged(tags::UTC_TIME, value)
    }

    /// Append a NULL.
    pub fn add_null(&mut self) -> &mut Self {
        self.add_bytes(tags::NULL, &[])
    }

    /// Append an element that is already DER encoded.
    pub fn add_raw(&mut self, der: &[u8]) -> &mut Self {
        self.children.push(Node::Raw(der.to_vec()));
        self
    }

    /// Length of the contents of this container (without its header).
    fn content_len(&self) -> usize {
        let unused_bits = usize::from(self.bit_string_contents);
        unused_bits + self.children.iter().map(Node::encoded_len).sum::<usize>()
    }

    /// Total number of bytes [`to_der`](Self::to_der) produces.
    ///
    /// # Panics
    ///
    /// Panics if any element's contents exceed [`MAX_LENGTH`].
    pub fn encoded_len(&self) -> usize {
        let len = self.content_len();
        1 + length_header_len(len) + len
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.tag);
        write_length(out, self.content_len());
        if self.bit_string_contents {
            out.push(0x00);
        }
        for child in &self.children {
            child.encode_into(out);
        }
    }

    /// Serialize the whole tree.
    ///
    /// # Panics
    ///
    /// Panics if any element's contents exceed [`MAX_LENGTH`].
    pub fn to_der(&self) -> Vec<u8> {
        let len = self.encoded_len();
        let mut out = Vec::with_capacity(len);
        self.encode_into(&mut out);
        debug_assert_eq!(out.len(), len);
        out
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Zeroize for Node {
    fn zeroize(&mut self) {
        match self {
            Node::Bytes { value, .. }
            | Node::BigInt { value, .. }
            | Node::BitString { value, .. }
            | Node::Raw(value) => value.zeroize(),
            Node::Int32 { value, .. } => value.zeroize(),
            Node::Int64 { value, .. } => value.zeroize(),
            Node::Container(_) => {}
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Node {
    fn encoded_len(&self) -> usize {
        let len = match self {
            Node::Raw(der) => return der.len(),
            Node::Container(builder) => return builder.encoded_len(),
            Node::Bytes { value, .. } => value.len(),
            Node::Int32 { value, .. } => minimal_int(&value.to_be_bytes()).len(),
            Node::Int64 { value, .. } => minimal_int(&value.to_be_bytes()).len(),
            Node::BigInt { value, .. } => big_int_len(value),
            Node::BitString { value, .. } => 1 + value.len(),
        };
        1 + length_header_len(len) + len
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Node::Raw(der) => out.extend_from_slice(der),
            Node::Container(builder) => builder.encode_into(out),
            Node::Bytes { tag, value } => write_tlv(out, *tag, value),
            Node::Int32 { tag, value } => write_tlv(out, *tag, minimal_int(&value.to_be_bytes())),
            Node::Int64 { tag, value } => write_tlv(out, *tag, minimal_int(&value.to_be_bytes())),
            Node::BigInt { tag, value } => {
                out.push(*tag);
                write_length(out, big_int_len(value));
                if value.first().map_or(true, |b| b & 0x80 != 0) {
                    out.push(0x00);
                }
                out.extend_from_slice(value);
            }
            Node::BitString { tag, value } => {
                out.push(*tag);
                write_length(out, 1 + value.len());
                out.push(0x00);
                out.extend_from_slice(value);
            }
        }
    }
}

fn write_tlv(out: &mut Vec<u8>, tag: u8, value: &[u8]) {
    out.push(tag);
    write_length(out, value.len());
    out.extend_from_slice(value);
}

/// Content length of a big integer: one extra byte when the magnitude is
/// empty or its top bit would read as a sign bit.
fn big_int_len(magnitude: &[u8]) -> usize {
    match magnitude.first() {
        Some(b) if b & 0x80 == 0 => magnitude.len(),
        _ => magnitude.len() + 1,
    }
}

/// Strip redundant leading 0x00/0xFF bytes from a big-endian two's
/// complement integer while keeping its sign.
fn minimal_int(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (b, next) = (bytes[start], bytes[start + 1]);
        let redundant = (b == 0x00 && next & 0x80 == 0) || (b == 0xFF && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    &bytes[start..]
}

/// Number of bytes used by the DER length header for `length`.
fn length_header_len(length: usize) -> usize {
    assert!(
        length <= MAX_LENGTH,
        "asn1 field length {length} exceeds the supported maximum {MAX_LENGTH}"
    );
    match length {
        0..=0x7F => 1,
        0x80..=0xFF => 2,
        0x100..=0xFFFF => 3,
        0x1_0000..=0xFF_FFFF => 4,
        _ => 5,
    }
}

/// Write a DER length: short form below 128, otherwise `0x80 | n`
/// followed by `n` big-endian bytes.
fn write_length(out: &mut Vec<u8>, length: usize) {
    let n = length_header_len(length) - 1;
    if n == 0 {
        out.push(length as u8);
        return;
    }
    out.push(0x80 | n as u8);
    for i in (0..n).rev() {
        out.push((length >> (8 * i)) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::Parser;

    fn int32_der(value: i32) -> Vec<u8> {
        let mut b = Builder::new();
        b.add_int32(value);
        // Strip the enclosing SEQUENCE header (always 2 bytes here).
        b.to_der()[2..].to_vec()
    }

    #[test]
    fn test_concrete_sequence() {
        let mut seq = Builder::new();
        seq.add_int32(65537);
        seq.add_octet_string(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let der = seq.to_der();
        assert_eq!(
            der,
            [0x30, 0x09, 0x02, 0x03, 0x01, 0x00, 0x01, 0x04, 0x04, 0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(seq.encoded_len(), der.len());
    }

    #[test]
    fn test_int32_minimal_encoding() {
        assert_eq!(int32_der(0), [0x02, 0x01, 0x00]);
        assert_eq!(int32_der(127), [0x02, 0x01, 0x7F]);
        assert_eq!(int32_der(128), [0x02, 0x02, 0x00, 0x80]);
        assert_eq!(int32_der(-1), [0x02, 0x01, 0xFF]);
        assert_eq!(int32_der(-128), [0x02, 0x01, 0x80]);
        assert_eq!(int32_der(-129), [0x02, 0x02, 0xFF, 0x7F]);
        assert_eq!(int32_der(32767), [0x02, 0x02, 0x7F, 0xFF]);
        assert_eq!(int32_der(32768), [0x02, 0x03, 0x00, 0x80, 0x00]);
        assert_eq!(int32_der(i32::MIN), [0x02, 0x04, 0x80, 0x00, 0x00, 0x00]);
        assert_eq!(int32_der(i32::MAX), [0x02, 0x04, 0x7F, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_int64_minimal_encoding() {
        let mut b = Builder::new();
        b.add_int64(i64::MIN).add_int64(0x80_0000_0000);
        let der = b.to_der();
        assert_eq!(
            &der[2..],
            &[
                0x02, 0x08, 0x80, 0, 0, 0, 0, 0, 0, 0, //
                0x02, 0x06, 0x00, 0x80, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_leaf_payloads_wiped() {
        let mut b = Builder::new();
        b.add_big_int(&[0x0A, 0xC1]).add_raw(&[0x02, 0x01, 0x26]).add_int32(0x35);
        for child in b.children.iter_mut() {
            child.zeroize();
        }
        assert!(matches!(&b.children[0], Node::BigInt { value, .. } if value.is_empty()));
        assert!(matches!(&b.children[1], Node::Raw(der) if der.is_empty()));
        assert!(matches!(&b.children[2], Node::Int32 { value: 0, .. }));
    }

    #[test]
    fn test_big_int_sign_byte() {
        let mut b = Builder::new();
        b.add_big_int(&[0x80, 0x01]);
        b.add_big_int(&[0x7F, 0x01]);
        b.add_big_int(&[]);
        assert_eq!(
            &b.to_der()[2..],
            &[0x02, 0x03, 0x00, 0x80, 0x01, 0x02, 0x02, 0x7F, 0x01, 0x02, 0x01, 0x00]
        );
    }

    #[test]
    fn test_bit_string_and_null() {
        let mut b = Builder::new();
        b.add_bit_string(&[0xAB, 0xCD]).add_null();
        assert_eq!(
            b.to_der(),
            [0x30, 0x07, 0x03, 0x03, 0x00, 0xAB, 0xCD, 0x05, 0x00]
        );
    }

    #[test]
    fn test_bit_string_contents_nests_sequence() {
        let mut root = Builder::new();
        let bits = root.add_bit_string_contents();
        bits.add_sequence().add_int32(5);
        assert_eq!(
            root.to_der(),
            [0x30, 0x08, 0x03, 0x06, 0x00, 0x30, 0x03, 0x02, 0x01, 0x05]
        );
    }

    #[test]
    fn test_set_keeps_insertion_order() {
        let mut root = Builder::new();
        root.add_set().add_int32(2).add_int32(1);
        assert_eq!(
            root.to_der(),
            [0x30, 0x08, 0x31, 0x06, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01]
        );
    }

    #[test]
    fn test_long_form_lengths() {
        let mut b = Builder::new();
        b.add_octet_string(&[0u8; 128]);
        let der = b.to_der();
        assert_eq!(&der[..3], &[0x30, 0x81, 0x83]);
        assert_eq!(&der[3..6], &[0x04, 0x81, 0x80]);
        assert_eq!(der.len(), b.encoded_len());

        let mut b = Builder::new();
        b.add_octet_string(&[0u8; 256]);
        let der = b.to_der();
        assert_eq!(&der[..4], &[0x30, 0x82, 0x01, 0x04]);
        assert_eq!(&der[4..8], &[0x04, 0x82, 0x01, 0x00]);

        let mut b = Builder::new();
        b.add_octet_string(&vec![0u8; 0x1_0000]);
        let der = b.to_der();
        assert_eq!(&der[5..10], &[0x04, 0x83, 0x01, 0x00, 0x00]);
        assert_eq!(der.len(), b.encoded_len());
    }

    #[test]
    fn test_strings_and_time() {
        let mut b = Builder::new();
        b.add_printable_string("CN")
            .add_string("a@b")
            .add_utc_time("250115120000Z");
        let der = b.to_der();
        assert_eq!(&der[2..6], &[0x13, 0x02, b'C', b'N']);
        assert_eq!(&der[6..11], &[0x16, 0x03, b'a', b'@', b'b']);
        assert_eq!(der[11], 0x17);
        assert_eq!(&der[13..], b"250115120000Z");
    }

    #[test]
    fn test_raw_and_tagged() {
        let mut inner = Builder::new();
        inner.add_int32(1);
        let mut outer = Builder::with_tag(0xA0);
        outer.add_raw(&inner.to_der()).add_int32_tagged(0x80, 3);
        assert_eq!(
            outer.to_der(),
            [0xA0, 0x08, 0x30, 0x03, 0x02, 0x01, 0x01, 0x80, 0x01, 0x03]
        );
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.tag(), 0xA0);
    }

    #[test]
    fn test_empty_containers() {
        let mut b = Builder::new();
        assert!(b.is_empty());
        b.add_sequence();
        b.add_bit_string_contents();
        assert_eq!(b.to_der(), [0x30, 0x05, 0x30, 0x00, 0x03, 0x01, 0x00]);
    }

    #[test]
    fn test_roundtrip_through_parser() {
        let mut root = Builder::new();
        root.add_int64(-0x1234_5678_9ABC)
            .add_big_int(&[0xFF; 20])
            .add_object_identifier(&[0x2A, 0x86, 0x48]);
        let der = root.to_der();

        let mut outer = Parser::new(&der);
        let mut seq = outer.get_sequence().unwrap();
        assert_eq!(seq.get_int64().unwrap(), -0x1234_5678_9ABC);
        assert_eq!(seq.get_big_int().unwrap(), vec![0xFF; 20]);
        assert_eq!(seq.get_object_identifier().unwrap(), [0x2A, 0x86, 0x48]);
        seq.at_end().unwrap();
        outer.at_end().unwrap();
    }

    #[test]
    fn test_length_header_len_boundaries() {
        assert_eq!(length_header_len(0x7F), 1);
        assert_eq!(length_header_len(0x80), 2);
        assert_eq!(length_header_len(0xFFFF), 3);
        assert_eq!(length_header_len(0x1_0000), 4);
        assert_eq!(length_header_len(MAX_LENGTH), 5);
    }

    #[test]
    #[should_panic(expected = "exceeds the supported maximum")]
    fn test_length_overflow_panics() {
        length_header_len(MAX_LENGTH + 1);
    }
}
