//! ASN.1 DER decoder.

use super::{tags, Tag};
use cryptcore_types::CryptoError;

/// A read-only cursor over DER data.
///
/// A `Parser` is a window `(offset, count)` into an immutable buffer. The
/// peeking accessors ([`peek_type`](Self::peek_type),
/// [`peek_length`](Self::peek_length), `is_*`) never move the cursor; the
/// `get_*` accessors validate the expected tag, consume exactly one whole
/// field and return either a value or a new `Parser` scoped to the
/// field's contents.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    buf: &'a [u8],
    offset: usize,
    count: usize,
}

/// Decoded tag/length header of the field at the cursor.
#[derive(Debug, Clone, Copy)]
struct Header {
    tag: u8,
    header_len: usize,
    content_len: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over the whole buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            count: buf.len(),
        }
    }

    /// Create a parser over `count` bytes of `buf` starting at `offset`.
    pub fn with_range(buf: &'a [u8], offset: usize, count: usize) -> Result<Self, CryptoError> {
        let end = offset.checked_add(count).ok_or(CryptoError::InvalidArg)?;
        if end > buf.len() {
            return Err(CryptoError::Asn1Truncated {
                need: end,
                got: buf.len(),
            });
        }
        Ok(Self { buf, offset, count })
    }

    /// Absolute position of the cursor within the underlying buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of unconsumed bytes in this window.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if all data in this window has been consumed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The unconsumed bytes of this window.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.offset..self.offset + self.count]
    }

    fn reject(&self, err: CryptoError) -> CryptoError {
        log::debug!("asn1 input rejected at offset {}: {err}", self.offset);
        err
    }

    /// Read the tag byte at the cursor without consuming it.
    pub fn peek_type(&self) -> Result<u8, CryptoError> {
        if self.count < 1 {
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        let tag = self.buf[self.offset];
        Tag::from_byte(tag).map_err(|e| self.reject(e))?;
        Ok(tag)
    }

    /// Read the content length of the field at the cursor without
    /// consuming it.
    pub fn peek_length(&self) -> Result<usize, CryptoError> {
        Ok(self.header()?.content_len)
    }

    /// Decode the tag and length header at the cursor.
    fn header(&self) -> Result<Header, CryptoError> {
        let tag = self.peek_type()?;
        if self.count < 2 {
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        let first = self.buf[self.offset + 1];
        if first < 0x80 {
            return Ok(Header {
                tag,
                header_len: 2,
                content_len: first as usize,
            });
        }
        // 0x80 is the indefinite form, which DER forbids.
        let num_bytes = (first & 0x7F) as usize;
        if num_bytes == 0 || num_bytes > 4 || 2 + num_bytes > self.count {
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        let len_bytes = &self.buf[self.offset + 2..self.offset + 2 + num_bytes];
        if len_bytes[0] == 0 {
            // Leading zero: not the minimal encoding.
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        let content_len = len_bytes
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        if content_len < 0x80 {
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        Ok(Header {
            tag,
            header_len: 2 + num_bytes,
            content_len,
        })
    }

    /// Decode the header and check the whole field fits in the window.
    fn field(&self) -> Result<Header, CryptoError> {
        let header = self.header()?;
        let need = header.header_len + header.content_len;
        if need > self.count {
            return Err(self.reject(CryptoError::Asn1Truncated {
                need,
                got: self.count,
            }));
        }
        Ok(header)
    }

    /// Like [`field`](Self::field) but also requires `expected` as the tag.
    fn expect(&self, expected: u8) -> Result<Header, CryptoError> {
        let header = self.field()?;
        if header.tag != expected {
            return Err(self.reject(CryptoError::Asn1UnexpectedTag {
                expected,
                found: header.tag,
            }));
        }
        Ok(header)
    }

    fn advance(&mut self, n: usize) {
        self.offset += n;
        self.count -= n;
    }

    /// Skip over one complete field, whatever its tag.
    pub fn skip(&mut self) -> Result<(), CryptoError> {
        let header = self.field()?;
        self.advance(header.header_len + header.content_len);
        Ok(())
    }

    /// Skip over one complete field, which must carry `tag`.
    pub fn skip_expected(&mut self, tag: u8) -> Result<(), CryptoError> {
        let header = self.expect(tag)?;
        self.advance(header.header_len + header.content_len);
        Ok(())
    }

    /// Consume a field with `tag` and return a parser over its contents,
    /// skipping the first `header_adjust` content bytes.
    ///
    /// `header_adjust` is 1 for BIT STRING, whose first content byte is
    /// the unused-bits count.
    pub fn get_contents(&mut self, tag: u8, header_adjust: usize) -> Result<Parser<'a>, CryptoError> {
        let header = self.expect(tag)?;
        if header.content_len < header_adjust {
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        let inner = Parser {
            buf: self.buf,
            offset: self.offset + header.header_len + header_adjust,
            count: header.content_len - header_adjust,
        };
        self.advance(header.header_len + header.content_len);
        Ok(inner)
    }

    /// Like [`get_contents`](Self::get_contents) but copies the contents out.
    pub fn get_contents_as_array(&mut self, tag: u8, header_adjust: usize) -> Result<Vec<u8>, CryptoError> {
        Ok(self.get_contents(tag, header_adjust)?.remaining().to_vec())
    }

    /// Consume a field with `tag` and copy it out including its header.
    pub fn get_whole_as_array(&mut self, tag: u8) -> Result<Vec<u8>, CryptoError> {
        let header = self.expect(tag)?;
        let total = header.header_len + header.content_len;
        let whole = self.buf[self.offset..self.offset + total].to_vec();
        self.advance(total);
        Ok(whole)
    }

    /// Read a SEQUENCE, returning a parser over its members.
    pub fn get_sequence(&mut self) -> Result<Parser<'a>, CryptoError> {
        self.get_contents(tags::SEQUENCE, 0)
    }

    /// Read a SET, returning a parser over its members.
    pub fn get_set(&mut self) -> Result<Parser<'a>, CryptoError> {
        self.get_contents(tags::SET, 0)
    }

    /// Read a BIT STRING and return its payload without the unused-bits
    /// byte. The unused-bits count is not checked.
    pub fn get_bit_string(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.get_contents_as_array(tags::BIT_STRING, 1)
    }

    /// Read a BIT STRING whose payload is itself DER, returning a parser
    /// over that payload.
    pub fn get_bit_string_contents(&mut self) -> Result<Parser<'a>, CryptoError> {
        self.get_contents(tags::BIT_STRING, 1)
    }

    /// Read an OCTET STRING.
    pub fn get_octet_string(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.get_contents_as_array(tags::OCTET_STRING, 0)
    }

    /// Read an OBJECT IDENTIFIER and return its encoded value bytes.
    pub fn get_object_identifier(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.get_contents_as_array(tags::OID, 0)
    }

    /// Read a NULL.
    pub fn get_null(&mut self) -> Result<(), CryptoError> {
        self.skip_expected(tags::NULL)
    }

    /// Read a PrintableString or IA5String as UTF-8 text.
    pub fn get_string(&mut self) -> Result<String, CryptoError> {
        let tag = self.peek_type()?;
        if tag != tags::PRINTABLE_STRING && tag != tags::IA5_STRING {
            return Err(self.reject(CryptoError::Asn1UnexpectedTag {
                expected: tags::PRINTABLE_STRING,
                found: tag,
            }));
        }
        let bytes = self.get_contents_as_array(tag, 0)?;
        String::from_utf8(bytes).map_err(|_| self.reject(CryptoError::Asn1Malformed))
    }

    /// Read a UTCTime and return its text, e.g. `"250115120000Z"`.
    pub fn get_utc_time(&mut self) -> Result<String, CryptoError> {
        let bytes = self.get_contents_as_array(tags::UTC_TIME, 0)?;
        String::from_utf8(bytes).map_err(|_| self.reject(CryptoError::Asn1Malformed))
    }

    /// Consume an INTEGER of at most `width` bytes, sign-extending the
    /// first content byte.
    fn get_signed(&mut self, width: usize) -> Result<i64, CryptoError> {
        let header = self.expect(tags::INTEGER)?;
        if header.content_len == 0 || header.content_len > width {
            return Err(self.reject(CryptoError::Asn1Malformed));
        }
        let start = self.offset + header.header_len;
        let contents = &self.buf[start..start + header.content_len];
        let mut value = contents[0] as i8 as i64;
        for &b in &contents[1..] {
            value = (value << 8) | b as i64;
        }
        self.advance(header.header_len + header.content_len);
        Ok(value)
    }

    /// Read an INTEGER that fits in 32 bits.
    pub fn get_int32(&mut self) -> Result<i32, CryptoError> {
        Ok(self.get_signed(4)? as i32)
    }

    /// Read an INTEGER that fits in 64 bits.
    pub fn get_int64(&mut self) -> Result<i64, CryptoError> {
        self.get_signed(8)
    }

    /// Read a non-negative INTEGER as a big-endian magnitude.
    ///
    /// A single leading zero byte (the sign-avoidance byte) is stripped.
    /// Negative values are not reconstructed.
    pub fn get_big_int(&mut self) -> Result<Vec<u8>, CryptoError> {
        let contents = self.get_contents(tags::INTEGER, 0)?.remaining();
        match contents {
            [] => Err(self.reject(CryptoError::Asn1Malformed)),
            [0x00, rest @ ..] if !rest.is_empty() => Ok(rest.to_vec()),
            _ => Ok(contents.to_vec()),
        }
    }

    /// Fail unless every byte in this window has been consumed.
    pub fn at_end(&self) -> Result<(), CryptoError> {
        if self.count > 0 {
            return Err(self.reject(CryptoError::Asn1TrailingData {
                remaining: self.count,
            }));
        }
        Ok(())
    }

    /// Byte-for-byte comparison of two encoded OIDs.
    pub fn is_object_id(a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    fn is_type(&self, tag: u8) -> bool {
        self.count > 0 && self.buf[self.offset] == tag
    }

    pub fn is_integer(&self) -> bool {
        self.is_type(tags::INTEGER)
    }

    pub fn is_bit_string(&self) -> bool {
        self.is_type(tags::BIT_STRING)
    }

    pub fn is_octet_string(&self) -> bool {
        self.is_type(tags::OCTET_STRING)
    }

    pub fn is_null(&self) -> bool {
        self.is_type(tags::NULL)
    }

    pub fn is_object_identifier(&self) -> bool {
        self.is_type(tags::OID)
    }

    pub fn is_sequence(&self) -> bool {
        self.is_type(tags::SEQUENCE)
    }

    pub fn is_set(&self) -> bool {
        self.is_type(tags::SET)
    }

    /// PrintableString or IA5String.
    pub fn is_string(&self) -> bool {
        self.is_type(tags::PRINTABLE_STRING) || self.is_type(tags::IA5_STRING)
    }

    pub fn is_utc_time(&self) -> bool {
        self.is_type(tags::UTC_TIME)
    }
}
