//! Single-byte tag parsing and naming.

use super::{Tag, TagClass};
use cryptcore_types::CryptoError;

/// Low five bits all set: the tag number continues in following bytes.
const HIGH_TAG_NUMBER: u8 = 0x1F;

impl Tag {
    /// Decompose a tag byte.
    ///
    /// The high-tag-number form is rejected: this codec only handles tag
    /// numbers 0 to 30.
    pub fn from_byte(byte: u8) -> Result<Self, CryptoError> {
        if byte & HIGH_TAG_NUMBER == HIGH_TAG_NUMBER {
            return Err(CryptoError::Asn1Malformed);
        }
        let class = match byte >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        Ok(Tag {
            class,
            constructed: byte & 0x20 != 0,
            number: byte & 0x1F,
        })
    }

    /// Encode this tag back to its byte form.
    pub fn to_byte(&self) -> u8 {
        let class_bits = match self.class {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xC0,
        };
        let constructed_bit = if self.constructed { 0x20 } else { 0x00 };
        class_bits | constructed_bit | (self.number & 0x1F)
    }

    /// Human readable name for universal tags, `None` otherwise.
    pub fn universal_name(&self) -> Option<&'static str> {
        if self.class != TagClass::Universal {
            return None;
        }
        let name = match self.number {
            0x01 => "BOOLEAN",
            0x02 => "INTEGER",
            0x03 => "BIT STRING",
            0x04 => "OCTET STRING",
            0x05 => "NULL",
            0x06 => "OBJECT IDENTIFIER",
            0x0A => "ENUMERATED",
            0x0C => "UTF8String",
            0x10 => "SEQUENCE",
            0x11 => "SET",
            0x13 => "PrintableString",
            0x14 => "T61String",
            0x16 => "IA5String",
            0x17 => "UTCTime",
            0x18 => "GeneralizedTime",
            0x1E => "BMPString",
            _ => return None,
        };
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence_tag() {
        let tag = Tag::from_byte(0x30).unwrap();
        assert_eq!(tag.class, TagClass::Universal);
        assert!(tag.constructed);
        assert_eq!(tag.number, 0x10);
        assert_eq!(tag.universal_name(), Some("SEQUENCE"));
    }

    #[test]
    fn test_parse_integer_tag() {
        let tag = Tag::from_byte(0x02).unwrap();
        assert!(!tag.constructed);
        assert_eq!(tag.number, 0x02);
    }

    #[test]
    fn test_high_tag_number_rejected() {
        assert!(matches!(
            Tag::from_byte(0x1F),
            Err(CryptoError::Asn1Malformed)
        ));
        assert!(Tag::from_byte(0xBF).is_err());
    }

    #[test]
    fn test_roundtrip() {
        for byte in [0x02u8, 0x30, 0x31, 0xA0, 0xA3, 0x80, 0x5E, 0xC1] {
            assert_eq!(Tag::from_byte(byte).unwrap().to_byte(), byte);
        }
    }

    #[test]
    fn test_context_specific_has_no_universal_name() {
        let tag = Tag::from_byte(0xA0).unwrap();
        assert_eq!(tag.class, TagClass::ContextSpecific);
        assert_eq!(tag.universal_name(), None);
    }
}
