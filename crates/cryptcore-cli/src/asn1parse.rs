//! DER structure dump, one line per element.

use std::fs;
use std::io::{self, Write};

use cryptcore_utils::asn1::{tags, Parser, Tag, TagClass};
use cryptcore_utils::oid::{known, Oid};

/// Primitive values longer than this are summarized instead of dumped.
const MAX_DUMP: usize = 32;

pub fn run(input: &str, offset: usize, length: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let count = match length {
        Some(n) => n,
        None => data.len().checked_sub(offset).ok_or("offset past end of input")?,
    };
    let mut parser = Parser::with_range(&data, offset, count)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    dump(&mut parser, 0, &mut out)?;
    Ok(())
}

fn dump(p: &mut Parser<'_>, depth: usize, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    while !p.is_empty() {
        let offset = p.offset();
        let tag_byte = p.peek_type()?;
        let tag = Tag::from_byte(tag_byte)?;
        let content_len = p.peek_length()?;
        let header_len = {
            let mut probe = *p;
            probe.get_contents(tag_byte, 0)?.offset() - offset
        };
        let kind = if tag.constructed { "cons" } else { "prim" };
        let prefix = format!(
            "{offset:5}:d={depth:<2} hl={header_len} l={content_len:4} {kind}: {:<18}",
            tag_name(&tag)
        );

        if tag.constructed {
            writeln!(out, "{prefix}")?;
            let mut inner = p.get_contents(tag_byte, 0)?;
            dump(&mut inner, depth + 1, out)?;
        } else {
            let value = render_primitive(p, tag_byte)?;
            writeln!(out, "{prefix}:{value}")?;
        }
    }
    Ok(())
}

fn tag_name(tag: &Tag) -> String {
    match tag.class {
        TagClass::Universal => tag
            .universal_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("univ [ {} ]", tag.number)),
        TagClass::Application => format!("appl [ {} ]", tag.number),
        TagClass::ContextSpecific => format!("cont [ {} ]", tag.number),
        TagClass::Private => format!("priv [ {} ]", tag.number),
    }
}

/// Consume one primitive element and render its value.
fn render_primitive(p: &mut Parser<'_>, tag: u8) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = match tag {
        tags::NULL => {
            p.get_null()?;
            String::new()
        }
        tags::INTEGER => hex::encode_upper(p.get_contents_as_array(tag, 0)?),
        tags::OID => {
            let oid = Oid::from_der_value(&p.get_object_identifier()?)?;
            match known::name(&oid) {
                Some(name) => format!("{name} ({oid})"),
                None => oid.to_string(),
            }
        }
        tags::PRINTABLE_STRING | tags::IA5_STRING => p.get_string()?,
        tags::UTC_TIME => p.get_utc_time()?,
        _ => {
            let bytes = p.get_contents_as_array(tag, 0)?;
            if bytes.len() <= MAX_DUMP {
                format!("[HEX DUMP]:{}", hex::encode_upper(&bytes))
            } else {
                format!("[{} bytes]", bytes.len())
            }
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptcore_utils::asn1::Builder;

    fn dump_to_string(der: &[u8]) -> String {
        let mut out = Vec::new();
        dump(&mut Parser::new(der), 0, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_dump_lines() {
        let mut b = Builder::new();
        b.add_int32(65537)
            .add_object_identifier(&known::rsa_encryption().to_der_value())
            .add_null();
        b.add_sequence().add_string("hi");
        let text = dump_to_string(&b.to_der());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("    0:d=0  hl=2 l=  24 cons: SEQUENCE"));
        assert!(lines[1].ends_with(":010001"));
        assert!(lines[2].contains("rsaEncryption (1.2.840.113549.1.1.1)"));
        assert!(lines[3].contains("NULL"));
        assert!(lines[4].contains("d=1"));
        assert!(lines[5].contains("d=2") && lines[5].ends_with(":hi"));
    }

    #[test]
    fn test_context_tag_name() {
        let tag = Tag::from_byte(0xA0).unwrap();
        assert_eq!(tag_name(&tag), "cont [ 0 ]");
    }

    #[test]
    fn test_truncated_input_fails() {
        let mut out = Vec::new();
        assert!(dump(&mut Parser::new(&[0x30, 0x05, 0x02]), 0, &mut out).is_err());
    }
}
