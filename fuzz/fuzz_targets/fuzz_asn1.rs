#![no_main]
use cryptcore_utils::asn1::{tags, Parser};
use libfuzzer_sys::fuzz_target;

fn walk(p: &mut Parser<'_>, depth: usize) {
    while !p.is_empty() {
        let Ok(tag) = p.peek_type() else { return };
        let res = if tag & tags::CONSTRUCTED != 0 && depth < 32 {
            p.get_contents(tag, 0).map(|mut inner| walk(&mut inner, depth + 1))
        } else if tag == tags::INTEGER {
            p.get_big_int().map(|_| ())
        } else {
            p.skip()
        };
        if res.is_err() {
            return;
        }
    }
}

fuzz_target!(|data: &[u8]| {
    walk(&mut Parser::new(data), 0);
});
