//! Validation and printing of opaque TLV payloads.
//!
//! The `data` of an attribute or event and the `fields` of a command are
//! cluster-defined TLV the codec does not interpret. The schema walkers
//! still check that such a payload is well-formed TLV, and print its
//! contents generically when pretty-printing.

use error::Error;
use im::printer::PrettyPrinter;
use tlv::{Tag, TlvReader, TlvType};

// Payloads are cluster data, not arbitrarily recursive documents; the
// original imposes the same depth cut-off.
const MAX_DEPTH: usize = 12;

/// Walks the reader's current element recursively, verifying TLV
/// well-formedness and printing a generic rendition.
pub fn check_im_payload(reader: &TlvReader, pp: &mut PrettyPrinter, label: &str) -> Result<(), Error> {
    check_element(&mut reader.clone(), pp, label, 0)
}

fn check_element(
    reader: &mut TlvReader,
    pp: &mut PrettyPrinter,
    label: &str,
    depth: usize,
) -> Result<(), Error> {
    if depth > MAX_DEPTH {
        debug!("payload nesting exceeds {} levels", MAX_DEPTH);
        return Err(Error::InvalidTlvTag);
    }

    let ty = reader.element_type();
    match ty {
        TlvType::Structure | TlvType::Array | TlvType::List => {
            pline!(pp, "{} = {:?}", label, ty);
            pline!(pp, "{{");
            pp.inc_depth();
            let outer = reader.enter_container()?;
            loop {
                match reader.next() {
                    Ok(()) => {}
                    Err(Error::EndOfTlv) => break,
                    Err(e) => return Err(e),
                }
                if ty == TlvType::Array && reader.tag() != Tag::Anonymous {
                    return Err(Error::InvalidTlvTag);
                }
                let label = member_label(reader.tag());
                check_element(reader, pp, &label, depth + 1)?;
            }
            reader.exit_container(outer)?;
            pp.dec_depth();
            pline!(pp, "}}");
        }
        TlvType::SignedInteger => pline!(pp, "{} = {}", label, reader.get_i64()?),
        TlvType::UnsignedInteger => pline!(pp, "{} = {}", label, reader.get_u64()?),
        TlvType::Boolean => pline!(pp, "{} = {}", label, reader.get_bool()?),
        TlvType::Float => pline!(pp, "{} = {}", label, reader.get_f32()?),
        TlvType::Double => pline!(pp, "{} = {}", label, reader.get_f64()?),
        TlvType::Utf8String => pline!(pp, "{} = {:?}", label, reader.get_utf8()?),
        TlvType::ByteString => {
            pline!(pp, "{} = {} bytes", label, reader.get_bytes()?.len())
        }
        TlvType::Null => pline!(pp, "{} = null", label),
        TlvType::NotSpecified => return Err(Error::WrongTlvType),
    }
    Ok(())
}

fn member_label(tag: Tag) -> String {
    match tag {
        Tag::Anonymous => "[]".to_owned(),
        Tag::Context(n) => format!("0x{:02x}", n),
        Tag::CommonProfile(n) => format!("common(0x{:x})", n),
        Tag::ImplicitProfile(n) => format!("implicit(0x{:x})", n),
        Tag::FullyQualified {
            vendor_id,
            profile_num,
            tag_num,
        } => format!("{:04x}:{:04x}:0x{:x}", vendor_id, profile_num, tag_num),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvWriter;

    #[test]
    fn nested_payload_accepted() {
        let mut buf = [0; 128];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let s = w.start_container(Tag::Context(2), TlvType::Structure).unwrap();
            w.put_unsigned(Tag::Context(0), 4).unwrap();
            let a = w.start_container(Tag::Context(1), TlvType::Array).unwrap();
            w.put_utf8(Tag::Anonymous, "warm white").unwrap();
            w.end_container(a).unwrap();
            w.end_container(s).unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let mut pp = PrettyPrinter::new();
        check_im_payload(&r, &mut pp, "Data").unwrap();
    }

    #[test]
    fn tagged_array_member_rejected() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let a = w.start_container(Tag::Context(2), TlvType::Array).unwrap();
            w.put_unsigned(Tag::Context(0), 1).unwrap();
            w.end_container(a).unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let mut pp = PrettyPrinter::new();
        assert_eq!(
            check_im_payload(&r, &mut pp, "Data"),
            Err(Error::InvalidTlvTag)
        );
    }
}
