//! TLV tags and the tag-form bits of the control byte.

use error::Error;

use byteorder::{ByteOrder, LittleEndian};

// Tag form, bits 7..5 of the control byte.
pub(crate) const FORM_ANONYMOUS: u8 = 0x00;
pub(crate) const FORM_CONTEXT: u8 = 0x20;
pub(crate) const FORM_COMMON_2: u8 = 0x40;
pub(crate) const FORM_COMMON_4: u8 = 0x60;
pub(crate) const FORM_IMPLICIT_2: u8 = 0x80;
pub(crate) const FORM_IMPLICIT_4: u8 = 0xa0;
pub(crate) const FORM_FULL_6: u8 = 0xc0;
pub(crate) const FORM_FULL_8: u8 = 0xe0;

/// A TLV element tag.
///
/// Anonymous tags mark positional elements (array members and the outermost
/// message structure). Context tags identify the named fields of a structure
/// or list and are scoped to it. Profile-qualified tags only appear inside
/// opaque payload data carried by the codec, never in the message schemas
/// themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Anonymous,
    Context(u8),
    /// Tag scoped to the common profile.
    CommonProfile(u32),
    /// Tag scoped to a profile established out of band.
    ImplicitProfile(u32),
    /// Tag carrying its full vendor/profile qualification inline.
    FullyQualified {
        vendor_id: u16,
        profile_num: u16,
        tag_num: u32,
    },
}

impl Tag {
    /// Whether this is a context tag.
    pub fn is_context(&self) -> bool {
        match *self {
            Tag::Context(_) => true,
            _ => false,
        }
    }

    /// The context tag number, if this is a context tag.
    pub fn context_num(&self) -> Option<u8> {
        match *self {
            Tag::Context(n) => Some(n),
            _ => None,
        }
    }

    /// Decodes the tag bytes following a control byte.
    ///
    /// Returns the tag and the number of bytes it occupied.
    pub(crate) fn parse(form: u8, buf: &[u8]) -> Result<(Tag, usize), Error> {
        let need = match form {
            FORM_ANONYMOUS => 0,
            FORM_CONTEXT => 1,
            FORM_COMMON_2 | FORM_IMPLICIT_2 => 2,
            FORM_COMMON_4 | FORM_IMPLICIT_4 => 4,
            FORM_FULL_6 => 6,
            FORM_FULL_8 => 8,
            _ => unreachable!("tag form is a 3-bit field"),
        };
        if buf.len() < need {
            return Err(Error::BufferUnderrun);
        }

        let tag = match form {
            FORM_ANONYMOUS => Tag::Anonymous,
            FORM_CONTEXT => Tag::Context(buf[0]),
            FORM_COMMON_2 => Tag::CommonProfile(LittleEndian::read_u16(buf) as u32),
            FORM_COMMON_4 => Tag::CommonProfile(LittleEndian::read_u32(buf)),
            FORM_IMPLICIT_2 => Tag::ImplicitProfile(LittleEndian::read_u16(buf) as u32),
            FORM_IMPLICIT_4 => Tag::ImplicitProfile(LittleEndian::read_u32(buf)),
            FORM_FULL_6 => Tag::FullyQualified {
                vendor_id: LittleEndian::read_u16(&buf[0..]),
                profile_num: LittleEndian::read_u16(&buf[2..]),
                tag_num: LittleEndian::read_u16(&buf[4..]) as u32,
            },
            FORM_FULL_8 => Tag::FullyQualified {
                vendor_id: LittleEndian::read_u16(&buf[0..]),
                profile_num: LittleEndian::read_u16(&buf[2..]),
                tag_num: LittleEndian::read_u32(&buf[4..]),
            },
            _ => unreachable!(),
        };
        Ok((tag, need))
    }

    /// Encodes the tag into its form bits and tag bytes.
    ///
    /// The narrowest form that represents the tag value is chosen.
    pub(crate) fn encode(&self) -> (u8, [u8; 8], usize) {
        let mut bytes = [0; 8];
        match *self {
            Tag::Anonymous => (FORM_ANONYMOUS, bytes, 0),
            Tag::Context(n) => {
                bytes[0] = n;
                (FORM_CONTEXT, bytes, 1)
            }
            Tag::CommonProfile(n) if n <= 0xffff => {
                LittleEndian::write_u16(&mut bytes, n as u16);
                (FORM_COMMON_2, bytes, 2)
            }
            Tag::CommonProfile(n) => {
                LittleEndian::write_u32(&mut bytes, n);
                (FORM_COMMON_4, bytes, 4)
            }
            Tag::ImplicitProfile(n) if n <= 0xffff => {
                LittleEndian::write_u16(&mut bytes, n as u16);
                (FORM_IMPLICIT_2, bytes, 2)
            }
            Tag::ImplicitProfile(n) => {
                LittleEndian::write_u32(&mut bytes, n);
                (FORM_IMPLICIT_4, bytes, 4)
            }
            Tag::FullyQualified {
                vendor_id,
                profile_num,
                tag_num,
            } => {
                LittleEndian::write_u16(&mut bytes[0..], vendor_id);
                LittleEndian::write_u16(&mut bytes[2..], profile_num);
                if tag_num <= 0xffff {
                    LittleEndian::write_u16(&mut bytes[4..], tag_num as u16);
                    (FORM_FULL_6, bytes, 6)
                } else {
                    LittleEndian::write_u32(&mut bytes[4..], tag_num);
                    (FORM_FULL_8, bytes, 8)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(tag: Tag) {
        let (form, bytes, len) = tag.encode();
        let (parsed, consumed) = Tag::parse(form, &bytes[..len]).unwrap();
        assert_eq!(consumed, len);
        assert_eq!(parsed, tag);
    }

    #[test]
    fn tag_forms_roundtrip() {
        roundtrip(Tag::Anonymous);
        roundtrip(Tag::Context(0));
        roundtrip(Tag::Context(0xff));
        roundtrip(Tag::CommonProfile(7));
        roundtrip(Tag::CommonProfile(0x1_0000));
        roundtrip(Tag::ImplicitProfile(0xffff));
        roundtrip(Tag::ImplicitProfile(0xdead_beef));
        roundtrip(Tag::FullyQualified {
            vendor_id: 0xfff1,
            profile_num: 2,
            tag_num: 3,
        });
        roundtrip(Tag::FullyQualified {
            vendor_id: 0xfff1,
            profile_num: 2,
            tag_num: 0x10_0000,
        });
    }

    #[test]
    fn truncated_tag_bytes() {
        assert_eq!(Tag::parse(FORM_CONTEXT, &[]), Err(Error::BufferUnderrun));
        assert_eq!(Tag::parse(FORM_FULL_8, &[0; 7]), Err(Error::BufferUnderrun));
    }
}
