//! Generic parser scaffolding shared by every IB and message codec.

use error::Error;
use tlv::{Tag, TlvReader, TlvType};

/// Common state of an IB parser: a reader entered into the IB's container,
/// plus the saved outer-container type.
///
/// Concrete IB parsers embed one of these and add typed accessors for their
/// fields. The embedded reader stays positioned before the first child; the
/// accessors search from there with throwaway clones, so they can be called
/// in any order and any number of times.
#[derive(Debug, Clone)]
pub(crate) struct IbParser<'a> {
    pub reader: TlvReader<'a>,
    pub outer: TlvType,
}

impl<'a> IbParser<'a> {
    /// Initializes a parser on a structure element, verifying the schema
    /// ordering of its context tags.
    pub fn init_struct(reader: &TlvReader<'a>) -> Result<Self, Error> {
        let mut reader = reader.clone();
        if reader.element_type() != TlvType::Structure {
            return Err(Error::WrongTlvType);
        }
        let outer = reader.enter_container()?;
        let parser = IbParser { reader, outer };
        parser.check_schema_ordering()?;
        Ok(parser)
    }

    /// Initializes a parser on a list element.
    pub fn init_list(reader: &TlvReader<'a>) -> Result<Self, Error> {
        let mut reader = reader.clone();
        if reader.element_type() != TlvType::List {
            return Err(Error::WrongTlvType);
        }
        let outer = reader.enter_container()?;
        Ok(IbParser { reader, outer })
    }

    /// Initializes a parser on an array element.
    pub fn init_array(reader: &TlvReader<'a>) -> Result<Self, Error> {
        let mut reader = reader.clone();
        if reader.element_type() != TlvType::Array {
            return Err(Error::WrongTlvType);
        }
        let outer = reader.enter_container()?;
        Ok(IbParser { reader, outer })
    }

    /// Initializes a parser on the outermost anonymous structure of a
    /// top-level message.
    pub fn init_message(mut reader: TlvReader<'a>) -> Result<Self, Error> {
        reader.expect(TlvType::Structure, Tag::Anonymous)?;
        Self::init_struct(&reader)
    }

    /// Leaves the message structure and verifies nothing follows it.
    pub fn exit_message(&mut self) -> Result<(), Error> {
        self.reader.exit_container(self.outer)?;
        match self.reader.next() {
            Err(Error::EndOfTlv) => Ok(()),
            Ok(()) => Err(Error::InvalidTlvTag),
            Err(e) => Err(e),
        }
    }

    /// Verifies that the known context tags of a structure appear in
    /// strictly ascending order (a duplicate is inherently non-ascending).
    /// Non-context tags are skipped for forward compatibility.
    fn check_schema_ordering(&self) -> Result<(), Error> {
        let mut reader = self.reader.clone();
        let mut prev: Option<u8> = None;
        loop {
            match reader.next() {
                Ok(()) => {}
                Err(Error::EndOfTlv) => return Ok(()),
                Err(e) => return Err(e),
            }
            let num = match reader.tag().context_num() {
                Some(num) => num,
                None => continue,
            };
            if let Some(prev) = prev {
                if num <= prev {
                    warn!("context tag {} out of order (after {})", num, prev);
                    return Err(Error::InvalidTlvTag);
                }
            }
            prev = Some(num);
        }
    }

    /// Positions a throwaway sub-reader on the context-tagged field.
    ///
    /// Returns `EndOfTlv` when the field is absent.
    pub fn get_reader_on_tag(&self, tag_num: u8) -> Result<TlvReader<'a>, Error> {
        self.reader.find_element_with_tag(Tag::Context(tag_num))
    }

    pub fn get_unsigned_u64(&self, tag_num: u8) -> Result<u64, Error> {
        self.get_reader_on_tag(tag_num)?.get_u64()
    }

    pub fn get_unsigned_u32(&self, tag_num: u8) -> Result<u32, Error> {
        self.get_reader_on_tag(tag_num)?.get_u32()
    }

    pub fn get_unsigned_u16(&self, tag_num: u8) -> Result<u16, Error> {
        self.get_reader_on_tag(tag_num)?.get_u16()
    }

    pub fn get_unsigned_u8(&self, tag_num: u8) -> Result<u8, Error> {
        self.get_reader_on_tag(tag_num)?.get_u8()
    }

    pub fn get_boolean(&self, tag_num: u8) -> Result<bool, Error> {
        self.get_reader_on_tag(tag_num)?.get_bool()
    }

    /// Reads a field that is either an unsigned integer or null.
    ///
    /// `Ok(None)` means the field is present and null; an absent field is
    /// still `EndOfTlv`.
    pub fn get_nullable_u16(&self, tag_num: u8) -> Result<Option<u16>, Error> {
        let sub = self.get_reader_on_tag(tag_num)?;
        if sub.element_type() == TlvType::Null {
            return Ok(None);
        }
        sub.get_u16().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvWriter;

    fn sample_struct(buf: &mut [u8], tags: &[(u8, u64)]) -> usize {
        let mut w = TlvWriter::new(buf);
        let outer = w.start_container(Tag::Anonymous, TlvType::Structure).unwrap();
        for &(tag, value) in tags {
            w.put_unsigned(Tag::Context(tag), value).unwrap();
        }
        w.end_container(outer).unwrap();
        w.len()
    }

    #[test]
    fn message_init_and_exit() {
        let mut buf = [0; 64];
        let len = sample_struct(&mut buf, &[(0, 7), (2, 9)]);

        let mut parser = IbParser::init_message(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(parser.get_unsigned_u8(0), Ok(7));
        assert_eq!(parser.get_unsigned_u8(2), Ok(9));
        assert_eq!(parser.get_unsigned_u8(1), Err(Error::EndOfTlv));
        parser.exit_message().unwrap();
    }

    #[test]
    fn trailing_sibling_after_message_rejected() {
        let mut buf = [0; 64];
        let len = sample_struct(&mut buf, &[(0, 7)]);
        let extra = {
            let mut w = TlvWriter::new(&mut buf[len..]);
            w.put_unsigned(Tag::Anonymous, 1).unwrap();
            w.len()
        };

        let mut parser = IbParser::init_message(TlvReader::new(&buf[..len + extra])).unwrap();
        assert_eq!(parser.exit_message(), Err(Error::InvalidTlvTag));
    }

    #[test]
    fn duplicate_context_tag_rejected() {
        let mut buf = [0; 64];
        let len = sample_struct(&mut buf, &[(0, 1), (0, 2)]);
        assert_eq!(
            IbParser::init_message(TlvReader::new(&buf[..len])).unwrap_err(),
            Error::InvalidTlvTag
        );
    }

    #[test]
    fn descending_context_tags_rejected() {
        let mut buf = [0; 64];
        let len = sample_struct(&mut buf, &[(3, 1), (1, 2)]);
        assert_eq!(
            IbParser::init_message(TlvReader::new(&buf[..len])).unwrap_err(),
            Error::InvalidTlvTag
        );
    }

    #[test]
    fn mistyped_field_reported() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let outer = w.start_container(Tag::Anonymous, TlvType::Structure).unwrap();
            w.put_boolean(Tag::Context(1), true).unwrap();
            w.end_container(outer).unwrap();
            w.len()
        };

        let parser = IbParser::init_message(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(parser.get_unsigned_u8(1), Err(Error::WrongTlvType));
        assert_eq!(parser.get_boolean(1), Ok(true));
    }

    #[test]
    fn nullable_field_states() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let outer = w.start_container(Tag::Anonymous, TlvType::Structure).unwrap();
            w.put_unsigned(Tag::Context(0), 5).unwrap();
            w.put_null(Tag::Context(1)).unwrap();
            w.end_container(outer).unwrap();
            w.len()
        };

        let parser = IbParser::init_message(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(parser.get_nullable_u16(0), Ok(Some(5)));
        assert_eq!(parser.get_nullable_u16(1), Ok(None));
        assert_eq!(parser.get_nullable_u16(2), Err(Error::EndOfTlv));
    }
}
