//! AttributeStatusIB: a path plus the status of the operation on it.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::{attribute_path, status};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the AttributeStatusIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Path = 0,
    Status = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

bitflags! {
    struct Fields: u8 {
        const PATH = 1 << Tag::Path as u8;
        const STATUS = 1 << Tag::Status as u8;
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: &TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_struct(reader)?,
        })
    }

    pub fn path(&self) -> Result<attribute_path::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Path as u8)?;
        attribute_path::Parser::init(&reader)
    }

    pub fn status(&self) -> Result<status::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Status as u8)?;
        status::Parser::init(&reader)
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        let mut seen = Fields::empty();
        pline!(pp, "AttributeStatusIB =");
        pline!(pp, "{{");
        pp.inc_depth();

        let mut reader = self.ib.reader.clone();
        loop {
            match reader.next() {
                Ok(()) => {}
                Err(Error::EndOfTlv) => break,
                Err(e) => return Err(e),
            }
            let tag_num = match reader.tag().context_num() {
                Some(num) => num,
                None => continue,
            };
            match tag_num {
                t if t == Tag::Path as u8 => {
                    seen |= Fields::PATH;
                    attribute_path::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::Status as u8 => {
                    seen |= Fields::STATUS;
                    status::Parser::init(&reader)?.walk(pp)?;
                }
                _ => {
                    debug!("AttributeStatusIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if !seen.contains(Fields::PATH | Fields::STATUS) {
            return Err(Error::Malformed(Schema::AttributeStatusIb));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Builder<'a, 'w>
where
    'a: 'w,
{
    ib: IbBuilder<'a, 'w>,
}

impl<'a, 'w> Builder<'a, 'w> {
    pub fn init(writer: &'w mut TlvWriter<'a>, tag: TlvTag) -> Self {
        Builder {
            ib: IbBuilder::open(writer, tag, CONTAINER_TYPE, None),
        }
    }

    pub(crate) fn with_state(ib: IbBuilder<'a, 'w>) -> Self {
        Builder { ib }
    }

    pub fn create_path(&mut self) -> attribute_path::Builder<'a, '_> {
        attribute_path::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Path as u8),
            attribute_path::CONTAINER_TYPE,
        ))
    }

    pub fn create_status(&mut self) -> status::Builder<'a, '_> {
        status::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Status as u8),
            status::CONTAINER_TYPE,
        ))
    }

    pub fn end_of_attribute_status_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::status::Status;
    use tlv::TlvReader;

    #[test]
    fn path_and_status_roundtrip() {
        let mut buf = [0; 128];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            b.create_path()
                .endpoint(1)
                .cluster(0x0006)
                .attribute(0x4001)
                .end_of_attribute_path_ib()
                .unwrap();
            b.create_status().encode(&Status::success()).unwrap();
            b.end_of_attribute_status_ib().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.path().unwrap().attribute(), Ok(0x4001));
        assert_eq!(p.status().unwrap().status(), Ok(Status::success()));
    }

    #[test]
    fn missing_status_is_malformed() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            b.create_path().endpoint(1).end_of_attribute_path_ib().unwrap();
            b.end_of_attribute_status_ib().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::AttributeStatusIb))
        );
    }
}
