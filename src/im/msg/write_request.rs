//! WriteRequestMessage: writes attribute values, possibly chunked.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::attribute_data_ibs;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the WriteRequestMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    SuppressResponse = 0,
    TimedRequest = 1,
    WriteRequests = 2,
    MoreChunkedMessages = 3,
}

bitflags! {
    struct Fields: u8 {
        const TIMED_REQUEST = 1 << Tag::TimedRequest as u8;
        const WRITE_REQUESTS = 1 << Tag::WriteRequests as u8;
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_message(reader)?,
        })
    }

    pub fn suppress_response(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::SuppressResponse as u8)
    }

    /// Whether the write was preceded by a TimedRequest.
    pub fn timed_request(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::TimedRequest as u8)
    }

    pub fn write_requests(&self) -> Result<attribute_data_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::WriteRequests as u8)?;
        attribute_data_ibs::Parser::init(&reader)
    }

    pub fn more_chunked_messages(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::MoreChunkedMessages as u8)
    }

    pub fn interaction_model_revision(&self) -> Result<u8, Error> {
        self.ib.get_unsigned_u8(REVISION_TAG)
    }

    pub fn exit(mut self) -> Result<(), Error> {
        self.ib.exit_message()
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        let mut seen = Fields::empty();
        pline!(pp, "WriteRequestMessage =");
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
                t if t == Tag::SuppressResponse as u8 => {
                    pline!(pp, "SuppressResponse = {},", reader.get_bool()?);
                }
                t if t == Tag::TimedRequest as u8 => {
                    seen |= Fields::TIMED_REQUEST;
                    pline!(pp, "TimedRequest = {},", reader.get_bool()?);
                }
                t if t == Tag::WriteRequests as u8 => {
                    seen |= Fields::WRITE_REQUESTS;
                    attribute_data_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::MoreChunkedMessages as u8 => {
                    pline!(pp, "MoreChunkedMessages = {},", reader.get_bool()?);
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!("WriteRequestMessage: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
        if !seen.contains(Fields::TIMED_REQUEST | Fields::WRITE_REQUESTS) {
            return Err(Error::Malformed(Schema::WriteRequest));
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
    pub fn init(writer: &'w mut TlvWriter<'a>) -> Self {
        Builder {
            ib: IbBuilder::open(writer, TlvTag::Anonymous, TlvType::Structure, None),
        }
    }

    pub fn suppress_response(&mut self, suppress: bool) -> &mut Self {
        self.ib.put_boolean(Tag::SuppressResponse as u8, suppress);
        self
    }

    pub fn timed_request(&mut self, timed: bool) -> &mut Self {
        self.ib.put_boolean(Tag::TimedRequest as u8, timed);
        self
    }

    pub fn create_write_requests(&mut self) -> attribute_data_ibs::Builder<'a, '_> {
        attribute_data_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::WriteRequests as u8),
            TlvType::Array,
        ))
    }

    pub fn more_chunked_messages(&mut self, more: bool) -> &mut Self {
        self.ib.put_boolean(Tag::MoreChunkedMessages as u8, more);
        self
    }

    pub fn end_of_write_request(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::attribute_data;

    #[test]
    fn write_roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            b.timed_request(false);
            {
                let mut writes = b.create_write_requests();
                {
                    let mut data = writes.create_attribute_data();
                    data.create_path()
                        .endpoint(1)
                        .cluster(0x0008)
                        .attribute(0)
                        .end_of_attribute_path_ib()
                        .unwrap();
                    data.writer()
                        .put_unsigned(attribute_data::Builder::data_tag(), 128)
                        .unwrap();
                    data.end_of_attribute_data_ib().unwrap();
                }
                writes.end_of_attribute_data_ibs().unwrap();
            }
            b.end_of_write_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.timed_request(), Ok(false));

        let mut writes = p.write_requests().unwrap();
        let data = writes.next().unwrap();
        assert_eq!(data.path().unwrap().cluster(), Ok(0x0008));
        assert_eq!(data.data().unwrap().get_u64(), Ok(128));
        p.exit().unwrap();
    }

    #[test]
    fn missing_timed_flag_is_malformed() {
        let mut buf = [0; 128];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            {
                let mut writes = b.create_write_requests();
                writes.end_of_attribute_data_ibs().unwrap();
            }
            b.end_of_write_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::WriteRequest))
        );
    }
}
