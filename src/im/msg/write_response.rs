//! WriteResponseMessage: per-path statuses answering a WriteRequest.

use error::Error;
use im::builder::IbBuilder;
use im::ib::attribute_status_ibs;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the WriteResponseMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    WriteResponses = 0,
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

    pub fn write_responses(&self) -> Result<attribute_status_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::WriteResponses as u8)?;
        attribute_status_ibs::Parser::init(&reader)
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
        pline!(pp, "WriteResponseMessage =");
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
                t if t == Tag::WriteResponses as u8 => {
                    attribute_status_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!(
                        "WriteResponseMessage: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
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

    pub fn create_write_responses(&mut self) -> attribute_status_ibs::Builder<'a, '_> {
        attribute_status_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::WriteResponses as u8),
            TlvType::Array,
        ))
    }

    pub fn end_of_write_response(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::status::Status;

    #[test]
    fn roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            {
                let mut responses = b.create_write_responses();
                {
                    let mut status = responses.create_attribute_status();
                    status
                        .create_path()
                        .endpoint(1)
                        .cluster(0x0008)
                        .attribute(0)
                        .end_of_attribute_path_ib()
                        .unwrap();
                    status.create_status().encode(&Status::success()).unwrap();
                    status.end_of_attribute_status_ib().unwrap();
                }
                responses.end_of_attribute_status_ibs().unwrap();
            }
            b.end_of_write_response().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        let mut responses = p.write_responses().unwrap();
        let status = responses.next().unwrap();
        assert_eq!(status.status().unwrap().status(), Ok(Status::success()));
        assert_eq!(responses.next().unwrap_err(), Error::EndOfTlv);
        p.exit().unwrap();
    }
}
