//! StatusResponseMessage: a bare protocol-level status.

use error::{Error, ImStatusCode, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

use num_traits::FromPrimitive;

/// Context tags of the StatusResponseMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Status = 0,
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

    /// The raw status value.
    pub fn status_raw(&self) -> Result<u16, Error> {
        self.ib.get_unsigned_u16(Tag::Status as u8)
    }

    /// The status decoded as an IM status code. A value outside the known
    /// set makes the message malformed.
    pub fn status(&self) -> Result<ImStatusCode, Error> {
        let raw = self.status_raw()?;
        ImStatusCode::from_u16(raw).ok_or(Error::Malformed(Schema::StatusResponse))
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
        let mut seen_status = false;
        pline!(pp, "StatusResponseMessage =");
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
                t if t == Tag::Status as u8 => {
                    seen_status = true;
                    pline!(pp, "Status = 0x{:x},", reader.get_u16()?);
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!(
                        "StatusResponseMessage: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
        if !seen_status {
            return Err(Error::Malformed(Schema::StatusResponse));
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

    pub fn status(&mut self, status: ImStatusCode) -> &mut Self {
        self.ib.put_unsigned(Tag::Status as u8, status as u64);
        self
    }

    pub fn end_of_status_response(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w)
                .status(ImStatusCode::InvalidAction)
                .end_of_status_response()
                .unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.status(), Ok(ImStatusCode::InvalidAction));
        assert_eq!(p.status_raw(), Ok(0x80));
        p.exit().unwrap();
    }

    #[test]
    fn missing_status_is_malformed() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w).end_of_status_response().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::StatusResponse))
        );
    }
}
