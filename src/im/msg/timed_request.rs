//! TimedRequestMessage: arms a deadline for the follow-up write or invoke.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the TimedRequestMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    TimeoutMs = 0,
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

    /// Milliseconds the sender allows until the follow-up action arrives.
    pub fn timeout_ms(&self) -> Result<u16, Error> {
        self.ib.get_unsigned_u16(Tag::TimeoutMs as u8)
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
        let mut seen_timeout = false;
        pline!(pp, "TimedRequestMessage =");
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
                t if t == Tag::TimeoutMs as u8 => {
                    seen_timeout = true;
                    pline!(pp, "TimeoutMs = {},", reader.get_u16()?);
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!(
                        "TimedRequestMessage: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
        if !seen_timeout {
            return Err(Error::Malformed(Schema::TimedRequest));
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

    pub fn timeout_ms(&mut self, timeout: u16) -> &mut Self {
        self.ib.put_unsigned(Tag::TimeoutMs as u8, u64::from(timeout));
        self
    }

    pub fn end_of_timed_request(&mut self) -> Result<(), Error> {
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
                .timeout_ms(500)
                .end_of_timed_request()
                .unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.timeout_ms(), Ok(500));
        p.exit().unwrap();
    }

    #[test]
    fn missing_timeout_is_malformed() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w).end_of_timed_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::TimedRequest))
        );
    }
}
