//! SubscribeResponseMessage: confirms a subscription and its final ceiling.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::{SubscriptionId, REVISION_TAG};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the SubscribeResponseMessage fields.
///
/// Tag 1 is unassigned in this schema revision.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    SubscriptionId = 0,
    MaxInterval = 2,
}

bitflags! {
    struct Fields: u8 {
        const SUBSCRIPTION_ID = 1 << Tag::SubscriptionId as u8;
        const MAX_INTERVAL = 1 << Tag::MaxInterval as u8;
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

    pub fn subscription_id(&self) -> Result<SubscriptionId, Error> {
        self.ib.get_unsigned_u32(Tag::SubscriptionId as u8)
    }

    pub fn max_interval(&self) -> Result<u16, Error> {
        self.ib.get_unsigned_u16(Tag::MaxInterval as u8)
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
        pline!(pp, "SubscribeResponseMessage =");
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
                t if t == Tag::SubscriptionId as u8 => {
                    seen |= Fields::SUBSCRIPTION_ID;
                    pline!(pp, "SubscriptionId = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::MaxInterval as u8 => {
                    seen |= Fields::MAX_INTERVAL;
                    pline!(pp, "MaxInterval = {},", reader.get_u16()?);
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!(
                        "SubscribeResponseMessage: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
        if !seen.contains(Fields::SUBSCRIPTION_ID | Fields::MAX_INTERVAL) {
            return Err(Error::Malformed(Schema::SubscribeResponse));
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

    pub fn subscription_id(&mut self, id: SubscriptionId) -> &mut Self {
        self.ib.put_unsigned(Tag::SubscriptionId as u8, u64::from(id));
        self
    }

    pub fn max_interval(&mut self, seconds: u16) -> &mut Self {
        self.ib.put_unsigned(Tag::MaxInterval as u8, u64::from(seconds));
        self
    }

    pub fn end_of_subscribe_response(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w)
                .subscription_id(0xdead_beef)
                .max_interval(300)
                .end_of_subscribe_response()
                .unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.subscription_id(), Ok(0xdead_beef));
        assert_eq!(p.max_interval(), Ok(300));
        p.exit().unwrap();
    }

    #[test]
    fn missing_subscription_id_is_malformed() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w)
                .max_interval(300)
                .end_of_subscribe_response()
                .unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::SubscribeResponse))
        );
    }
}
