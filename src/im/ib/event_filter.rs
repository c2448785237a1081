//! EventFilterIB: lower bound on event numbers a subscriber cares about.

use error::Error;
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::{EventNumber, NodeId};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the EventFilterIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Node = 0,
    EventMin = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

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

    pub fn node(&self) -> Result<NodeId, Error> {
        self.ib.get_unsigned_u64(Tag::Node as u8)
    }

    pub fn event_min(&self) -> Result<EventNumber, Error> {
        self.ib.get_unsigned_u64(Tag::EventMin as u8)
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        pline!(pp, "EventFilterIB =");
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
                t if t == Tag::Node as u8 => {
                    pline!(pp, "Node = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::EventMin as u8 => {
                    pline!(pp, "EventMin = 0x{:x},", reader.get_u64()?);
                }
                _ => {
                    debug!("EventFilterIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
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

    pub fn node(&mut self, node: NodeId) -> &mut Self {
        self.ib.put_unsigned(Tag::Node as u8, node);
        self
    }

    pub fn event_min(&mut self, min: EventNumber) -> &mut Self {
        self.ib.put_unsigned(Tag::EventMin as u8, min);
        self
    }

    pub fn end_of_event_filter_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvReader;

    #[test]
    fn roundtrip() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w, TlvTag::Anonymous)
                .event_min(0x100)
                .end_of_event_filter_ib()
                .unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.event_min(), Ok(0x100));
        assert_eq!(p.node(), Err(Error::EndOfTlv));
    }
}
