//! EventPathIB: addresses an event source, possibly with wildcards.

use error::Error;
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::paths::EventPathParams;
use im::printer::PrettyPrinter;
use im::{ClusterId, EndpointId, EventId, NodeId};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the EventPathIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Node = 0,
    Endpoint = 1,
    Cluster = 2,
    Event = 3,
    IsUrgent = 4,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::List;

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: &TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_list(reader)?,
        })
    }

    pub fn node(&self) -> Result<NodeId, Error> {
        self.ib.get_unsigned_u64(Tag::Node as u8)
    }

    pub fn endpoint(&self) -> Result<EndpointId, Error> {
        self.ib.get_unsigned_u16(Tag::Endpoint as u8)
    }

    pub fn cluster(&self) -> Result<ClusterId, Error> {
        self.ib.get_unsigned_u32(Tag::Cluster as u8)
    }

    pub fn event(&self) -> Result<EventId, Error> {
        self.ib.get_unsigned_u32(Tag::Event as u8)
    }

    pub fn is_urgent(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::IsUrgent as u8)
    }

    /// Parses the path into wildcard-aware parameters. Mistyped fields are
    /// reported as `invalid-action`.
    pub fn parse_path(&self) -> Result<EventPathParams, Error> {
        let mut params = EventPathParams::default();

        match self.node() {
            Ok(node) => params.node = Some(node),
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }
        match self.endpoint() {
            Ok(endpoint) => params.endpoint = Some(endpoint),
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }
        match self.cluster() {
            Ok(cluster) => params.cluster = Some(cluster),
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }
        match self.event() {
            Ok(event) => params.event = Some(event),
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }
        match self.is_urgent() {
            Ok(urgent) => params.is_urgent = urgent,
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }

        Ok(params)
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        pline!(pp, "EventPathIB =");
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
                t if t == Tag::Endpoint as u8 => {
                    pline!(pp, "Endpoint = 0x{:x},", reader.get_u16()?);
                }
                t if t == Tag::Cluster as u8 => {
                    pline!(pp, "Cluster = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::Event as u8 => {
                    pline!(pp, "Event = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::IsUrgent as u8 => {
                    pline!(pp, "IsUrgent = {},", reader.get_bool()?);
                }
                _ => {
                    debug!("EventPathIB: skipping unknown tag 0x{:02x}", tag_num);
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

    pub fn endpoint(&mut self, endpoint: EndpointId) -> &mut Self {
        self.ib.put_unsigned(Tag::Endpoint as u8, u64::from(endpoint));
        self
    }

    pub fn cluster(&mut self, cluster: ClusterId) -> &mut Self {
        self.ib.put_unsigned(Tag::Cluster as u8, u64::from(cluster));
        self
    }

    pub fn event(&mut self, event: EventId) -> &mut Self {
        self.ib.put_unsigned(Tag::Event as u8, u64::from(event));
        self
    }

    pub fn is_urgent(&mut self, urgent: bool) -> &mut Self {
        self.ib.put_boolean(Tag::IsUrgent as u8, urgent);
        self
    }

    /// Encodes wildcard-aware parameters: wildcarded axes are omitted, and
    /// the urgent flag is only written when set.
    pub fn encode(&mut self, params: &EventPathParams) -> Result<(), Error> {
        if let Some(node) = params.node {
            self.node(node);
        }
        if let Some(endpoint) = params.endpoint {
            self.endpoint(endpoint);
        }
        if let Some(cluster) = params.cluster {
            self.cluster(cluster);
        }
        if let Some(event) = params.event {
            self.event(event);
        }
        if params.is_urgent {
            self.is_urgent(true);
        }
        self.end_of_event_path_ib()
    }

    pub fn end_of_event_path_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvReader;

    #[test]
    fn params_roundtrip() {
        let params = EventPathParams {
            node: None,
            endpoint: Some(1),
            cluster: Some(0x0028),
            event: Some(0x03),
            is_urgent: true,
        };

        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w, TlvTag::Anonymous).encode(&params).unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.parse_path().unwrap(), params);
        assert_eq!(p.node(), Err(Error::EndOfTlv));
    }
}
