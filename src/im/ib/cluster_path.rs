//! ClusterPathIB: addresses a cluster instance.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::{ClusterId, EndpointId, NodeId};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the ClusterPathIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Node = 0,
    Endpoint = 1,
    Cluster = 2,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::List;

bitflags! {
    struct Fields: u8 {
        const CLUSTER = 1 << Tag::Cluster as u8;
    }
}

const REQUIRED: Fields = Fields::CLUSTER;

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

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        let mut seen = Fields::empty();
        pline!(pp, "ClusterPathIB =");
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
                    seen |= Fields::CLUSTER;
                    pline!(pp, "Cluster = 0x{:x},", reader.get_u32()?);
                }
                _ => {
                    debug!("ClusterPathIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if !seen.contains(REQUIRED) {
            return Err(Error::Malformed(Schema::ClusterPathIb));
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

    pub fn end_of_cluster_path_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvReader;

    #[test]
    fn missing_cluster_is_malformed() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w, TlvTag::Anonymous)
                .endpoint(1)
                .end_of_cluster_path_ib()
                .unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::ClusterPathIb))
        );
    }

    #[test]
    fn full_path_roundtrip() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w, TlvTag::Anonymous)
                .node(0x1122_3344_5566_7788)
                .endpoint(3)
                .cluster(0x0300)
                .end_of_cluster_path_ib()
                .unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.node(), Ok(0x1122_3344_5566_7788));
        assert_eq!(p.endpoint(), Ok(3));
        assert_eq!(p.cluster(), Ok(0x0300));
    }
}
