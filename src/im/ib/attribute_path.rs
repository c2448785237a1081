//! AttributePathIB: addresses an attribute, possibly with wildcards.
//!
//! Encoded as a list. Every field is optional on the wire; omitting a
//! selector means wildcard on that axis. A null list index addresses
//! "append item" on a list-typed attribute.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::paths::{
    is_global_attribute, is_valid_attribute_id, is_valid_cluster_id, AttributePathParams,
    ConcreteDataAttributePath, ListOperation,
};
use im::printer::PrettyPrinter;
use im::{AttributeId, ClusterId, EndpointId, ListIndex, NodeId};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the AttributePathIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    EnableTagCompression = 0,
    Node = 1,
    Endpoint = 2,
    Cluster = 3,
    Attribute = 4,
    ListIndex = 5,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::List;

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    /// Initializes the parser on the list element the reader is positioned
    /// on.
    pub fn init(reader: &TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_list(reader)?,
        })
    }

    pub fn enable_tag_compression(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::EnableTagCompression as u8)
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

    pub fn attribute(&self) -> Result<AttributeId, Error> {
        self.ib.get_unsigned_u32(Tag::Attribute as u8)
    }

    /// The list index; `Ok(None)` when the index is encoded null.
    pub fn list_index(&self) -> Result<Option<ListIndex>, Error> {
        self.ib.get_nullable_u16(Tag::ListIndex as u8)
    }

    /// Parses the path into wildcard-aware parameters, applying the
    /// validity checks each path item must satisfy. Any violation is
    /// reported as `invalid-action`.
    pub fn parse_path(&self) -> Result<AttributePathParams, Error> {
        let mut params = AttributePathParams::default();

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
            Ok(cluster) => {
                if !is_valid_cluster_id(cluster) {
                    return Err(Error::InvalidAction);
                }
                params.cluster = Some(cluster);
            }
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }

        match self.attribute() {
            Ok(attribute) => {
                if !is_valid_attribute_id(attribute) {
                    return Err(Error::InvalidAction);
                }
                params.attribute = Some(attribute);
            }
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }

        // A wildcard cluster requires the attribute to be wildcard as well,
        // or to name a global attribute.
        if params.cluster.is_none() {
            match params.attribute {
                None => {}
                Some(attribute) if is_global_attribute(attribute) => {}
                Some(_) => return Err(Error::InvalidAction),
            }
        }

        match self.list_index() {
            Ok(Some(index)) => {
                if params.attribute.is_none() {
                    return Err(Error::InvalidAction);
                }
                params.list_index = Some(index);
            }
            // A wildcard or null list index cannot be requested.
            Ok(None) => return Err(Error::InvalidAction),
            Err(Error::EndOfTlv) => {}
            Err(_) => return Err(Error::InvalidAction),
        }

        Ok(params)
    }

    /// Reads the path as fully concrete, as required in report and write
    /// data. A null list index maps to the append-item list operation.
    pub fn concrete_path(&self) -> Result<ConcreteDataAttributePath, Error> {
        let cluster = self.cluster()?;
        let attribute = self.attribute()?;
        if !is_valid_cluster_id(cluster) || !is_valid_attribute_id(attribute) {
            return Err(Error::InvalidAction);
        }
        let endpoint = self.endpoint()?;

        let list_op = match self.list_index() {
            Ok(None) => ListOperation::AppendItem,
            // Replacing a single item by index is not supported yet.
            Ok(Some(_)) => return Err(Error::Malformed(Schema::AttributePathIb)),
            Err(Error::EndOfTlv) => ListOperation::NotList,
            Err(e) => return Err(e),
        };

        Ok(ConcreteDataAttributePath {
            endpoint,
            cluster,
            attribute,
            list_op,
        })
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        pline!(pp, "AttributePathIB =");
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
                t if t == Tag::EnableTagCompression as u8 => {
                    pline!(pp, "EnableTagCompression = {},", reader.get_bool()?);
                }
                t if t == Tag::Node as u8 => {
                    pline!(pp, "Node = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::Endpoint as u8 => {
                    pline!(pp, "Endpoint = 0x{:x},", reader.get_u16()?);
                }
                t if t == Tag::Cluster as u8 => {
                    pline!(pp, "Cluster = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::Attribute as u8 => {
                    pline!(pp, "Attribute = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::ListIndex as u8 => match reader.element_type() {
                    TlvType::Null => pline!(pp, "ListIndex = null,"),
                    _ => pline!(pp, "ListIndex = 0x{:x},", reader.get_u16()?),
                },
                _ => {
                    debug!("AttributePathIB: skipping unknown tag 0x{:02x}", tag_num);
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
    /// Opens an AttributePathIB with the given tag.
    pub fn init(writer: &'w mut TlvWriter<'a>, tag: TlvTag) -> Self {
        Builder {
            ib: IbBuilder::open(writer, tag, CONTAINER_TYPE, None),
        }
    }

    pub(crate) fn with_state(ib: IbBuilder<'a, 'w>) -> Self {
        Builder { ib }
    }

    pub fn enable_tag_compression(&mut self, enable: bool) -> &mut Self {
        self.ib.put_boolean(Tag::EnableTagCompression as u8, enable);
        self
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

    pub fn attribute(&mut self, attribute: AttributeId) -> &mut Self {
        self.ib.put_unsigned(Tag::Attribute as u8, u64::from(attribute));
        self
    }

    /// Writes the list index; `None` encodes the null (append-item) index.
    pub fn list_index(&mut self, index: Option<ListIndex>) -> &mut Self {
        match index {
            Some(index) => self.ib.put_unsigned(Tag::ListIndex as u8, u64::from(index)),
            None => self.ib.put_null(Tag::ListIndex as u8),
        }
        self
    }

    /// Encodes wildcard-aware parameters: wildcarded axes are omitted.
    pub fn encode(&mut self, params: &AttributePathParams) -> Result<(), Error> {
        if let Some(node) = params.node {
            self.node(node);
        }
        if let Some(endpoint) = params.endpoint {
            self.endpoint(endpoint);
        }
        if let Some(cluster) = params.cluster {
            self.cluster(cluster);
        }
        if let Some(attribute) = params.attribute {
            self.attribute(attribute);
        }
        if let Some(index) = params.list_index {
            self.list_index(Some(index));
        }
        self.end_of_attribute_path_ib()
    }

    /// Encodes a concrete data path.
    pub fn encode_concrete(&mut self, path: &ConcreteDataAttributePath) -> Result<(), Error> {
        self.endpoint(path.endpoint);
        self.cluster(path.cluster);
        self.attribute(path.attribute);
        match path.list_op {
            ListOperation::NotList => {}
            ListOperation::AppendItem => {
                self.list_index(None);
            }
        }
        self.end_of_attribute_path_ib()
    }

    /// Closes the IB and returns the builder's final status.
    pub fn end_of_attribute_path_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}
