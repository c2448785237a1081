//! Path parameter types produced by the path IB parsers.

use im::{AttributeId, ClusterId, CommandId, EndpointId, EventId, ListIndex, NodeId};

/// An attribute path request, possibly wildcarded.
///
/// `None` on an axis means wildcard: the request addresses every value on
/// that axis.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttributePathParams {
    pub node: Option<NodeId>,
    pub endpoint: Option<EndpointId>,
    pub cluster: Option<ClusterId>,
    pub attribute: Option<AttributeId>,
    pub list_index: Option<ListIndex>,
}

impl AttributePathParams {
    pub fn has_wildcard_endpoint(&self) -> bool {
        self.endpoint.is_none()
    }

    pub fn has_wildcard_cluster(&self) -> bool {
        self.cluster.is_none()
    }

    pub fn has_wildcard_attribute(&self) -> bool {
        self.attribute.is_none()
    }

    /// Whether any axis is wildcarded.
    pub fn is_wildcard(&self) -> bool {
        self.endpoint.is_none() || self.cluster.is_none() || self.attribute.is_none()
    }
}

/// An event path request, possibly wildcarded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventPathParams {
    pub node: Option<NodeId>,
    pub endpoint: Option<EndpointId>,
    pub cluster: Option<ClusterId>,
    pub event: Option<EventId>,
    pub is_urgent: bool,
}

/// How an attribute write addresses a list-typed attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListOperation {
    /// Not addressing a list member. Consumers treat this as replace-all
    /// when the attribute itself is a list.
    NotList,
    /// Append one item (encoded as a null list index).
    AppendItem,
}

/// A fully concrete attribute path, as carried in report and write data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteDataAttributePath {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub attribute: AttributeId,
    pub list_op: ListOperation,
}

/// A fully concrete command path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConcreteCommandPath {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub command: CommandId,
}

const VENDOR_MASK: u32 = 0xffff_0000;
const SCOPED_MASK: u32 = 0x0000_ffff;

/// Whether a cluster id is in a defined range: a standard id (zero vendor
/// prefix, scoped part up to 0x7fff) or a vendor id with a scoped part in
/// 0xfc00..=0xfffe.
pub fn is_valid_cluster_id(id: ClusterId) -> bool {
    let scoped = id & SCOPED_MASK;
    if id & VENDOR_MASK == 0 {
        scoped <= 0x7fff
    } else {
        scoped >= 0xfc00 && scoped <= 0xfffe
    }
}

/// Whether an attribute id is in a defined range (scoped part up to 0xfffe).
pub fn is_valid_attribute_id(id: AttributeId) -> bool {
    id & SCOPED_MASK <= 0xfffe
}

/// Whether an attribute id names one of the global attributes every cluster
/// carries (scoped 0xfff8..=0xfffd, zero vendor prefix).
pub fn is_global_attribute(id: AttributeId) -> bool {
    id & VENDOR_MASK == 0 && {
        let scoped = id & SCOPED_MASK;
        scoped >= 0xfff8 && scoped <= 0xfffd
    }
}
