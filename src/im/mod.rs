//! The interaction-model (IM) message layer.
//!
//! Every IM message is an anonymous TLV structure composed of
//! information blocks (IBs): small structure/list/array schemas with
//! context-tagged fields. This module provides one paired parser+builder per
//! IB ([`ib`]) and per top-level message ([`msg`]), layered on the generic
//! scaffolding in [`parser`] and [`builder`].
//!
//! [`ib`]: ib/index.html
//! [`msg`]: msg/index.html
//! [`parser`]: parser/index.html
//! [`builder`]: builder/index.html

#[macro_use]
pub mod printer;
pub mod builder;
pub mod parser;
pub mod paths;
pub mod payload;
pub mod ib;
pub mod msg;

/// Node identifier within a fabric.
pub type NodeId = u64;
/// Endpoint number on a node.
pub type EndpointId = u16;
/// Cluster identifier (vendor prefix in the high 16 bits).
pub type ClusterId = u32;
/// Attribute identifier (vendor prefix in the high 16 bits).
pub type AttributeId = u32;
/// Event identifier.
pub type EventId = u32;
/// Command identifier.
pub type CommandId = u32;
/// Index into a list-typed attribute.
pub type ListIndex = u16;
/// Monotonic version of a cluster's attribute data.
pub type DataVersion = u32;
/// Identifier of an active subscription.
pub type SubscriptionId = u32;
/// Monotonic number of an emitted event.
pub type EventNumber = u64;

/// Revision of the interaction model implemented by this codec.
///
/// Stamped at [`REVISION_TAG`] by every message builder. Parsers expose the
/// received value but never reject on it; reacting to a peer's revision is a
/// higher-layer concern.
///
/// [`REVISION_TAG`]: constant.REVISION_TAG.html
pub const INTERACTION_MODEL_REVISION: u8 = 1;

/// Context tag carrying the interaction-model revision on every top-level
/// message.
pub const REVISION_TAG: u8 = 0xff;

/// Protocol id identifying the interaction model in a StatusIB.
pub const INTERACTION_MODEL_PROTOCOL_ID: u32 = 0;
