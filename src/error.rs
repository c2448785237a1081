//! Defines error types and wire status codes.

use std::fmt;

/// Error raised by the TLV layer and the IM message codecs.
///
/// Primitive-layer errors bubble up unchanged; the IB and message parsers
/// translate a missing required field into their named [`Malformed`] kind.
/// `EndOfTlv` doubles as the "optional field is absent" sentinel returned by
/// the typed field accessors.
///
/// [`Malformed`]: #variant.Malformed
#[derive(Debug, Fail, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The reader ran past the end of its input slice.
    #[fail(display = "unexpected end of TLV input")]
    BufferUnderrun,
    /// The writer exhausted its output buffer (or would encroach on an
    /// active reservation).
    #[fail(display = "TLV output buffer is full")]
    BufferFull,
    /// An element was present but its type did not match what the accessor
    /// expected, or its encoded value does not fit the requested type.
    #[fail(display = "TLV element has the wrong type")]
    WrongTlvType,
    /// A tag appeared that is disallowed at its position: duplicated or
    /// out-of-order context tag in a structure, a non-anonymous tag inside
    /// an array, or trailing data after a top-level message.
    #[fail(display = "invalid TLV tag for this position")]
    InvalidTlvTag,
    /// The requested optional element is absent, or the container is fully
    /// consumed. Informational; callers iterating a container treat this as
    /// the normal end condition.
    #[fail(display = "end of TLV container")]
    EndOfTlv,
    /// The control byte carried an element-type code outside the closed set.
    #[fail(display = "unknown TLV element type 0x{:02x}", _0)]
    UnknownElementType(u8),
    /// A builder was driven in an impossible order, e.g. both variants of an
    /// exactly-one-of IB, or a double close.
    #[fail(display = "codec used in an incorrect state")]
    IncorrectState,
    /// A required field is missing or a cross-field invariant is violated.
    #[fail(display = "malformed {}", _0)]
    Malformed(Schema),
    /// The element parses but is semantically impossible, e.g. a wildcard
    /// cluster paired with a non-global concrete attribute.
    #[fail(display = "invalid action")]
    InvalidAction,
}

/// Names the IB or message schema a [`Error::Malformed`] refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Schema {
    AttributePathIb,
    ClusterPathIb,
    EventPathIb,
    CommandPathIb,
    AttributeDataIb,
    AttributeStatusIb,
    AttributeReportIb,
    EventDataIb,
    EventStatusIb,
    EventReportIb,
    EventFilterIb,
    DataVersionFilterIb,
    CommandDataIb,
    CommandStatusIb,
    InvokeResponseIb,
    StatusIb,
    ReadRequest,
    SubscribeRequest,
    SubscribeResponse,
    ReportData,
    WriteRequest,
    WriteResponse,
    InvokeRequest,
    InvokeResponse,
    StatusResponse,
    TimedRequest,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Schema::*;

        f.write_str(match *self {
            AttributePathIb => "AttributePathIB",
            ClusterPathIb => "ClusterPathIB",
            EventPathIb => "EventPathIB",
            CommandPathIb => "CommandPathIB",
            AttributeDataIb => "AttributeDataIB",
            AttributeStatusIb => "AttributeStatusIB",
            AttributeReportIb => "AttributeReportIB",
            EventDataIb => "EventDataIB",
            EventStatusIb => "EventStatusIB",
            EventReportIb => "EventReportIB",
            EventFilterIb => "EventFilterIB",
            DataVersionFilterIb => "DataVersionFilterIB",
            CommandDataIb => "CommandDataIB",
            CommandStatusIb => "CommandStatusIB",
            InvokeResponseIb => "InvokeResponseIB",
            StatusIb => "StatusIB",
            ReadRequest => "ReadRequestMessage",
            SubscribeRequest => "SubscribeRequestMessage",
            SubscribeResponse => "SubscribeResponseMessage",
            ReportData => "ReportDataMessage",
            WriteRequest => "WriteRequestMessage",
            WriteResponse => "WriteResponseMessage",
            InvokeRequest => "InvokeRequestMessage",
            InvokeResponse => "InvokeResponseMessage",
            StatusResponse => "StatusResponseMessage",
            TimedRequest => "TimedRequestMessage",
        })
    }
}

/// An interaction-model status code understood by the protocol.
///
/// Carried in StatusResponse messages and in the protocol-code slot of a
/// StatusIB whose protocol id is the interaction model.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, Fail)]
pub enum ImStatusCode {
    #[fail(display = "Success")]
    Success = 0x00,
    #[fail(display = "Failure")]
    Failure = 0x01,
    #[fail(display = "Invalid subscription")]
    InvalidSubscription = 0x7d,
    #[fail(display = "Unsupported access")]
    UnsupportedAccess = 0x7e,
    #[fail(display = "Unsupported endpoint")]
    UnsupportedEndpoint = 0x7f,
    #[fail(display = "Invalid action")]
    InvalidAction = 0x80,
    #[fail(display = "Unsupported command")]
    UnsupportedCommand = 0x81,
    #[fail(display = "Invalid command")]
    InvalidCommand = 0x85,
    #[fail(display = "Unsupported attribute")]
    UnsupportedAttribute = 0x86,
    #[fail(display = "Constraint error")]
    ConstraintError = 0x87,
    #[fail(display = "Unsupported write")]
    UnsupportedWrite = 0x88,
    #[fail(display = "Resource exhausted")]
    ResourceExhausted = 0x89,
    #[fail(display = "Not found")]
    NotFound = 0x8b,
    #[fail(display = "Unreportable attribute")]
    UnreportableAttribute = 0x8c,
    #[fail(display = "Invalid data type")]
    InvalidDataType = 0x8d,
    #[fail(display = "Unsupported read")]
    UnsupportedRead = 0x8f,
    #[fail(display = "Data version mismatch")]
    DataVersionMismatch = 0x92,
    #[fail(display = "Timeout")]
    Timeout = 0x94,
    #[fail(display = "Busy")]
    Busy = 0x9c,
    #[fail(display = "Unsupported cluster")]
    UnsupportedCluster = 0xc3,
    #[fail(display = "No upstream subscription")]
    NoUpstreamSubscription = 0xc5,
    #[fail(display = "Needs timed interaction")]
    NeedsTimedInteraction = 0xc6,
    #[fail(display = "Unsupported event")]
    UnsupportedEvent = 0xc7,
    #[fail(display = "Paths exhausted")]
    PathsExhausted = 0xc8,
    #[fail(display = "Timed request mismatch")]
    TimedRequestMismatch = 0xc9,
    #[fail(display = "Failsafe required")]
    FailsafeRequired = 0xca,
}

/// General status code carried in the first slot of a StatusIB.
///
/// These are protocol-independent; the protocol-id/protocol-code pair that
/// follows refines them.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum GeneralCode {
    Success = 0,
    Failure = 1,
    BadPrecondition = 2,
    OutOfRange = 3,
    BadRequest = 4,
    Unsupported = 5,
    Unexpected = 6,
    ResourceExhausted = 7,
    Busy = 8,
    Timeout = 9,
    Continue = 10,
    Aborted = 11,
    InvalidArgument = 12,
    NotFound = 13,
    AlreadyExists = 14,
    PermissionDenied = 15,
    DataLoss = 16,
}
