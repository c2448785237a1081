//! Top-level message codecs.
//!
//! Every message is an anonymous TLV structure whose final context-tagged
//! field is the interaction-model revision. Parsers are initialized on a
//! fresh [`TlvReader`] over the payload; builders append into a
//! [`TlvWriter`] and stamp the revision from their `end_of_*` finalizer.
//!
//! [`TlvReader`]: ../../tlv/struct.TlvReader.html
//! [`TlvWriter`]: ../../tlv/struct.TlvWriter.html

pub mod invoke_request;
pub mod invoke_response;
pub mod read_request;
pub mod report_data;
pub mod status_response;
pub mod subscribe_request;
pub mod subscribe_response;
pub mod timed_request;
pub mod write_request;
pub mod write_response;
