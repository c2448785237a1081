//! Codec for Hearth's interaction-model (IM) messages.
//!
//! The IM is the request/response layer of the Hearth smart-home protocol:
//! Read, Subscribe, Report, Write, Invoke, Timed and Status messages, all
//! encoded in a self-describing binary TLV format. This crate is the boundary
//! between an encoded datagram and typed structure: byte slices go in and
//! traversable parsers come out, builder calls go in and wire bytes come out.
//!
//! There is no I/O here. Readers are transient views over caller-owned bytes;
//! writers append into a caller-supplied buffer. Session, exchange and
//! transport concerns live elsewhere in the stack.

#![warn(missing_debug_implementations)]

#[macro_use] extern crate log;
#[macro_use] extern crate num_derive;
#[macro_use] extern crate failure;
#[macro_use] extern crate bitflags;
extern crate byteorder;
extern crate num_traits;

#[cfg(test)]
extern crate env_logger;
#[cfg(test)]
extern crate rand;

pub mod error;
pub mod tlv;
pub mod im;

pub use error::*;
