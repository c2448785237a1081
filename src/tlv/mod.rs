//! The TLV (Tag-Length-Value) primitive layer.
//!
//! TLV is the self-describing binary encoding every interaction-model
//! message is built from. An element is `[control][tag][length][value]`:
//! the control byte packs a tag form (bits 7..5) and an element-type code
//! (bits 4..0), numeric values are little-endian with the narrowest width
//! the encoder can use, and container elements (structure/array/list) hold
//! child elements terminated by an end-of-container mark.
//!
//! [`TlvReader`] is a cursor over a byte slice; [`TlvWriter`] appends into a
//! caller-supplied buffer. Neither owns memory and neither performs I/O.
//!
//! [`TlvReader`]: struct.TlvReader.html
//! [`TlvWriter`]: struct.TlvWriter.html

mod tag;
mod reader;
mod writer;

pub use self::tag::Tag;
pub use self::reader::TlvReader;
pub use self::writer::{Checkpoint, TlvWriter};

/// The type of a TLV element, as exposed to users of the codec.
///
/// `NotSpecified` is a writer-side sentinel: it is the outer-container type
/// of a writer/reader that is not inside any container, and the value a
/// builder's saved container type is reset to once the container is closed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TlvType {
    NotSpecified,
    SignedInteger,
    UnsignedInteger,
    Boolean,
    Float,
    Double,
    Utf8String,
    ByteString,
    Null,
    Structure,
    Array,
    List,
}

impl TlvType {
    /// Whether elements of this type contain child elements.
    pub fn is_container(&self) -> bool {
        match *self {
            TlvType::Structure | TlvType::Array | TlvType::List => true,
            _ => false,
        }
    }
}

/// Raw element-type code from the low 5 bits of the control byte.
///
/// Integer and string codes encode their width/length-field size; the public
/// [`TlvType`] collapses those width variants.
///
/// [`TlvType`]: enum.TlvType.html
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub(crate) enum ElementType {
    Int8 = 0x00,
    Int16 = 0x01,
    Int32 = 0x02,
    Int64 = 0x03,
    UInt8 = 0x04,
    UInt16 = 0x05,
    UInt32 = 0x06,
    UInt64 = 0x07,
    BooleanFalse = 0x08,
    BooleanTrue = 0x09,
    Float32 = 0x0a,
    Float64 = 0x0b,
    Utf8Len1 = 0x0c,
    Utf8Len2 = 0x0d,
    Utf8Len4 = 0x0e,
    Utf8Len8 = 0x0f,
    BytesLen1 = 0x10,
    BytesLen2 = 0x11,
    BytesLen4 = 0x12,
    BytesLen8 = 0x13,
    Null = 0x14,
    Structure = 0x15,
    Array = 0x16,
    List = 0x17,
    EndOfContainer = 0x18,
}

impl ElementType {
    pub fn tlv_type(self) -> TlvType {
        use self::ElementType::*;

        match self {
            Int8 | Int16 | Int32 | Int64 => TlvType::SignedInteger,
            UInt8 | UInt16 | UInt32 | UInt64 => TlvType::UnsignedInteger,
            BooleanFalse | BooleanTrue => TlvType::Boolean,
            Float32 => TlvType::Float,
            Float64 => TlvType::Double,
            Utf8Len1 | Utf8Len2 | Utf8Len4 | Utf8Len8 => TlvType::Utf8String,
            BytesLen1 | BytesLen2 | BytesLen4 | BytesLen8 => TlvType::ByteString,
            Null => TlvType::Null,
            Structure => TlvType::Structure,
            Array => TlvType::Array,
            List => TlvType::List,
            EndOfContainer => TlvType::NotSpecified,
        }
    }

    /// Size of the fixed-width value that follows the tag, if any.
    pub fn fixed_value_size(self) -> Option<usize> {
        use self::ElementType::*;

        Some(match self {
            Int8 | UInt8 => 1,
            Int16 | UInt16 => 2,
            Int32 | UInt32 | Float32 => 4,
            Int64 | UInt64 | Float64 => 8,
            BooleanFalse | BooleanTrue | Null | EndOfContainer => 0,
            _ => return None,
        })
    }

    /// Width of the length prefix for string-typed elements.
    pub fn length_field_size(self) -> Option<usize> {
        use self::ElementType::*;

        Some(match self {
            Utf8Len1 | BytesLen1 => 1,
            Utf8Len2 | BytesLen2 => 2,
            Utf8Len4 | BytesLen4 => 4,
            Utf8Len8 | BytesLen8 => 8,
            _ => return None,
        })
    }
}
