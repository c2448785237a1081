//! Append-only TLV writer over a caller-supplied buffer.

use error::Error;
use tlv::tag::Tag;
use tlv::{ElementType, TlvReader, TlvType};

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// A saved writer state for single-level undo.
///
/// Produced by [`TlvWriter::checkpoint`]; restoring it with
/// [`TlvWriter::rollback`] discards everything written since, including
/// reservation changes.
///
/// [`TlvWriter::checkpoint`]: struct.TlvWriter.html#method.checkpoint
/// [`TlvWriter::rollback`]: struct.TlvWriter.html#method.rollback
#[derive(Debug, Copy, Clone)]
pub struct Checkpoint {
    len: usize,
    reserved: usize,
    container: TlvType,
}

/// Append cursor over a caller-owned output buffer.
///
/// Elements are written atomically: a `put_*` that does not fit leaves the
/// buffer exactly as it was and returns [`Error::BufferFull`]. A portion of
/// the tail of the buffer can be set aside with [`reserve_buffer`] so that
/// closing tokens are guaranteed to fit after arbitrary payload.
///
/// [`Error::BufferFull`]: ../error/enum.Error.html#variant.BufferFull
/// [`reserve_buffer`]: #method.reserve_buffer
pub struct TlvWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
    reserved: usize,
    container: TlvType,
}

impl<'a> TlvWriter<'a> {
    /// Creates a writer that appends from the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        TlvWriter {
            buf,
            len: 0,
            reserved: 0,
            container: TlvType::NotSpecified,
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.len - self.reserved
    }

    /// Emits one element head plus value, all or nothing.
    fn put_element(&mut self, etype: ElementType, tag: Tag, value: &[u8]) -> Result<(), Error> {
        let (form, tag_bytes, tag_len) = tag.encode();
        if 1 + tag_len + value.len() > self.remaining() {
            return Err(Error::BufferFull);
        }

        self.buf[self.len] = etype as u8 | form;
        self.len += 1;
        self.buf[self.len..self.len + tag_len].copy_from_slice(&tag_bytes[..tag_len]);
        self.len += tag_len;
        self.buf[self.len..self.len + value.len()].copy_from_slice(value);
        self.len += value.len();
        Ok(())
    }

    /// Appends an unsigned integer, using the narrowest width that holds
    /// the value.
    pub fn put_unsigned(&mut self, tag: Tag, value: u64) -> Result<(), Error> {
        let mut bytes = [0; 8];
        LittleEndian::write_u64(&mut bytes, value);
        let (etype, width) = if value <= 0xff {
            (ElementType::UInt8, 1)
        } else if value <= 0xffff {
            (ElementType::UInt16, 2)
        } else if value <= 0xffff_ffff {
            (ElementType::UInt32, 4)
        } else {
            (ElementType::UInt64, 8)
        };
        self.put_element(etype, tag, &bytes[..width])
    }

    /// Appends a signed integer, using the narrowest width that holds the
    /// value.
    pub fn put_signed(&mut self, tag: Tag, value: i64) -> Result<(), Error> {
        let mut bytes = [0; 8];
        LittleEndian::write_i64(&mut bytes, value);
        let (etype, width) = if value >= i64::from(i8::min_value())
            && value <= i64::from(i8::max_value())
        {
            (ElementType::Int8, 1)
        } else if value >= i64::from(i16::min_value()) && value <= i64::from(i16::max_value()) {
            (ElementType::Int16, 2)
        } else if value >= i64::from(i32::min_value()) && value <= i64::from(i32::max_value()) {
            (ElementType::Int32, 4)
        } else {
            (ElementType::Int64, 8)
        };
        self.put_element(etype, tag, &bytes[..width])
    }

    /// Appends a boolean. The value lives in the element-type code; there
    /// are no value bytes.
    pub fn put_boolean(&mut self, tag: Tag, value: bool) -> Result<(), Error> {
        let etype = if value {
            ElementType::BooleanTrue
        } else {
            ElementType::BooleanFalse
        };
        self.put_element(etype, tag, &[])
    }

    /// Appends a null element.
    pub fn put_null(&mut self, tag: Tag) -> Result<(), Error> {
        self.put_element(ElementType::Null, tag, &[])
    }

    pub fn put_f32(&mut self, tag: Tag, value: f32) -> Result<(), Error> {
        let mut bytes = [0; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.put_element(ElementType::Float32, tag, &bytes)
    }

    pub fn put_f64(&mut self, tag: Tag, value: f64) -> Result<(), Error> {
        let mut bytes = [0; 8];
        LittleEndian::write_f64(&mut bytes, value);
        self.put_element(ElementType::Float64, tag, &bytes)
    }

    fn put_string(
        &mut self,
        base: ElementType,
        tag: Tag,
        payload: &[u8],
    ) -> Result<(), Error> {
        let len = payload.len() as u64;
        let mut len_bytes = [0; 8];
        LittleEndian::write_u64(&mut len_bytes, len);
        let (off, width) = if len <= 0xff {
            (0, 1)
        } else if len <= 0xffff {
            (1, 2)
        } else if len <= 0xffff_ffff {
            (2, 4)
        } else {
            (3, 8)
        };
        let etype = match base as u8 + off {
            c if c == ElementType::Utf8Len1 as u8 => ElementType::Utf8Len1,
            c if c == ElementType::Utf8Len2 as u8 => ElementType::Utf8Len2,
            c if c == ElementType::Utf8Len4 as u8 => ElementType::Utf8Len4,
            c if c == ElementType::Utf8Len8 as u8 => ElementType::Utf8Len8,
            c if c == ElementType::BytesLen1 as u8 => ElementType::BytesLen1,
            c if c == ElementType::BytesLen2 as u8 => ElementType::BytesLen2,
            c if c == ElementType::BytesLen4 as u8 => ElementType::BytesLen4,
            _ => ElementType::BytesLen8,
        };

        let (form, tag_bytes, tag_len) = tag.encode();
        if 1 + tag_len + width + payload.len() > self.remaining() {
            return Err(Error::BufferFull);
        }
        self.buf[self.len] = etype as u8 | form;
        self.len += 1;
        self.buf[self.len..self.len + tag_len].copy_from_slice(&tag_bytes[..tag_len]);
        self.len += tag_len;
        self.buf[self.len..self.len + width].copy_from_slice(&len_bytes[..width]);
        self.len += width;
        self.buf[self.len..self.len + payload.len()].copy_from_slice(payload);
        self.len += payload.len();
        Ok(())
    }

    /// Appends a UTF-8 string with a length prefix.
    pub fn put_utf8(&mut self, tag: Tag, value: &str) -> Result<(), Error> {
        self.put_string(ElementType::Utf8Len1, tag, value.as_bytes())
    }

    /// Appends a byte string with a length prefix.
    pub fn put_bytes(&mut self, tag: Tag, value: &[u8]) -> Result<(), Error> {
        self.put_string(ElementType::BytesLen1, tag, value)
    }

    /// Opens a container element and returns the previous outer-container
    /// type, to be handed back to [`end_container`].
    ///
    /// [`end_container`]: #method.end_container
    pub fn start_container(&mut self, tag: Tag, ty: TlvType) -> Result<TlvType, Error> {
        let etype = match ty {
            TlvType::Structure => ElementType::Structure,
            TlvType::Array => ElementType::Array,
            TlvType::List => ElementType::List,
            _ => return Err(Error::IncorrectState),
        };
        self.put_element(etype, tag, &[])?;
        let outer = self.container;
        self.container = ty;
        Ok(outer)
    }

    /// Closes the container opened last by writing the terminator element.
    pub fn end_container(&mut self, outer: TlvType) -> Result<(), Error> {
        if self.container == TlvType::NotSpecified {
            return Err(Error::IncorrectState);
        }
        self.put_element(ElementType::EndOfContainer, Tag::Anonymous, &[])?;
        self.container = outer;
        Ok(())
    }

    /// Sets aside `n` bytes at the tail of the buffer.
    ///
    /// Subsequent writes fail with buffer-full rather than encroach on the
    /// reservation; [`unreserve_buffer`] gives the bytes back when it is
    /// time to emit the guaranteed trailer.
    ///
    /// [`unreserve_buffer`]: #method.unreserve_buffer
    pub fn reserve_buffer(&mut self, n: usize) -> Result<(), Error> {
        if n > self.remaining() {
            return Err(Error::BufferFull);
        }
        self.reserved += n;
        Ok(())
    }

    /// Releases `n` previously reserved bytes.
    pub fn unreserve_buffer(&mut self, n: usize) -> Result<(), Error> {
        if n > self.reserved {
            return Err(Error::IncorrectState);
        }
        self.reserved -= n;
        Ok(())
    }

    /// Saves the current writer state.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.len,
            reserved: self.reserved,
            container: self.container,
        }
    }

    /// Restores a state previously saved with [`checkpoint`], undoing any
    /// encoding performed since.
    ///
    /// [`checkpoint`]: #method.checkpoint
    pub fn rollback(&mut self, saved: &Checkpoint) {
        self.len = saved.len;
        self.reserved = saved.reserved;
        self.container = saved.container;
    }

    /// Copies the reader's current element verbatim, re-tagging it.
    ///
    /// The element body (length prefix, value, and for containers the whole
    /// child stream including the terminator) is copied byte for byte; only
    /// the tag is replaced.
    pub fn copy_element(&mut self, tag: Tag, reader: &TlvReader) -> Result<(), Error> {
        let (etype_code, body) = reader.raw_element()?;
        let (form, tag_bytes, tag_len) = tag.encode();
        if 1 + tag_len + body.len() > self.remaining() {
            return Err(Error::BufferFull);
        }
        self.buf[self.len] = etype_code | form;
        self.len += 1;
        self.buf[self.len..self.len + tag_len].copy_from_slice(&tag_bytes[..tag_len]);
        self.len += tag_len;
        self.buf[self.len..self.len + body.len()].copy_from_slice(body);
        self.len += body.len();
        Ok(())
    }
}

impl<'a> fmt::Debug for TlvWriter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TlvWriter")
            .field("capacity", &self.buf.len())
            .field("len", &self.len)
            .field("reserved", &self.reserved)
            .field("container", &self.container)
            .finish()
    }
}
