//! Streaming zero-copy reader for untrusted TLV data.

use error::Error;
use tlv::tag::Tag;
use tlv::{ElementType, TlvType};

use byteorder::{ByteOrder, LittleEndian};
use num_traits::FromPrimitive;
use std::fmt;
use std::str;

/// A decoded element header.
#[derive(Debug, Copy, Clone)]
struct Element {
    tag: Tag,
    etype: ElementType,
    /// Offset just past the tag bytes (length prefix for strings, first
    /// child for containers, value bytes otherwise).
    body: usize,
    /// Offset of the value bytes.
    data: usize,
    /// Value length in bytes. Zero for containers; their extent is only
    /// known once the terminator has been located.
    len: usize,
}

/// Cursor-style reader over a TLV byte slice.
///
/// The reader is positioned *on* an element after a successful [`next`] and
/// the typed `get_*` accessors read that element. Containers are traversed
/// with [`enter_container`]/[`exit_container`]; the value returned by enter
/// is the previous outer-container type and must be handed back to exit.
///
/// The data stream is untrusted and checked on the fly, so everything here
/// returns `Result`s. Cloning a reader duplicates the cursor without copying
/// the underlying bytes.
///
/// [`next`]: #method.next
/// [`enter_container`]: #method.enter_container
/// [`exit_container`]: #method.exit_container
#[derive(Clone)]
pub struct TlvReader<'a> {
    buf: &'a [u8],
    /// Offset of the current element head, or of the next head if no
    /// element is current.
    pos: usize,
    elem: Option<Element>,
    /// Type of the container the cursor is inside. `NotSpecified` at the
    /// top level.
    container: TlvType,
}

impl<'a> TlvReader<'a> {
    /// Creates a reader over raw bytes (e.g. a message payload).
    pub fn new(buf: &'a [u8]) -> Self {
        TlvReader {
            buf,
            pos: 0,
            elem: None,
            container: TlvType::NotSpecified,
        }
    }

    /// Decodes the element head at `at`.
    fn parse_head(&self, at: usize) -> Result<Element, Error> {
        let control = *self.buf.get(at).ok_or(Error::BufferUnderrun)?;
        let type_bits = control & 0x1f;
        let etype =
            ElementType::from_u8(type_bits).ok_or(Error::UnknownElementType(type_bits))?;
        let (tag, tag_len) = Tag::parse(control & 0xe0, &self.buf[at + 1..])?;
        let body = at + 1 + tag_len;

        if etype == ElementType::EndOfContainer && tag != Tag::Anonymous {
            return Err(Error::InvalidTlvTag);
        }

        let (data, len) = if let Some(size) = etype.fixed_value_size() {
            if self.buf.len() < body + size {
                return Err(Error::BufferUnderrun);
            }
            (body, size)
        } else if let Some(width) = etype.length_field_size() {
            if self.buf.len() < body + width {
                return Err(Error::BufferUnderrun);
            }
            let len = LittleEndian::read_uint(&self.buf[body..], width) as usize;
            let data = body + width;
            if self.buf.len() < data + len {
                return Err(Error::BufferUnderrun);
            }
            (data, len)
        } else {
            // Container: children follow until the matching terminator.
            (body, 0)
        };

        Ok(Element {
            tag,
            etype,
            body,
            data,
            len,
        })
    }

    /// Offset just past the element, scanning nested containers as needed.
    fn element_end(&self, elem: &Element) -> Result<usize, Error> {
        if !elem.etype.tlv_type().is_container() {
            return Ok(elem.data + elem.len);
        }

        let mut at = elem.body;
        let mut depth = 1u32;
        loop {
            let child = self.parse_head(at)?;
            if child.etype == ElementType::EndOfContainer {
                at = child.body;
                depth -= 1;
                if depth == 0 {
                    return Ok(at);
                }
            } else if child.etype.tlv_type().is_container() {
                at = child.body;
                depth += 1;
            } else {
                at = child.data + child.len;
            }
        }
    }

    /// Advances to the next sibling element.
    ///
    /// Returns [`Error::EndOfTlv`] once the current container (or the
    /// top-level stream) holds no further elements. The cursor stays put in
    /// that case, so `exit_container` remains valid.
    ///
    /// [`Error::EndOfTlv`]: ../error/enum.Error.html#variant.EndOfTlv
    pub fn next(&mut self) -> Result<(), Error> {
        let start = match self.elem.take() {
            Some(elem) => self.element_end(&elem)?,
            None => self.pos,
        };
        self.pos = start;

        if start >= self.buf.len() {
            return if self.container == TlvType::NotSpecified {
                Err(Error::EndOfTlv)
            } else {
                // A container must be closed by a terminator before the
                // input runs out.
                Err(Error::BufferUnderrun)
            };
        }

        let elem = self.parse_head(start)?;
        if elem.etype == ElementType::EndOfContainer {
            if self.container == TlvType::NotSpecified {
                return Err(Error::InvalidTlvTag);
            }
            return Err(Error::EndOfTlv);
        }

        self.elem = Some(elem);
        Ok(())
    }

    /// Advances to the next element and checks it has the given type and tag.
    pub fn expect(&mut self, ty: TlvType, tag: Tag) -> Result<(), Error> {
        self.next()?;
        if self.tag() != tag {
            return Err(Error::InvalidTlvTag);
        }
        if self.element_type() != ty {
            return Err(Error::WrongTlvType);
        }
        Ok(())
    }

    /// Type of the current element, or `NotSpecified` when no element is
    /// current.
    pub fn element_type(&self) -> TlvType {
        self.elem.map(|e| e.etype.tlv_type()).unwrap_or(TlvType::NotSpecified)
    }

    /// Tag of the current element. Anonymous when no element is current.
    pub fn tag(&self) -> Tag {
        self.elem.map(|e| e.tag).unwrap_or(Tag::Anonymous)
    }

    /// Payload length of the current element: the byte length for strings,
    /// zero for every other type.
    pub fn get_length(&self) -> usize {
        match self.elem {
            Some(ref e) if e.etype.length_field_size().is_some() => e.len,
            _ => 0,
        }
    }

    fn current(&self) -> Result<&Element, Error> {
        self.elem.as_ref().ok_or(Error::WrongTlvType)
    }

    /// Reads the current element as an unsigned integer of any width.
    pub fn get_u64(&self) -> Result<u64, Error> {
        let e = self.current()?;
        if e.etype.tlv_type() != TlvType::UnsignedInteger {
            return Err(Error::WrongTlvType);
        }
        Ok(LittleEndian::read_uint(&self.buf[e.data..], e.len))
    }

    pub fn get_u32(&self) -> Result<u32, Error> {
        let v = self.get_u64()?;
        if v > u64::from(u32::max_value()) {
            return Err(Error::WrongTlvType);
        }
        Ok(v as u32)
    }

    pub fn get_u16(&self) -> Result<u16, Error> {
        let v = self.get_u64()?;
        if v > u64::from(u16::max_value()) {
            return Err(Error::WrongTlvType);
        }
        Ok(v as u16)
    }

    pub fn get_u8(&self) -> Result<u8, Error> {
        let v = self.get_u64()?;
        if v > u64::from(u8::max_value()) {
            return Err(Error::WrongTlvType);
        }
        Ok(v as u8)
    }

    /// Reads the current element as a signed integer of any width.
    pub fn get_i64(&self) -> Result<i64, Error> {
        let e = self.current()?;
        if e.etype.tlv_type() != TlvType::SignedInteger {
            return Err(Error::WrongTlvType);
        }
        Ok(LittleEndian::read_int(&self.buf[e.data..], e.len))
    }

    pub fn get_i32(&self) -> Result<i32, Error> {
        let v = self.get_i64()?;
        if v < i64::from(i32::min_value()) || v > i64::from(i32::max_value()) {
            return Err(Error::WrongTlvType);
        }
        Ok(v as i32)
    }

    pub fn get_bool(&self) -> Result<bool, Error> {
        let e = self.current()?;
        match e.etype {
            ElementType::BooleanTrue => Ok(true),
            ElementType::BooleanFalse => Ok(false),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_f32(&self) -> Result<f32, Error> {
        let e = self.current()?;
        if e.etype != ElementType::Float32 {
            return Err(Error::WrongTlvType);
        }
        Ok(LittleEndian::read_f32(&self.buf[e.data..]))
    }

    /// Reads a floating-point element, widening a 4-byte float.
    pub fn get_f64(&self) -> Result<f64, Error> {
        let e = self.current()?;
        match e.etype {
            ElementType::Float32 => Ok(f64::from(LittleEndian::read_f32(&self.buf[e.data..]))),
            ElementType::Float64 => Ok(LittleEndian::read_f64(&self.buf[e.data..])),
            _ => Err(Error::WrongTlvType),
        }
    }

    pub fn get_utf8(&self) -> Result<&'a str, Error> {
        let e = self.current()?;
        if e.etype.tlv_type() != TlvType::Utf8String {
            return Err(Error::WrongTlvType);
        }
        str::from_utf8(&self.buf[e.data..e.data + e.len]).map_err(|_| Error::WrongTlvType)
    }

    pub fn get_bytes(&self) -> Result<&'a [u8], Error> {
        let e = self.current()?;
        if e.etype.tlv_type() != TlvType::ByteString {
            return Err(Error::WrongTlvType);
        }
        Ok(&self.buf[e.data..e.data + e.len])
    }

    /// Enters the current container element.
    ///
    /// Returns the outer-container type to pass back to
    /// [`exit_container`]. The cursor moves before the container's first
    /// child.
    ///
    /// [`exit_container`]: #method.exit_container
    pub fn enter_container(&mut self) -> Result<TlvType, Error> {
        let (ty, body) = {
            let e = self.current()?;
            let ty = e.etype.tlv_type();
            if !ty.is_container() {
                return Err(Error::WrongTlvType);
            }
            (ty, e.body)
        };
        let outer = self.container;
        self.container = ty;
        self.pos = body;
        self.elem = None;
        Ok(outer)
    }

    /// Leaves the container entered last, skipping any unread siblings.
    ///
    /// `outer` is the value returned by the matching [`enter_container`].
    ///
    /// [`enter_container`]: #method.enter_container
    pub fn exit_container(&mut self, outer: TlvType) -> Result<(), Error> {
        if self.container == TlvType::NotSpecified {
            return Err(Error::IncorrectState);
        }

        let mut at = match self.elem.take() {
            Some(elem) => self.element_end(&elem)?,
            None => self.pos,
        };
        loop {
            let elem = self.parse_head(at)?;
            if elem.etype == ElementType::EndOfContainer {
                self.pos = elem.body;
                self.container = outer;
                return Ok(());
            }
            at = self.element_end(&elem)?;
        }
    }

    /// Searches the following siblings for an element with the given tag.
    ///
    /// On success the returned sub-reader is positioned on the element, ready
    /// for `get_*` or `enter_container`. Returns [`Error::EndOfTlv`] when no
    /// such sibling exists. The receiver itself is not advanced.
    ///
    /// [`Error::EndOfTlv`]: ../error/enum.Error.html#variant.EndOfTlv
    pub fn find_element_with_tag(&self, tag: Tag) -> Result<TlvReader<'a>, Error> {
        let mut sub = self.clone();
        loop {
            sub.next()?;
            if sub.tag() == tag {
                return Ok(sub);
            }
        }
    }

    /// Raw element-type code and the byte range of the element body, for
    /// verbatim copies by the writer.
    pub(crate) fn raw_element(&self) -> Result<(u8, &'a [u8]), Error> {
        let elem = *self.current()?;
        let end = self.element_end(&elem)?;
        Ok((elem.etype as u8, &self.buf[elem.body..end]))
    }
}

impl<'a> fmt::Debug for TlvReader<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TlvReader")
            .field("len", &self.buf.len())
            .field("pos", &self.pos)
            .field("container", &self.container)
            .field("element_type", &self.element_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvWriter;

    fn written(buf: &mut [u8], f: impl FnOnce(&mut TlvWriter)) -> &[u8] {
        let len = {
            let mut w = TlvWriter::new(buf);
            f(&mut w);
            w.len()
        };
        &buf[..len]
    }

    #[test]
    fn scalar_stream() {
        let mut buf = [0; 64];
        let bytes = written(&mut buf, |w| {
            w.put_unsigned(Tag::Context(1), 7).unwrap();
            w.put_signed(Tag::Context(2), -300).unwrap();
            w.put_boolean(Tag::Context(3), true).unwrap();
            w.put_null(Tag::Context(4)).unwrap();
            w.put_utf8(Tag::Context(5), "on/off").unwrap();
        });

        let mut r = TlvReader::new(bytes);
        r.next().unwrap();
        assert_eq!(r.tag(), Tag::Context(1));
        assert_eq!(r.get_u64(), Ok(7));
        assert_eq!(r.get_u8(), Ok(7));
        assert_eq!(r.get_i64(), Err(Error::WrongTlvType));

        r.next().unwrap();
        assert_eq!(r.get_i64(), Ok(-300));
        assert_eq!(r.get_i32(), Ok(-300));

        r.next().unwrap();
        assert_eq!(r.get_bool(), Ok(true));

        r.next().unwrap();
        assert_eq!(r.element_type(), TlvType::Null);

        r.next().unwrap();
        assert_eq!(r.get_utf8(), Ok("on/off"));
        assert_eq!(r.get_length(), 6);

        assert_eq!(r.next(), Err(Error::EndOfTlv));
    }

    #[test]
    fn width_range_checks() {
        let mut buf = [0; 16];
        let bytes = written(&mut buf, |w| {
            w.put_unsigned(Tag::Anonymous, 0x1_0000).unwrap();
        });
        let mut r = TlvReader::new(bytes);
        r.next().unwrap();
        assert_eq!(r.get_u32(), Ok(0x1_0000));
        assert_eq!(r.get_u16(), Err(Error::WrongTlvType));
    }

    #[test]
    fn overlong_encoding_accepted() {
        // An 8-byte encoding of the value 5: wider than necessary, but
        // decoders are liberal in what they accept.
        let bytes = [0x27, 0x01, 5, 0, 0, 0, 0, 0, 0, 0];
        let mut r = TlvReader::new(&bytes);
        r.next().unwrap();
        assert_eq!(r.tag(), Tag::Context(1));
        assert_eq!(r.get_u16(), Ok(5));
    }

    #[test]
    fn unknown_element_type_rejected() {
        let bytes = [0x1f];
        let mut r = TlvReader::new(&bytes);
        assert_eq!(r.next(), Err(Error::UnknownElementType(0x1f)));
    }

    #[test]
    fn truncated_value_rejected() {
        let mut buf = [0; 16];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            w.put_unsigned(Tag::Anonymous, 0xdead_beef).unwrap();
            w.len()
        };
        let mut r = TlvReader::new(&buf[..len - 1]);
        assert_eq!(r.next(), Err(Error::BufferUnderrun));
    }

    #[test]
    fn nested_containers() {
        let mut buf = [0; 64];
        let bytes = written(&mut buf, |w| {
            let outer = w.start_container(Tag::Anonymous, TlvType::Structure).unwrap();
            w.put_unsigned(Tag::Context(0), 1).unwrap();
            let inner = w.start_container(Tag::Context(1), TlvType::Array).unwrap();
            w.put_unsigned(Tag::Anonymous, 10).unwrap();
            w.put_unsigned(Tag::Anonymous, 20).unwrap();
            w.end_container(inner).unwrap();
            w.put_unsigned(Tag::Context(2), 3).unwrap();
            w.end_container(outer).unwrap();
        });

        let mut r = TlvReader::new(bytes);
        r.expect(TlvType::Structure, Tag::Anonymous).unwrap();
        let outer = r.enter_container().unwrap();

        r.next().unwrap();
        assert_eq!(r.get_u8(), Ok(1));

        r.next().unwrap();
        assert_eq!(r.element_type(), TlvType::Array);
        let inner = r.enter_container().unwrap();
        r.next().unwrap();
        assert_eq!(r.get_u8(), Ok(10));
        // Leave without reading the second member; exit skips it.
        r.exit_container(inner).unwrap();

        r.next().unwrap();
        assert_eq!(r.tag(), Tag::Context(2));
        assert_eq!(r.get_u8(), Ok(3));

        assert_eq!(r.next(), Err(Error::EndOfTlv));
        r.exit_container(outer).unwrap();
        assert_eq!(r.next(), Err(Error::EndOfTlv));
    }

    #[test]
    fn skip_unentered_container() {
        let mut buf = [0; 64];
        let bytes = written(&mut buf, |w| {
            let outer = w.start_container(Tag::Anonymous, TlvType::Structure).unwrap();
            let inner = w.start_container(Tag::Context(0), TlvType::Structure).unwrap();
            w.put_unsigned(Tag::Context(0), 0xffff).unwrap();
            w.end_container(inner).unwrap();
            w.put_boolean(Tag::Context(1), false).unwrap();
            w.end_container(outer).unwrap();
        });

        let mut r = TlvReader::new(bytes);
        r.next().unwrap();
        let outer = r.enter_container().unwrap();
        r.next().unwrap();
        assert_eq!(r.element_type(), TlvType::Structure);
        // Not entered: the next call steps over the whole container.
        r.next().unwrap();
        assert_eq!(r.tag(), Tag::Context(1));
        assert_eq!(r.get_bool(), Ok(false));
        r.exit_container(outer).unwrap();
    }

    #[test]
    fn find_element_with_tag() {
        let mut buf = [0; 64];
        let bytes = written(&mut buf, |w| {
            let outer = w.start_container(Tag::Anonymous, TlvType::Structure).unwrap();
            w.put_unsigned(Tag::Context(0), 1).unwrap();
            w.put_unsigned(Tag::Context(3), 4).unwrap();
            w.end_container(outer).unwrap();
        });

        let mut r = TlvReader::new(bytes);
        r.next().unwrap();
        r.enter_container().unwrap();

        let sub = r.find_element_with_tag(Tag::Context(3)).unwrap();
        assert_eq!(sub.get_u8(), Ok(4));
        // The receiver did not move.
        let sub0 = r.find_element_with_tag(Tag::Context(0)).unwrap();
        assert_eq!(sub0.get_u8(), Ok(1));

        assert_eq!(
            r.find_element_with_tag(Tag::Context(9)).unwrap_err(),
            Error::EndOfTlv
        );
    }

    #[test]
    fn clone_is_independent() {
        let mut buf = [0; 32];
        let bytes = written(&mut buf, |w| {
            w.put_unsigned(Tag::Anonymous, 1).unwrap();
            w.put_unsigned(Tag::Anonymous, 2).unwrap();
        });

        let mut a = TlvReader::new(bytes);
        a.next().unwrap();
        let mut b = a.clone();
        b.next().unwrap();
        assert_eq!(a.get_u8(), Ok(1));
        assert_eq!(b.get_u8(), Ok(2));
    }

    #[test]
    fn stray_end_of_container_rejected() {
        let bytes = [0x18];
        let mut r = TlvReader::new(&bytes);
        assert_eq!(r.next(), Err(Error::InvalidTlvTag));
    }
}
