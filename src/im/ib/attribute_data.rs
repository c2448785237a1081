//! AttributeDataIB: one attribute value, with its path and data version.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::attribute_path;
use im::parser::IbParser;
use im::payload::check_im_payload;
use im::printer::PrettyPrinter;
use im::DataVersion;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the AttributeDataIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    DataVersion = 0,
    Path = 1,
    Data = 2,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

bitflags! {
    struct Fields: u8 {
        const PATH = 1 << Tag::Path as u8;
        const DATA = 1 << Tag::Data as u8;
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: &TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_struct(reader)?,
        })
    }

    pub fn data_version(&self) -> Result<DataVersion, Error> {
        self.ib.get_unsigned_u32(Tag::DataVersion as u8)
    }

    pub fn path(&self) -> Result<attribute_path::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Path as u8)?;
        attribute_path::Parser::init(&reader)
    }

    /// Sub-reader positioned on the opaque attribute value.
    pub fn data(&self) -> Result<TlvReader<'a>, Error> {
        self.ib.get_reader_on_tag(Tag::Data as u8)
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
        pline!(pp, "AttributeDataIB =");
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
                t if t == Tag::DataVersion as u8 => {
                    pline!(pp, "DataVersion = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::Path as u8 => {
                    seen |= Fields::PATH;
                    attribute_path::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::Data as u8 => {
                    seen |= Fields::DATA;
                    check_im_payload(&reader, pp, "Data")?;
                }
                _ => {
                    debug!("AttributeDataIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if !seen.contains(Fields::PATH | Fields::DATA) {
            return Err(Error::Malformed(Schema::AttributeDataIb));
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

    pub fn data_version(&mut self, version: DataVersion) -> &mut Self {
        self.ib.put_unsigned(Tag::DataVersion as u8, u64::from(version));
        self
    }

    /// Opens the nested path IB. Fields must be written in tag order, so
    /// call this after [`data_version`] and before the data payload.
    ///
    /// [`data_version`]: #method.data_version
    pub fn create_path(&mut self) -> attribute_path::Builder<'a, '_> {
        attribute_path::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Path as u8),
            attribute_path::CONTAINER_TYPE,
        ))
    }

    /// The context tag the opaque attribute value must be written under,
    /// through [`writer`].
    ///
    /// [`writer`]: #method.writer
    pub fn data_tag() -> TlvTag {
        TlvTag::Context(Tag::Data as u8)
    }

    /// Direct writer access for encoding the attribute value.
    pub fn writer(&mut self) -> &mut TlvWriter<'a> {
        self.ib.writer()
    }

    pub fn end_of_attribute_data_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}
