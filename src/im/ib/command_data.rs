//! CommandDataIB: one invoked command with its optional argument fields.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::command_path;
use im::parser::IbParser;
use im::payload::check_im_payload;
use im::printer::PrettyPrinter;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the CommandDataIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Path = 0,
    Fields = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

bitflags! {
    struct Fields: u8 {
        const PATH = 1 << Tag::Path as u8;
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

    pub fn path(&self) -> Result<command_path::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Path as u8)?;
        command_path::Parser::init(&reader)
    }

    /// Sub-reader positioned on the opaque command arguments, when present.
    pub fn fields(&self) -> Result<TlvReader<'a>, Error> {
        self.ib.get_reader_on_tag(Tag::Fields as u8)
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
        pline!(pp, "CommandDataIB =");
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
                t if t == Tag::Path as u8 => {
                    seen |= Fields::PATH;
                    command_path::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::Fields as u8 => {
                    check_im_payload(&reader, pp, "Fields")?;
                }
                _ => {
                    debug!("CommandDataIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if !seen.contains(Fields::PATH) {
            return Err(Error::Malformed(Schema::CommandDataIb));
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

    pub fn create_path(&mut self) -> command_path::Builder<'a, '_> {
        command_path::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Path as u8),
            command_path::CONTAINER_TYPE,
        ))
    }

    /// The context tag the opaque argument fields must be written under,
    /// through [`writer`].
    ///
    /// [`writer`]: #method.writer
    pub fn fields_tag() -> TlvTag {
        TlvTag::Context(Tag::Fields as u8)
    }

    pub fn writer(&mut self) -> &mut TlvWriter<'a> {
        self.ib.writer()
    }

    pub fn end_of_command_data_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}
