//! AttributeReportIB: exactly one of an attribute status or attribute data.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::{attribute_data, attribute_status};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the AttributeReportIB variants.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    AttributeStatus = 0,
    AttributeData = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

/// The inhabited variant of a decoded report.
#[derive(Debug, Clone)]
pub enum Report<'a> {
    Status(attribute_status::Parser<'a>),
    Data(attribute_data::Parser<'a>),
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

    pub fn attribute_status(&self) -> Result<attribute_status::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::AttributeStatus as u8)?;
        attribute_status::Parser::init(&reader)
    }

    pub fn attribute_data(&self) -> Result<attribute_data::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::AttributeData as u8)?;
        attribute_data::Parser::init(&reader)
    }

    /// Returns the variant this report carries. Both present, or neither,
    /// makes the IB malformed.
    pub fn report(&self) -> Result<Report<'a>, Error> {
        let status = self.attribute_status();
        let data = self.attribute_data();
        match (status, data) {
            (Ok(status), Err(Error::EndOfTlv)) => Ok(Report::Status(status)),
            (Err(Error::EndOfTlv), Ok(data)) => Ok(Report::Data(data)),
            (Ok(_), Ok(_)) | (Err(Error::EndOfTlv), Err(Error::EndOfTlv)) => {
                Err(Error::Malformed(Schema::AttributeReportIb))
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        let mut seen = 0u8;
        pline!(pp, "AttributeReportIB =");
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
                t if t == Tag::AttributeStatus as u8 => {
                    seen += 1;
                    attribute_status::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::AttributeData as u8 => {
                    seen += 1;
                    attribute_data::Parser::init(&reader)?.walk(pp)?;
                }
                _ => {
                    debug!("AttributeReportIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if seen != 1 {
            return Err(Error::Malformed(Schema::AttributeReportIb));
        }
        Ok(())
    }
}

/// Builder enforcing the exactly-one-of rule: once one variant has been
/// created, creating the other latches `incorrect-state` on both this
/// builder and the offending child.
#[derive(Debug)]
pub struct Builder<'a, 'w>
where
    'a: 'w,
{
    ib: IbBuilder<'a, 'w>,
    chosen: bool,
}

impl<'a, 'w> Builder<'a, 'w> {
    pub fn init(writer: &'w mut TlvWriter<'a>, tag: TlvTag) -> Self {
        Builder {
            ib: IbBuilder::open(writer, tag, CONTAINER_TYPE, None),
            chosen: false,
        }
    }

    pub(crate) fn with_state(ib: IbBuilder<'a, 'w>) -> Self {
        Builder { ib, chosen: false }
    }

    pub fn create_attribute_status(&mut self) -> attribute_status::Builder<'a, '_> {
        self.choose();
        attribute_status::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::AttributeStatus as u8),
            attribute_status::CONTAINER_TYPE,
        ))
    }

    pub fn create_attribute_data(&mut self) -> attribute_data::Builder<'a, '_> {
        self.choose();
        attribute_data::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::AttributeData as u8),
            attribute_data::CONTAINER_TYPE,
        ))
    }

    fn choose(&mut self) {
        if self.chosen {
            self.ib.reset_error(Error::IncorrectState);
        }
        self.chosen = true;
    }

    pub fn end_of_attribute_report_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}
