//! EventReportIB: exactly one of an event status or event data.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::{event_data, event_status};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the EventReportIB variants.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    EventStatus = 0,
    EventData = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

/// The inhabited variant of a decoded report.
#[derive(Debug, Clone)]
pub enum Report<'a> {
    Status(event_status::Parser<'a>),
    Data(event_data::Parser<'a>),
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

    pub fn event_status(&self) -> Result<event_status::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::EventStatus as u8)?;
        event_status::Parser::init(&reader)
    }

    pub fn event_data(&self) -> Result<event_data::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::EventData as u8)?;
        event_data::Parser::init(&reader)
    }

    /// Returns the variant this report carries. Both present, or neither,
    /// makes the IB malformed.
    pub fn report(&self) -> Result<Report<'a>, Error> {
        let status = self.event_status();
        let data = self.event_data();
        match (status, data) {
            (Ok(status), Err(Error::EndOfTlv)) => Ok(Report::Status(status)),
            (Err(Error::EndOfTlv), Ok(data)) => Ok(Report::Data(data)),
            (Ok(_), Ok(_)) | (Err(Error::EndOfTlv), Err(Error::EndOfTlv)) => {
                Err(Error::Malformed(Schema::EventReportIb))
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
        pline!(pp, "EventReportIB =");
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
                t if t == Tag::EventStatus as u8 => {
                    seen += 1;
                    event_status::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::EventData as u8 => {
                    seen += 1;
                    event_data::Parser::init(&reader)?.walk(pp)?;
                }
                _ => {
                    debug!("EventReportIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if seen != 1 {
            return Err(Error::Malformed(Schema::EventReportIb));
        }
        Ok(())
    }
}

/// Builder enforcing the exactly-one-of rule; see
/// [`attribute_report::Builder`] for the shared behavior.
///
/// [`attribute_report::Builder`]: ../attribute_report/struct.Builder.html
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

    pub fn create_event_status(&mut self) -> event_status::Builder<'a, '_> {
        self.choose();
        event_status::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::EventStatus as u8),
            event_status::CONTAINER_TYPE,
        ))
    }

    pub fn create_event_data(&mut self) -> event_data::Builder<'a, '_> {
        self.choose();
        event_data::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::EventData as u8),
            event_data::CONTAINER_TYPE,
        ))
    }

    fn choose(&mut self) {
        if self.chosen {
            self.ib.reset_error(Error::IncorrectState);
        }
        self.chosen = true;
    }

    pub fn end_of_event_report_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::event_data::{EventPriority, EventTimestamp};
    use tlv::TlvReader;

    #[test]
    fn data_variant_roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            {
                let mut d = b.create_event_data();
                d.create_path().endpoint(1).cluster(0x28).event(0).end_of_event_path_ib().unwrap();
                d.event_number(1)
                    .priority(EventPriority::Critical)
                    .timestamp(EventTimestamp::Epoch(0x5eed));
                let s = d
                    .writer()
                    .start_container(
                        super::super::event_data::Builder::data_tag(),
                        TlvType::Structure,
                    )
                    .unwrap();
                d.writer().end_container(s).unwrap();
                d.end_of_event_data_ib().unwrap();
            }
            b.end_of_event_report_ib().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        match p.report().unwrap() {
            Report::Data(data) => {
                assert_eq!(data.timestamp(), Ok(EventTimestamp::Epoch(0x5eed)));
            }
            Report::Status(_) => panic!("wrong variant"),
        }
    }

    #[test]
    fn second_variant_latches_error() {
        let mut buf = [0; 256];
        let mut w = TlvWriter::new(&mut buf);
        let mut b = Builder::init(&mut w, TlvTag::Anonymous);
        {
            let mut s = b.create_event_status();
            s.create_path().end_of_event_path_ib().unwrap();
            s.create_status()
                .encode(&::im::ib::status::Status::success())
                .unwrap();
            s.end_of_event_status_ib().unwrap();
        }
        {
            let mut d = b.create_event_data();
            assert_eq!(d.end_of_event_data_ib(), Err(Error::IncorrectState));
        }
        assert_eq!(b.end_of_event_report_ib(), Err(Error::IncorrectState));
    }
}
