//! ReportDataMessage: attribute and event reports, either in response to a
//! read or as a subscription report.

use error::Error;
use im::builder::IbBuilder;
use im::ib::{attribute_report_ibs, event_report_ibs};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::{SubscriptionId, REVISION_TAG};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the ReportDataMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    SubscriptionId = 0,
    AttributeReports = 1,
    EventReports = 2,
    MoreChunkedMessages = 3,
    SuppressResponse = 4,
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_message(reader)?,
        })
    }

    /// The subscription this report belongs to. Absent when the report
    /// answers a one-shot read.
    pub fn subscription_id(&self) -> Result<SubscriptionId, Error> {
        self.ib.get_unsigned_u32(Tag::SubscriptionId as u8)
    }

    pub fn attribute_reports(&self) -> Result<attribute_report_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::AttributeReports as u8)?;
        attribute_report_ibs::Parser::init(&reader)
    }

    pub fn event_reports(&self) -> Result<event_report_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::EventReports as u8)?;
        event_report_ibs::Parser::init(&reader)
    }

    pub fn more_chunked_messages(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::MoreChunkedMessages as u8)
    }

    pub fn suppress_response(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::SuppressResponse as u8)
    }

    pub fn interaction_model_revision(&self) -> Result<u8, Error> {
        self.ib.get_unsigned_u8(REVISION_TAG)
    }

    pub fn exit(mut self) -> Result<(), Error> {
        self.ib.exit_message()
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        pline!(pp, "ReportDataMessage =");
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
                t if t == Tag::SubscriptionId as u8 => {
                    pline!(pp, "SubscriptionId = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::AttributeReports as u8 => {
                    attribute_report_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::EventReports as u8 => {
                    event_report_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::MoreChunkedMessages as u8 => {
                    pline!(pp, "MoreChunkedMessages = {},", reader.get_bool()?);
                }
                t if t == Tag::SuppressResponse as u8 => {
                    pline!(pp, "SuppressResponse = {},", reader.get_bool()?);
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!("ReportDataMessage: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
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
    pub fn init(writer: &'w mut TlvWriter<'a>) -> Self {
        Builder {
            ib: IbBuilder::open(writer, TlvTag::Anonymous, TlvType::Structure, None),
        }
    }

    pub fn subscription_id(&mut self, id: SubscriptionId) -> &mut Self {
        self.ib.put_unsigned(Tag::SubscriptionId as u8, u64::from(id));
        self
    }

    pub fn create_attribute_reports(&mut self) -> attribute_report_ibs::Builder<'a, '_> {
        attribute_report_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::AttributeReports as u8),
            TlvType::Array,
        ))
    }

    pub fn create_event_reports(&mut self) -> event_report_ibs::Builder<'a, '_> {
        event_report_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::EventReports as u8),
            TlvType::Array,
        ))
    }

    pub fn more_chunked_messages(&mut self, more: bool) -> &mut Self {
        self.ib.put_boolean(Tag::MoreChunkedMessages as u8, more);
        self
    }

    pub fn suppress_response(&mut self, suppress: bool) -> &mut Self {
        self.ib.put_boolean(Tag::SuppressResponse as u8, suppress);
        self
    }

    pub fn end_of_report_data(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::attribute_report::Report;

    #[test]
    fn report_with_attribute_data_roundtrip() {
        // `RUST_LOG=debug` shows the pretty-printed dump of this message.
        let _ = ::env_logger::try_init();

        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            b.subscription_id(7);
            {
                let mut reports = b.create_attribute_reports();
                {
                    let mut report = reports.create_attribute_report();
                    {
                        let mut data = report.create_attribute_data();
                        data.data_version(1);
                        data.create_path()
                            .endpoint(1)
                            .cluster(0x0006)
                            .attribute(0)
                            .end_of_attribute_path_ib()
                            .unwrap();
                        data.writer()
                            .put_boolean(
                                ::im::ib::attribute_data::Builder::data_tag(),
                                true,
                            )
                            .unwrap();
                        data.end_of_attribute_data_ib().unwrap();
                    }
                    report.end_of_attribute_report_ib().unwrap();
                }
                reports.end_of_attribute_report_ibs().unwrap();
            }
            b.suppress_response(true).end_of_report_data().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.subscription_id(), Ok(7));
        assert_eq!(p.suppress_response(), Ok(true));
        assert_eq!(p.more_chunked_messages().unwrap_err(), Error::EndOfTlv);

        let mut reports = p.attribute_reports().unwrap();
        match reports.next().unwrap().report().unwrap() {
            Report::Data(data) => {
                assert_eq!(data.data().unwrap().get_bool(), Ok(true));
            }
            Report::Status(_) => panic!("wrong variant"),
        }
        p.exit().unwrap();
    }

    #[test]
    fn absent_subscription_id_means_read_response() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w)
                .suppress_response(true)
                .end_of_report_data()
                .unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.subscription_id().unwrap_err(), Error::EndOfTlv);
    }

    #[test]
    fn duplicate_subscription_id_rejected_at_init() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let outer = w
                .start_container(TlvTag::Anonymous, TlvType::Structure)
                .unwrap();
            w.put_unsigned(TlvTag::Context(0), 1).unwrap();
            w.put_unsigned(TlvTag::Context(0), 2).unwrap();
            w.end_container(outer).unwrap();
            w.len()
        };

        assert_eq!(
            Parser::init(TlvReader::new(&buf[..len])).unwrap_err(),
            Error::InvalidTlvTag
        );
    }
}
