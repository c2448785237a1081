//! ReadRequestMessage: a one-shot read of attributes and/or events.

use error::Error;
use im::builder::IbBuilder;
use im::ib::{attribute_path_ibs, data_version_filter_ibs, event_filter_ibs, event_path_ibs};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the ReadRequestMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    AttributeRequests = 0,
    EventRequests = 1,
    EventFilters = 2,
    IsFabricFiltered = 3,
    DataVersionFilters = 4,
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    /// Initializes the parser on a reader positioned before the message's
    /// outermost anonymous structure.
    pub fn init(reader: TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_message(reader)?,
        })
    }

    pub fn attribute_requests(&self) -> Result<attribute_path_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::AttributeRequests as u8)?;
        attribute_path_ibs::Parser::init(&reader)
    }

    pub fn event_requests(&self) -> Result<event_path_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::EventRequests as u8)?;
        event_path_ibs::Parser::init(&reader)
    }

    pub fn event_filters(&self) -> Result<event_filter_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::EventFilters as u8)?;
        event_filter_ibs::Parser::init(&reader)
    }

    pub fn is_fabric_filtered(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::IsFabricFiltered as u8)
    }

    pub fn data_version_filters(&self) -> Result<data_version_filter_ibs::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::DataVersionFilters as u8)?;
        data_version_filter_ibs::Parser::init(&reader)
    }

    /// The revision stamped by the sender. Any value is tolerated.
    pub fn interaction_model_revision(&self) -> Result<u8, Error> {
        self.ib.get_unsigned_u8(REVISION_TAG)
    }

    /// Leaves the message and verifies nothing follows it.
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
        pline!(pp, "ReadRequestMessage =");
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
                t if t == Tag::AttributeRequests as u8 => {
                    attribute_path_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::EventRequests as u8 => {
                    event_path_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::EventFilters as u8 => {
                    event_filter_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::IsFabricFiltered as u8 => {
                    pline!(pp, "IsFabricFiltered = {},", reader.get_bool()?);
                }
                t if t == Tag::DataVersionFilters as u8 => {
                    data_version_filter_ibs::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!("ReadRequestMessage: skipping unknown tag 0x{:02x}", tag_num);
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
    /// Opens the message's outermost anonymous structure.
    pub fn init(writer: &'w mut TlvWriter<'a>) -> Self {
        Builder {
            ib: IbBuilder::open(writer, TlvTag::Anonymous, TlvType::Structure, None),
        }
    }

    pub fn create_attribute_requests(&mut self) -> attribute_path_ibs::Builder<'a, '_> {
        attribute_path_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::AttributeRequests as u8),
            TlvType::Array,
        ))
    }

    pub fn create_event_requests(&mut self) -> event_path_ibs::Builder<'a, '_> {
        event_path_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::EventRequests as u8),
            TlvType::Array,
        ))
    }

    pub fn create_event_filters(&mut self) -> event_filter_ibs::Builder<'a, '_> {
        event_filter_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::EventFilters as u8),
            TlvType::Array,
        ))
    }

    pub fn is_fabric_filtered(&mut self, filtered: bool) -> &mut Self {
        self.ib.put_boolean(Tag::IsFabricFiltered as u8, filtered);
        self
    }

    pub fn create_data_version_filters(&mut self) -> data_version_filter_ibs::Builder<'a, '_> {
        data_version_filter_ibs::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::DataVersionFilters as u8),
            TlvType::Array,
        ))
    }

    /// Stamps the revision field and closes the message.
    pub fn end_of_read_request(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::INTERACTION_MODEL_REVISION;

    #[test]
    fn empty_read_request_wire_form() {
        let mut buf = [0; 32];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w)
                .is_fabric_filtered(true)
                .end_of_read_request()
                .unwrap();
            w.len()
        };

        // Struct { ContextTag(3): true, ContextTag(0xff): revision }.
        assert_eq!(
            &buf[..len],
            &[0x15, 0x29, 0x03, 0x24, 0xff, INTERACTION_MODEL_REVISION, 0x18]
        );

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.attribute_requests().unwrap_err(), Error::EndOfTlv);
        assert_eq!(p.event_requests().unwrap_err(), Error::EndOfTlv);
        assert_eq!(p.is_fabric_filtered(), Ok(true));
        assert_eq!(
            p.interaction_model_revision(),
            Ok(INTERACTION_MODEL_REVISION)
        );
        p.exit().unwrap();
    }

    #[test]
    fn read_request_with_paths_roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            {
                let mut paths = b.create_attribute_requests();
                paths
                    .create_attribute_path()
                    .endpoint(1)
                    .cluster(0x0006)
                    .attribute(0)
                    .end_of_attribute_path_ib()
                    .unwrap();
                paths
                    .create_attribute_path()
                    .end_of_attribute_path_ib()
                    .unwrap();
                paths.end_of_attribute_path_ibs().unwrap();
            }
            {
                let mut filters = b.create_event_filters();
                filters
                    .create_event_filter()
                    .event_min(5)
                    .end_of_event_filter_ib()
                    .unwrap();
                filters.end_of_event_filter_ibs().unwrap();
            }
            b.is_fabric_filtered(false).end_of_read_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();

        let mut paths = p.attribute_requests().unwrap();
        let first = paths.next().unwrap();
        assert_eq!(first.cluster(), Ok(0x0006));
        let second = paths.next().unwrap();
        assert!(second.parse_path().unwrap().is_wildcard());
        assert_eq!(paths.next().unwrap_err(), Error::EndOfTlv);

        let mut filters = p.event_filters().unwrap();
        assert_eq!(filters.next().unwrap().event_min(), Ok(5));
        assert_eq!(p.is_fabric_filtered(), Ok(false));
        p.exit().unwrap();
    }
}
