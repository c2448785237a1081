//! SubscribeRequestMessage: establishes a subscription to attributes and/or
//! events.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::{attribute_path_ibs, data_version_filter_ibs, event_filter_ibs, event_path_ibs};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the SubscribeRequestMessage fields.
///
/// Tag 6 is unassigned in this schema revision.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    KeepSubscriptions = 0,
    MinIntervalFloorSeconds = 1,
    MaxIntervalCeilingSeconds = 2,
    AttributeRequests = 3,
    EventRequests = 4,
    EventFilters = 5,
    IsFabricFiltered = 7,
    DataVersionFilters = 8,
}

bitflags! {
    struct Fields: u16 {
        const MIN_INTERVAL = 1 << Tag::MinIntervalFloorSeconds as u16;
        const MAX_INTERVAL = 1 << Tag::MaxIntervalCeilingSeconds as u16;
    }
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

    pub fn keep_subscriptions(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::KeepSubscriptions as u8)
    }

    pub fn min_interval_floor_seconds(&self) -> Result<u16, Error> {
        self.ib.get_unsigned_u16(Tag::MinIntervalFloorSeconds as u8)
    }

    pub fn max_interval_ceiling_seconds(&self) -> Result<u16, Error> {
        self.ib.get_unsigned_u16(Tag::MaxIntervalCeilingSeconds as u8)
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
        let mut seen = Fields::empty();
        let mut min_interval = 0u16;
        let mut max_interval = 0u16;
        pline!(pp, "SubscribeRequestMessage =");
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
                t if t == Tag::KeepSubscriptions as u8 => {
                    pline!(pp, "KeepSubscriptions = {},", reader.get_bool()?);
                }
                t if t == Tag::MinIntervalFloorSeconds as u8 => {
                    seen |= Fields::MIN_INTERVAL;
                    min_interval = reader.get_u16()?;
                    pline!(pp, "MinIntervalFloorSeconds = {},", min_interval);
                }
                t if t == Tag::MaxIntervalCeilingSeconds as u8 => {
                    seen |= Fields::MAX_INTERVAL;
                    max_interval = reader.get_u16()?;
                    pline!(pp, "MaxIntervalCeilingSeconds = {},", max_interval);
                }
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
                    debug!(
                        "SubscribeRequestMessage: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}}");
        if !seen.contains(Fields::MIN_INTERVAL | Fields::MAX_INTERVAL) {
            return Err(Error::Malformed(Schema::SubscribeRequest));
        }
        if min_interval > max_interval {
            return Err(Error::Malformed(Schema::SubscribeRequest));
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
    pub fn init(writer: &'w mut TlvWriter<'a>) -> Self {
        Builder {
            ib: IbBuilder::open(writer, TlvTag::Anonymous, TlvType::Structure, None),
        }
    }

    pub fn keep_subscriptions(&mut self, keep: bool) -> &mut Self {
        self.ib.put_boolean(Tag::KeepSubscriptions as u8, keep);
        self
    }

    pub fn min_interval_floor_seconds(&mut self, seconds: u16) -> &mut Self {
        self.ib
            .put_unsigned(Tag::MinIntervalFloorSeconds as u8, u64::from(seconds));
        self
    }

    pub fn max_interval_ceiling_seconds(&mut self, seconds: u16) -> &mut Self {
        self.ib
            .put_unsigned(Tag::MaxIntervalCeilingSeconds as u8, u64::from(seconds));
        self
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

    pub fn end_of_subscribe_request(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            b.keep_subscriptions(false)
                .min_interval_floor_seconds(2)
                .max_interval_ceiling_seconds(60);
            {
                let mut paths = b.create_attribute_requests();
                paths
                    .create_attribute_path()
                    .endpoint(1)
                    .cluster(0x0402)
                    .attribute(0)
                    .end_of_attribute_path_ib()
                    .unwrap();
                paths.end_of_attribute_path_ibs().unwrap();
            }
            b.is_fabric_filtered(true).end_of_subscribe_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.keep_subscriptions(), Ok(false));
        assert_eq!(p.min_interval_floor_seconds(), Ok(2));
        assert_eq!(p.max_interval_ceiling_seconds(), Ok(60));
        assert_eq!(p.is_fabric_filtered(), Ok(true));
        p.exit().unwrap();
    }

    #[test]
    fn floor_above_ceiling_is_malformed() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w)
                .min_interval_floor_seconds(120)
                .max_interval_ceiling_seconds(60)
                .end_of_subscribe_request()
                .unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::SubscribeRequest))
        );
    }

    #[test]
    fn missing_intervals_are_malformed() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w).end_of_subscribe_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::SubscribeRequest))
        );
    }
}
