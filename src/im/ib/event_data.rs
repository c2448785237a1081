//! EventDataIB: one emitted event, with its path, header and payload.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::event_path;
use im::parser::IbParser;
use im::payload::check_im_payload;
use im::printer::PrettyPrinter;
use im::EventNumber;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

use num_traits::FromPrimitive;

/// Context tags of the EventDataIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Path = 0,
    EventNumber = 1,
    Priority = 2,
    EpochTimestamp = 3,
    SystemTimestamp = 4,
    DeltaEpochTimestamp = 5,
    DeltaSystemTimestamp = 6,
    Data = 7,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

bitflags! {
    struct Fields: u16 {
        const PATH = 1 << Tag::Path as u16;
        const EVENT_NUMBER = 1 << Tag::EventNumber as u16;
        const PRIORITY = 1 << Tag::Priority as u16;
        const EPOCH_TS = 1 << Tag::EpochTimestamp as u16;
        const SYSTEM_TS = 1 << Tag::SystemTimestamp as u16;
        const DELTA_EPOCH_TS = 1 << Tag::DeltaEpochTimestamp as u16;
        const DELTA_SYSTEM_TS = 1 << Tag::DeltaSystemTimestamp as u16;
        const DATA = 1 << Tag::Data as u16;
        const ANY_TS = Self::EPOCH_TS.bits
            | Self::SYSTEM_TS.bits
            | Self::DELTA_EPOCH_TS.bits
            | Self::DELTA_SYSTEM_TS.bits;
    }
}

/// Importance of an event, deciding which log buffer holds it.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum EventPriority {
    Debug = 0,
    Info = 1,
    Critical = 2,
}

/// The single timestamp an event carries.
///
/// The delta variants are offsets against the previous event in the same
/// report and are only meaningful when that event carried (or resolved to)
/// a timestamp of the matching kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventTimestamp {
    Epoch(u64),
    System(u64),
    DeltaEpoch(u64),
    DeltaSystem(u64),
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

    pub fn path(&self) -> Result<event_path::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Path as u8)?;
        event_path::Parser::init(&reader)
    }

    pub fn event_number(&self) -> Result<EventNumber, Error> {
        self.ib.get_unsigned_u64(Tag::EventNumber as u8)
    }

    pub fn priority(&self) -> Result<EventPriority, Error> {
        let raw = self.ib.get_unsigned_u8(Tag::Priority as u8)?;
        EventPriority::from_u8(raw).ok_or(Error::Malformed(Schema::EventDataIb))
    }

    pub fn epoch_timestamp(&self) -> Result<u64, Error> {
        self.ib.get_unsigned_u64(Tag::EpochTimestamp as u8)
    }

    pub fn system_timestamp(&self) -> Result<u64, Error> {
        self.ib.get_unsigned_u64(Tag::SystemTimestamp as u8)
    }

    pub fn delta_epoch_timestamp(&self) -> Result<u64, Error> {
        self.ib.get_unsigned_u64(Tag::DeltaEpochTimestamp as u8)
    }

    pub fn delta_system_timestamp(&self) -> Result<u64, Error> {
        self.ib.get_unsigned_u64(Tag::DeltaSystemTimestamp as u8)
    }

    /// The event's timestamp. Exactly one of the four timestamp fields must
    /// be present; anything else makes the IB malformed.
    pub fn timestamp(&self) -> Result<EventTimestamp, Error> {
        let mut found = None;
        let candidates = [
            (Tag::EpochTimestamp, EventTimestamp::Epoch as fn(u64) -> EventTimestamp),
            (Tag::SystemTimestamp, EventTimestamp::System),
            (Tag::DeltaEpochTimestamp, EventTimestamp::DeltaEpoch),
            (Tag::DeltaSystemTimestamp, EventTimestamp::DeltaSystem),
        ];
        for &(tag, wrap) in &candidates {
            match self.ib.get_unsigned_u64(tag as u8) {
                Ok(value) => {
                    if found.is_some() {
                        return Err(Error::Malformed(Schema::EventDataIb));
                    }
                    found = Some(wrap(value));
                }
                Err(Error::EndOfTlv) => {}
                Err(e) => return Err(e),
            }
        }
        found.ok_or(Error::Malformed(Schema::EventDataIb))
    }

    /// Sub-reader positioned on the opaque event payload.
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
        pline!(pp, "EventDataIB =");
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
                    event_path::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::EventNumber as u8 => {
                    seen |= Fields::EVENT_NUMBER;
                    pline!(pp, "EventNumber = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::Priority as u8 => {
                    seen |= Fields::PRIORITY;
                    pline!(pp, "Priority = {},", reader.get_u8()?);
                }
                t if t == Tag::EpochTimestamp as u8 => {
                    seen |= Fields::EPOCH_TS;
                    pline!(pp, "EpochTimestamp = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::SystemTimestamp as u8 => {
                    seen |= Fields::SYSTEM_TS;
                    pline!(pp, "SystemTimestamp = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::DeltaEpochTimestamp as u8 => {
                    seen |= Fields::DELTA_EPOCH_TS;
                    pline!(pp, "DeltaEpochTimestamp = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::DeltaSystemTimestamp as u8 => {
                    seen |= Fields::DELTA_SYSTEM_TS;
                    pline!(pp, "DeltaSystemTimestamp = 0x{:x},", reader.get_u64()?);
                }
                t if t == Tag::Data as u8 => {
                    seen |= Fields::DATA;
                    check_im_payload(&reader, pp, "Data")?;
                }
                _ => {
                    debug!("EventDataIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");

        let required = Fields::PATH | Fields::EVENT_NUMBER | Fields::PRIORITY | Fields::DATA;
        if !seen.contains(required) {
            return Err(Error::Malformed(Schema::EventDataIb));
        }
        if (seen & Fields::ANY_TS).bits().count_ones() != 1 {
            return Err(Error::Malformed(Schema::EventDataIb));
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

    pub fn create_path(&mut self) -> event_path::Builder<'a, '_> {
        event_path::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Path as u8),
            event_path::CONTAINER_TYPE,
        ))
    }

    pub fn event_number(&mut self, number: EventNumber) -> &mut Self {
        self.ib.put_unsigned(Tag::EventNumber as u8, number);
        self
    }

    pub fn priority(&mut self, priority: EventPriority) -> &mut Self {
        self.ib.put_unsigned(Tag::Priority as u8, priority as u64);
        self
    }

    /// Writes the event's single timestamp field.
    pub fn timestamp(&mut self, ts: EventTimestamp) -> &mut Self {
        let (tag, value) = match ts {
            EventTimestamp::Epoch(v) => (Tag::EpochTimestamp, v),
            EventTimestamp::System(v) => (Tag::SystemTimestamp, v),
            EventTimestamp::DeltaEpoch(v) => (Tag::DeltaEpochTimestamp, v),
            EventTimestamp::DeltaSystem(v) => (Tag::DeltaSystemTimestamp, v),
        };
        self.ib.put_unsigned(tag as u8, value);
        self
    }

    /// The context tag the opaque event payload must be written under,
    /// through [`writer`].
    ///
    /// [`writer`]: #method.writer
    pub fn data_tag() -> TlvTag {
        TlvTag::Context(Tag::Data as u8)
    }

    pub fn writer(&mut self) -> &mut TlvWriter<'a> {
        self.ib.writer()
    }

    pub fn end_of_event_data_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvReader;

    fn build_event(buf: &mut [u8], ts: &[EventTimestamp]) -> usize {
        let mut w = TlvWriter::new(buf);
        {
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            b.create_path()
                .endpoint(1)
                .cluster(0x0028)
                .event(0)
                .end_of_event_path_ib()
                .unwrap();
            b.event_number(17).priority(EventPriority::Info);
            for &t in ts {
                b.timestamp(t);
            }
            let s = b
                .writer()
                .start_container(Builder::data_tag(), TlvType::Structure)
                .unwrap();
            b.writer().end_container(s).unwrap();
            b.end_of_event_data_ib().unwrap();
        }
        w.len()
    }

    fn parse(bytes: &[u8]) -> Parser {
        let mut r = TlvReader::new(bytes);
        r.next().unwrap();
        Parser::init(&r).unwrap()
    }

    #[test]
    fn event_with_system_timestamp() {
        let mut buf = [0; 128];
        let len = build_event(&mut buf, &[EventTimestamp::System(0x1234)]);
        let p = parse(&buf[..len]);
        p.check_schema_validity().unwrap();
        assert_eq!(p.event_number(), Ok(17));
        assert_eq!(p.priority(), Ok(EventPriority::Info));
        assert_eq!(p.timestamp(), Ok(EventTimestamp::System(0x1234)));
    }

    #[test]
    fn missing_timestamp_is_malformed() {
        let mut buf = [0; 128];
        let len = build_event(&mut buf, &[]);
        let p = parse(&buf[..len]);
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::EventDataIb))
        );
        assert_eq!(p.timestamp(), Err(Error::Malformed(Schema::EventDataIb)));
    }

    #[test]
    fn two_timestamps_are_malformed() {
        let mut buf = [0; 128];
        let len = build_event(
            &mut buf,
            &[EventTimestamp::Epoch(1), EventTimestamp::System(2)],
        );
        let p = parse(&buf[..len]);
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::EventDataIb))
        );
        assert_eq!(p.timestamp(), Err(Error::Malformed(Schema::EventDataIb)));
    }
}
