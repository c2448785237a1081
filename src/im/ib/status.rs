//! StatusIB: the positional status triple attached to responses.
//!
//! Unlike the other list IBs, a StatusIB is a *positional* list: three
//! anonymous unsigned integers in fixed order (general status, protocol id,
//! protocol code). Trailing positions are tolerated and skipped.

use error::{Error, GeneralCode, ImStatusCode, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::INTERACTION_MODEL_PROTOCOL_ID;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

use num_traits::FromPrimitive;

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::List;

/// A decoded status triple.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Status {
    pub general_code: u16,
    pub protocol_id: u32,
    pub protocol_code: u16,
}

impl Status {
    /// The all-success status, scoped to the interaction model.
    pub fn success() -> Self {
        Status {
            general_code: GeneralCode::Success as u16,
            protocol_id: INTERACTION_MODEL_PROTOCOL_ID,
            protocol_code: ImStatusCode::Success as u16,
        }
    }

    /// An interaction-model status.
    pub fn im(general: GeneralCode, code: ImStatusCode) -> Self {
        Status {
            general_code: general as u16,
            protocol_id: INTERACTION_MODEL_PROTOCOL_ID,
            protocol_code: code as u16,
        }
    }

    /// The general code, when it is one the codec knows.
    pub fn general(&self) -> Option<GeneralCode> {
        GeneralCode::from_u16(self.general_code)
    }

    /// The protocol code decoded as an IM status, when this status is
    /// scoped to the interaction model.
    pub fn im_status(&self) -> Option<ImStatusCode> {
        if self.protocol_id != INTERACTION_MODEL_PROTOCOL_ID {
            return None;
        }
        ImStatusCode::from_u16(self.protocol_code)
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: &TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_list(reader)?,
        })
    }

    /// Decodes the status triple. A missing or mistyped position makes the
    /// IB malformed.
    pub fn status(&self) -> Result<Status, Error> {
        let mut reader = self.ib.reader.clone();
        let mut read_position = |max: u64| -> Result<u64, Error> {
            reader.next().map_err(|_| Error::Malformed(Schema::StatusIb))?;
            if reader.tag() != TlvTag::Anonymous {
                return Err(Error::InvalidTlvTag);
            }
            let value = reader.get_u64().map_err(|_| Error::Malformed(Schema::StatusIb))?;
            if value > max {
                return Err(Error::Malformed(Schema::StatusIb));
            }
            Ok(value)
        };

        let general_code = read_position(0xffff)? as u16;
        let protocol_id = read_position(0xffff_ffff)? as u32;
        let protocol_code = read_position(0xffff)? as u16;
        Ok(Status {
            general_code,
            protocol_id,
            protocol_code,
        })
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        let status = self.status()?;
        pline!(pp, "StatusIB =");
        pline!(pp, "{{");
        pp.inc_depth();
        pline!(pp, "GeneralCode = {},", status.general_code);
        pline!(pp, "ProtocolId = 0x{:x},", status.protocol_id);
        pline!(pp, "ProtocolCode = 0x{:x},", status.protocol_code);
        if let Some(im) = status.im_status() {
            psameline!(pp, " ({})", im);
        }
        pp.dec_depth();
        pline!(pp, "}},");
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

    /// Writes the three positions and closes the IB.
    ///
    /// The triple is positional, so there are no individual setters; the
    /// whole value is encoded in one call.
    pub fn encode(&mut self, status: &Status) -> Result<(), Error> {
        self.ib.put_anonymous_unsigned(u64::from(status.general_code));
        self.ib.put_anonymous_unsigned(u64::from(status.protocol_id));
        self.ib.put_anonymous_unsigned(u64::from(status.protocol_code));
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvReader;

    #[test]
    fn success_wire_form() {
        let mut buf = [0; 16];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            Builder::init(&mut w, TlvTag::Anonymous)
                .encode(&Status::success())
                .unwrap();
            w.len()
        };

        // List of three anonymous one-byte uints, then the terminator.
        assert_eq!(
            &buf[..len],
            &[0x17, 0x04, 0x00, 0x04, 0x00, 0x04, 0x00, 0x18]
        );

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        let status = p.status().unwrap();
        assert_eq!(status, Status::success());
        assert_eq!(status.general(), Some(GeneralCode::Success));
        assert_eq!(status.im_status(), Some(ImStatusCode::Success));
    }

    #[test]
    fn truncated_triple_is_malformed() {
        let mut buf = [0; 16];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let outer = w.start_container(TlvTag::Anonymous, TlvType::List).unwrap();
            w.put_unsigned(TlvTag::Anonymous, 1).unwrap();
            w.end_container(outer).unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        assert_eq!(p.status(), Err(Error::Malformed(Schema::StatusIb)));
    }
}
