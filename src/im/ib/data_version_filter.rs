//! DataVersionFilterIB: a cluster instance and the data version the client
//! already holds for it.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::cluster_path;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::DataVersion;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the DataVersionFilterIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Path = 0,
    DataVersion = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

bitflags! {
    struct Fields: u8 {
        const PATH = 1 << Tag::Path as u8;
        const DATA_VERSION = 1 << Tag::DataVersion as u8;
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

    pub fn path(&self) -> Result<cluster_path::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Path as u8)?;
        cluster_path::Parser::init(&reader)
    }

    pub fn data_version(&self) -> Result<DataVersion, Error> {
        self.ib.get_unsigned_u32(Tag::DataVersion as u8)
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
        pline!(pp, "DataVersionFilterIB =");
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
                    cluster_path::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::DataVersion as u8 => {
                    seen |= Fields::DATA_VERSION;
                    pline!(pp, "DataVersion = 0x{:x},", reader.get_u32()?);
                }
                _ => {
                    debug!(
                        "DataVersionFilterIB: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if !seen.contains(Fields::PATH | Fields::DATA_VERSION) {
            return Err(Error::Malformed(Schema::DataVersionFilterIb));
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

    pub fn create_path(&mut self) -> cluster_path::Builder<'a, '_> {
        cluster_path::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Path as u8),
            cluster_path::CONTAINER_TYPE,
        ))
    }

    pub fn data_version(&mut self, version: DataVersion) -> &mut Self {
        self.ib.put_unsigned(Tag::DataVersion as u8, u64::from(version));
        self
    }

    pub fn end_of_data_version_filter_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv::TlvReader;

    #[test]
    fn roundtrip() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            b.create_path().endpoint(1).cluster(6).end_of_cluster_path_ib().unwrap();
            b.data_version(0x0101).end_of_data_version_filter_ib().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.path().unwrap().cluster(), Ok(6));
        assert_eq!(p.data_version(), Ok(0x0101));
    }

    #[test]
    fn missing_data_version_is_malformed() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            b.create_path().cluster(6).end_of_cluster_path_ib().unwrap();
            b.end_of_data_version_filter_ib().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        assert_eq!(
            p.check_schema_validity(),
            Err(Error::Malformed(Schema::DataVersionFilterIb))
        );
    }
}
