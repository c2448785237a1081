//! InvokeResponseIB: exactly one of a command's response data or its status.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::ib::{command_data, command_status};
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the InvokeResponseIB variants.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Command = 0,
    Status = 1,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::Structure;

/// The inhabited variant of a decoded invoke response.
#[derive(Debug, Clone)]
pub enum Response<'a> {
    Command(command_data::Parser<'a>),
    Status(command_status::Parser<'a>),
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

    pub fn command(&self) -> Result<command_data::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Command as u8)?;
        command_data::Parser::init(&reader)
    }

    pub fn status(&self) -> Result<command_status::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::Status as u8)?;
        command_status::Parser::init(&reader)
    }

    /// Returns the variant this response carries. Both present, or neither,
    /// makes the IB malformed.
    pub fn response(&self) -> Result<Response<'a>, Error> {
        let command = self.command();
        let status = self.status();
        match (command, status) {
            (Ok(command), Err(Error::EndOfTlv)) => Ok(Response::Command(command)),
            (Err(Error::EndOfTlv), Ok(status)) => Ok(Response::Status(status)),
            (Ok(_), Ok(_)) | (Err(Error::EndOfTlv), Err(Error::EndOfTlv)) => {
                Err(Error::Malformed(Schema::InvokeResponseIb))
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
        pline!(pp, "InvokeResponseIB =");
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
                t if t == Tag::Command as u8 => {
                    seen += 1;
                    command_data::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::Status as u8 => {
                    seen += 1;
                    command_status::Parser::init(&reader)?.walk(pp)?;
                }
                _ => {
                    debug!("InvokeResponseIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if seen != 1 {
            return Err(Error::Malformed(Schema::InvokeResponseIb));
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

    pub fn create_command(&mut self) -> command_data::Builder<'a, '_> {
        self.choose();
        command_data::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Command as u8),
            command_data::CONTAINER_TYPE,
        ))
    }

    pub fn create_status(&mut self) -> command_status::Builder<'a, '_> {
        self.choose();
        command_status::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::Status as u8),
            command_status::CONTAINER_TYPE,
        ))
    }

    fn choose(&mut self) {
        if self.chosen {
            self.ib.reset_error(Error::IncorrectState);
        }
        self.chosen = true;
    }

    pub fn end_of_invoke_response_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::status::Status;
    use tlv::TlvReader;

    #[test]
    fn status_variant_roundtrip() {
        let mut buf = [0; 128];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w, TlvTag::Anonymous);
            {
                let mut s = b.create_status();
                s.create_path()
                    .endpoint(1)
                    .cluster(0x0006)
                    .command(2)
                    .end_of_command_path_ib()
                    .unwrap();
                s.create_error_status().encode(&Status::success()).unwrap();
                s.end_of_command_status_ib().unwrap();
            }
            b.end_of_invoke_response_ib().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let p = Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        match p.response().unwrap() {
            Response::Status(status) => {
                assert_eq!(status.path().unwrap().command(), Ok(2));
            }
            Response::Command(_) => panic!("wrong variant"),
        }
    }

    #[test]
    fn both_variants_rejected() {
        let mut buf = [0; 256];
        let mut w = TlvWriter::new(&mut buf);
        let mut b = Builder::init(&mut w, TlvTag::Anonymous);
        {
            let mut c = b.create_command();
            c.create_path()
                .endpoint(1)
                .cluster(6)
                .command(0)
                .end_of_command_path_ib()
                .unwrap();
            c.end_of_command_data_ib().unwrap();
        }
        {
            let mut s = b.create_status();
            assert_eq!(s.end_of_command_status_ib(), Err(Error::IncorrectState));
        }
        assert_eq!(b.end_of_invoke_response_ib(), Err(Error::IncorrectState));
    }
}
