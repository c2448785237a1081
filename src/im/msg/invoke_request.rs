//! InvokeRequestMessage: invokes one or more commands.

use error::Error;
use im::builder::IbBuilder;
use im::ib::invoke_requests;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the InvokeRequestMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    SuppressResponse = 0,
    TimedRequest = 1,
    InvokeRequests = 2,
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

    pub fn suppress_response(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::SuppressResponse as u8)
    }

    pub fn timed_request(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::TimedRequest as u8)
    }

    pub fn invoke_requests(&self) -> Result<invoke_requests::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::InvokeRequests as u8)?;
        invoke_requests::Parser::init(&reader)
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
        pline!(pp, "InvokeRequestMessage =");
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
                t if t == Tag::SuppressResponse as u8 => {
                    pline!(pp, "SuppressResponse = {},", reader.get_bool()?);
                }
                t if t == Tag::TimedRequest as u8 => {
                    pline!(pp, "TimedRequest = {},", reader.get_bool()?);
                }
                t if t == Tag::InvokeRequests as u8 => {
                    invoke_requests::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!(
                        "InvokeRequestMessage: skipping unknown tag 0x{:02x}",
                        tag_num
                    );
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

    pub fn suppress_response(&mut self, suppress: bool) -> &mut Self {
        self.ib.put_boolean(Tag::SuppressResponse as u8, suppress);
        self
    }

    pub fn timed_request(&mut self, timed: bool) -> &mut Self {
        self.ib.put_boolean(Tag::TimedRequest as u8, timed);
        self
    }

    pub fn create_invoke_requests(&mut self) -> invoke_requests::Builder<'a, '_> {
        invoke_requests::Builder::with_state(self.ib.child(
            TlvTag::Context(Tag::InvokeRequests as u8),
            TlvType::Array,
        ))
    }

    pub fn end_of_invoke_request(&mut self) -> Result<(), Error> {
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::command_data;

    #[test]
    fn two_commands_roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            b.suppress_response(false).timed_request(false);
            {
                let mut commands = b.create_invoke_requests();
                for command_id in 0..2 {
                    let mut data = commands.create_command_data();
                    data.create_path()
                        .endpoint(1)
                        .cluster(0x0006)
                        .command(command_id)
                        .end_of_command_path_ib()
                        .unwrap();
                    let fields = data
                        .writer()
                        .start_container(
                            command_data::Builder::fields_tag(),
                            TlvType::Structure,
                        )
                        .unwrap();
                    data.writer().end_container(fields).unwrap();
                    data.end_of_command_data_ib().unwrap();
                }
                commands.end_of_invoke_requests().unwrap();
            }
            b.end_of_invoke_request().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.suppress_response(), Ok(false));
        assert_eq!(p.timed_request(), Ok(false));

        let mut commands = p.invoke_requests().unwrap();
        let first = commands.next().unwrap();
        assert_eq!(first.path().unwrap().command(), Ok(0));
        let second = commands.next().unwrap();
        assert_eq!(second.path().unwrap().command(), Ok(1));
        assert_eq!(
            second.path().unwrap().concrete_path().unwrap().cluster,
            0x0006
        );
        assert_eq!(commands.next().unwrap_err(), Error::EndOfTlv);
        p.exit().unwrap();
    }
}
