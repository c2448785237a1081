//! InvokeResponseMessage: responses to invoked commands, possibly chunked.
//!
//! Servers streaming responses of unknown total size open this builder with
//! the end buffer reserved: the revision field and closing token are
//! guaranteed to fit no matter how much payload the responses array takes,
//! and space for the more-chunked flag can be pre-reserved so the decision
//! to set it can wait until the payload is known.

use error::Error;
use im::builder::IbBuilder;
use im::ib::invoke_responses;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use im::REVISION_TAG;
use tlv::{Checkpoint, Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the InvokeResponseMessage fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    SuppressResponse = 0,
    InvokeResponses = 1,
    MoreChunkedMessages = 2,
}

/// Bytes needed to finish the message: the revision field (head, tag and
/// one value byte) plus the structure's end-of-container token.
const SIZE_TO_END_MESSAGE: usize = 4;

/// Bytes needed for the more-chunked flag: head and tag; the boolean value
/// lives in the element-type code.
const SIZE_FOR_MORE_CHUNKED: usize = 2;

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

    pub fn invoke_responses(&self) -> Result<invoke_responses::Parser<'a>, Error> {
        let reader = self.ib.get_reader_on_tag(Tag::InvokeResponses as u8)?;
        invoke_responses::Parser::init(&reader)
    }

    pub fn more_chunked_messages(&self) -> Result<bool, Error> {
        self.ib.get_boolean(Tag::MoreChunkedMessages as u8)
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
        pline!(pp, "InvokeResponseMessage =");
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
                t if t == Tag::InvokeResponses as u8 => {
                    invoke_responses::Parser::init(&reader)?.walk(pp)?;
                }
                t if t == Tag::MoreChunkedMessages as u8 => {
                    pline!(pp, "MoreChunkedMessages = {},", reader.get_bool()?);
                }
                t if t == REVISION_TAG => {
                    pline!(pp, "InteractionModelRevision = {},", reader.get_u64()?);
                }
                _ => {
                    debug!(
                        "InvokeResponseMessage: skipping unknown tag 0x{:02x}",
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
    end_reserved: bool,
    more_chunked_reserved: bool,
}

impl<'a, 'w> Builder<'a, 'w> {
    pub fn init(writer: &'w mut TlvWriter<'a>) -> Self {
        Builder {
            ib: IbBuilder::open(writer, TlvTag::Anonymous, TlvType::Structure, None),
            end_reserved: false,
            more_chunked_reserved: false,
        }
    }

    /// Opens the message with the revision field and closing token
    /// pre-reserved, so [`end_of_invoke_response`] cannot fail with
    /// buffer-full.
    ///
    /// [`end_of_invoke_response`]: #method.end_of_invoke_response
    pub fn init_with_end_buffer_reserved(writer: &'w mut TlvWriter<'a>) -> Self {
        let mut builder = Self::init(writer);
        if builder.ib.error().is_none() {
            builder.ib.reserve(SIZE_TO_END_MESSAGE);
            builder.end_reserved = builder.ib.error().is_none();
        }
        builder
    }

    pub fn suppress_response(&mut self, suppress: bool) -> &mut Self {
        self.ib.put_boolean(Tag::SuppressResponse as u8, suppress);
        self
    }

    /// Opens the responses array, optionally with its own closing token
    /// reserved as well.
    pub fn create_invoke_responses(
        &mut self,
        reserve_end_buffer: bool,
    ) -> invoke_responses::Builder<'a, '_> {
        invoke_responses::Builder::with_state(
            self.ib
                .child(TlvTag::Context(Tag::InvokeResponses as u8), TlvType::Array),
            reserve_end_buffer,
        )
    }

    /// Sets aside room for the more-chunked flag, so it can still be
    /// written after the payload has filled the rest of the buffer.
    pub fn reserve_space_for_more_chunked_messages(&mut self) -> &mut Self {
        if self.ib.error().is_none() {
            self.ib.reserve(SIZE_FOR_MORE_CHUNKED);
            self.more_chunked_reserved = self.ib.error().is_none();
        }
        self
    }

    pub fn more_chunked_messages(&mut self, more: bool) -> &mut Self {
        if self.more_chunked_reserved {
            self.ib.unreserve(SIZE_FOR_MORE_CHUNKED);
            self.more_chunked_reserved = false;
        }
        self.ib.put_boolean(Tag::MoreChunkedMessages as u8, more);
        self
    }

    /// Saves the writer state before speculatively encoding.
    pub fn checkpoint(&self) -> Checkpoint {
        self.ib.checkpoint()
    }

    /// Restores a state saved with [`checkpoint`], discarding everything
    /// encoded since and clearing the sticky error.
    ///
    /// [`checkpoint`]: #method.checkpoint
    pub fn rollback(&mut self, saved: &Checkpoint) {
        self.ib.rollback(saved);
    }

    /// Stamps the revision field and closes the message, releasing the end
    /// reservation first when one is held.
    pub fn end_of_invoke_response(&mut self) -> Result<(), Error> {
        if self.end_reserved {
            self.ib.unreserve(SIZE_TO_END_MESSAGE);
            self.end_reserved = false;
        }
        self.ib.encode_interaction_model_revision();
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::invoke_response::Response;
    use im::ib::status::Status;
    use im::INTERACTION_MODEL_REVISION;

    fn push_status_response(
        responses: &mut invoke_responses::Builder,
        command: u32,
    ) -> Result<(), Error> {
        let mut r = responses.create_invoke_response();
        {
            let mut s = r.create_status();
            s.create_path()
                .endpoint(1)
                .cluster(6)
                .command(command)
                .end_of_command_path_ib()?;
            s.create_error_status().encode(&Status::success())?;
            s.end_of_command_status_ib()?;
        }
        r.end_of_invoke_response_ib()
    }

    #[test]
    fn roundtrip() {
        let mut buf = [0; 256];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init(&mut w);
            b.suppress_response(false);
            {
                let mut responses = b.create_invoke_responses(false);
                push_status_response(&mut responses, 0).unwrap();
                responses.end_of_invoke_responses().unwrap();
            }
            b.end_of_invoke_response().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(
            p.interaction_model_revision(),
            Ok(INTERACTION_MODEL_REVISION)
        );
        let mut responses = p.invoke_responses().unwrap();
        match responses.next().unwrap().response().unwrap() {
            Response::Status(status) => {
                assert_eq!(status.path().unwrap().command(), Ok(0));
            }
            Response::Command(_) => panic!("wrong variant"),
        }
        p.exit().unwrap();
    }

    #[test]
    fn chunked_build_always_closes() {
        // Small buffer: the second response does not fit, yet the message
        // still finishes cleanly with the more-chunked flag set.
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = Builder::init_with_end_buffer_reserved(&mut w);
            b.reserve_space_for_more_chunked_messages();
            let mut wrote = 0;
            {
                let mut responses = b.create_invoke_responses(true);
                for command in 0..4 {
                    let saved = responses.checkpoint();
                    match push_status_response(&mut responses, command) {
                        Ok(()) => wrote += 1,
                        Err(Error::BufferFull) => {
                            responses.rollback(&saved);
                            break;
                        }
                        Err(e) => panic!("unexpected error: {:?}", e),
                    }
                }
                responses.end_of_invoke_responses().unwrap();
            }
            assert!(wrote >= 1 && wrote < 4, "wrote {} responses", wrote);
            b.more_chunked_messages(true);
            b.end_of_invoke_response().unwrap();
            w.len()
        };

        let p = Parser::init(TlvReader::new(&buf[..len])).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.more_chunked_messages(), Ok(true));
        p.exit().unwrap();
    }
}
