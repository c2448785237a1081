//! InvokeResponseIBs: the array of invoke responses, with an optional
//! guarantee that its closing token always fits.
//!
//! When a server streams responses of unbounded total size into a bounded
//! buffer, it opens this array with the end buffer reserved: one byte is set
//! aside for the array terminator, element writes fail with buffer-full
//! before they could encroach on it, and the finalizer releases the byte and
//! closes cleanly.

use error::Error;
use im::builder::IbBuilder;
use im::ib::invoke_response;
use im::parser::IbParser;
use im::printer::PrettyPrinter;
use tlv::{Checkpoint, Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Bytes needed to close the array: one end-of-container token.
pub(crate) const SIZE_TO_END: usize = 1;

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    ib: IbParser<'a>,
}

impl<'a> Parser<'a> {
    pub fn init(reader: &TlvReader<'a>) -> Result<Self, Error> {
        Ok(Parser {
            ib: IbParser::init_array(reader)?,
        })
    }

    /// Advances to the next array element and returns its parser.
    pub fn next(&mut self) -> Result<invoke_response::Parser<'a>, Error> {
        self.ib.reader.next()?;
        if self.ib.reader.tag() != TlvTag::Anonymous {
            return Err(Error::InvalidTlvTag);
        }
        invoke_response::Parser::init(&self.ib.reader)
    }

    pub fn check_schema_validity(&self) -> Result<(), Error> {
        self.walk(&mut PrettyPrinter::new())
    }

    #[cfg(feature = "pretty-print")]
    pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        self.walk(pp)
    }

    pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
        pline!(pp, "InvokeResponseIBs =");
        pline!(pp, "[");
        pp.inc_depth();
        let mut items = self.clone();
        loop {
            match items.next() {
                Ok(elem) => elem.walk(pp)?,
                Err(Error::EndOfTlv) => break,
                Err(e) => return Err(e),
            }
        }
        pp.dec_depth();
        pline!(pp, "],");
        Ok(())
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<invoke_response::Parser<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match Parser::next(self) {
            Ok(elem) => Some(Ok(elem)),
            Err(Error::EndOfTlv) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[derive(Debug)]
pub struct Builder<'a, 'w>
where
    'a: 'w,
{
    ib: IbBuilder<'a, 'w>,
    end_reserved: bool,
}

impl<'a, 'w> Builder<'a, 'w> {
    pub fn init(writer: &'w mut TlvWriter<'a>, tag: TlvTag) -> Self {
        Self::with_state(IbBuilder::open(writer, tag, TlvType::Array, None), false)
    }

    /// Opens the array with its closing token pre-reserved.
    pub fn init_with_end_buffer_reserved(writer: &'w mut TlvWriter<'a>, tag: TlvTag) -> Self {
        Self::with_state(IbBuilder::open(writer, tag, TlvType::Array, None), true)
    }

    pub(crate) fn with_state(mut ib: IbBuilder<'a, 'w>, reserve_end: bool) -> Self {
        let mut end_reserved = false;
        if reserve_end && ib.error().is_none() {
            ib.reserve(SIZE_TO_END);
            end_reserved = ib.error().is_none();
        }
        Builder { ib, end_reserved }
    }

    /// Opens the next (anonymous) response element.
    pub fn create_invoke_response(&mut self) -> invoke_response::Builder<'a, '_> {
        invoke_response::Builder::with_state(
            self.ib
                .child(TlvTag::Anonymous, invoke_response::CONTAINER_TYPE),
        )
    }

    /// Saves the writer state before speculatively encoding a response.
    pub fn checkpoint(&self) -> Checkpoint {
        self.ib.checkpoint()
    }

    /// Restores a state saved with [`checkpoint`], discarding a partially
    /// encoded response and clearing the sticky error.
    ///
    /// [`checkpoint`]: #method.checkpoint
    pub fn rollback(&mut self, saved: &Checkpoint) {
        self.ib.rollback(saved);
    }

    /// Releases the end reservation (if any), closes the array and returns
    /// the builder's final status.
    pub fn end_of_invoke_responses(&mut self) -> Result<(), Error> {
        if self.end_reserved {
            self.ib.unreserve(SIZE_TO_END);
            self.end_reserved = false;
        }
        self.ib.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ib::status::Status;

    fn fill_one_status_response(b: &mut Builder) -> Result<(), Error> {
        let mut r = b.create_invoke_response();
        {
            let mut s = r.create_status();
            s.create_path()
                .endpoint(1)
                .cluster(6)
                .command(0)
                .end_of_command_path_ib()?;
            s.create_error_status().encode(&Status::success())?;
            s.end_of_command_status_ib()?;
        }
        r.end_of_invoke_response_ib()
    }

    #[test]
    fn close_always_fits_with_reservation() {
        // One response encodes into 25 bytes; pick a buffer a little too
        // small for two so the second hits buffer-full.
        let mut buf = [0; 40];
        let mut w = TlvWriter::new(&mut buf);
        let mut b = Builder::init_with_end_buffer_reserved(&mut w, TlvTag::Anonymous);

        fill_one_status_response(&mut b).unwrap();

        let saved = b.checkpoint();
        assert_eq!(
            fill_one_status_response(&mut b).unwrap_err(),
            Error::BufferFull
        );
        // Drop the partial response; it goes into the next chunk.
        b.rollback(&saved);

        // The reserved byte still lets the array close.
        b.end_of_invoke_responses().unwrap();
    }
}
