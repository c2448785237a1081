//! Generic builder scaffolding shared by every IB and message codec.

use error::Error;
use im::{INTERACTION_MODEL_REVISION, REVISION_TAG};
use tlv::{Checkpoint, Tag, TlvType, TlvWriter};

use std::fmt;

/// Common state of an IB builder: the borrowed writer, the sticky error and
/// the saved outer-container type.
///
/// The first failure latches: every later call is a no-op and the original
/// error is returned by [`close`]. After a successful close, the saved
/// container type becomes `NotSpecified`, so a second close cannot emit a
/// stray terminator.
///
/// Child builders reborrow the parent's writer through [`child`]; a parent
/// with a latched error seeds the child, which then writes nothing.
///
/// [`close`]: #method.close
/// [`child`]: #method.child
pub(crate) struct IbBuilder<'a, 'w>
where
    'a: 'w,
{
    writer: &'w mut TlvWriter<'a>,
    outer: TlvType,
    error: Option<Error>,
    closed: bool,
}

impl<'a, 'w> IbBuilder<'a, 'w> {
    /// Opens a container for the IB, or latches `pending` without touching
    /// the writer.
    pub fn open(
        writer: &'w mut TlvWriter<'a>,
        tag: Tag,
        ty: TlvType,
        pending: Option<Error>,
    ) -> Self {
        if let Some(e) = pending {
            return IbBuilder {
                writer,
                outer: TlvType::NotSpecified,
                error: Some(e),
                closed: false,
            };
        }
        match writer.start_container(tag, ty) {
            Ok(outer) => IbBuilder {
                writer,
                outer,
                error: None,
                closed: false,
            },
            Err(e) => IbBuilder {
                writer,
                outer: TlvType::NotSpecified,
                error: Some(e),
                closed: false,
            },
        }
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Seeds or overwrites the sticky error.
    pub fn reset_error(&mut self, error: Error) {
        self.error = Some(error);
    }

    fn run(&mut self, f: impl FnOnce(&mut TlvWriter<'a>) -> Result<(), Error>) {
        if self.error.is_none() {
            if let Err(e) = f(self.writer) {
                self.error = Some(e);
            }
        }
    }

    pub fn put_unsigned(&mut self, tag_num: u8, value: u64) {
        self.run(|w| w.put_unsigned(Tag::Context(tag_num), value));
    }

    pub fn put_boolean(&mut self, tag_num: u8, value: bool) {
        self.run(|w| w.put_boolean(Tag::Context(tag_num), value));
    }

    pub fn put_null(&mut self, tag_num: u8) {
        self.run(|w| w.put_null(Tag::Context(tag_num)));
    }

    /// Writes the anonymous unsigned integers of a positional list.
    pub fn put_anonymous_unsigned(&mut self, value: u64) {
        self.run(|w| w.put_unsigned(Tag::Anonymous, value));
    }

    /// Stamps the interaction-model revision field. Called by every message
    /// builder from its finalizer, just before the closing token.
    pub fn encode_interaction_model_revision(&mut self) {
        self.put_unsigned(REVISION_TAG, u64::from(INTERACTION_MODEL_REVISION));
    }

    /// Opens a nested IB borrowing this builder's writer. A latched error
    /// propagates into the child.
    pub fn child(&mut self, tag: Tag, ty: TlvType) -> IbBuilder<'a, '_> {
        let pending = self.error;
        IbBuilder::open(&mut *self.writer, tag, ty, pending)
    }

    /// Direct access to the underlying writer, for opaque payload fields.
    ///
    /// Errors raised while writing payload through this reference are the
    /// caller's to handle; the builder's sticky error is unaffected.
    pub fn writer(&mut self) -> &mut TlvWriter<'a> {
        self.writer
    }

    /// Saves the writer state for speculative encoding.
    pub fn checkpoint(&self) -> Checkpoint {
        self.writer.checkpoint()
    }

    /// Restores a saved writer state, discarding everything encoded since
    /// and clearing the sticky error so building can continue.
    pub fn rollback(&mut self, saved: &Checkpoint) {
        self.writer.rollback(saved);
        self.error = None;
    }

    /// Reserves trailing buffer space through the underlying writer,
    /// folding a failure into the sticky error.
    pub fn reserve(&mut self, n: usize) {
        self.run(|w| w.reserve_buffer(n));
    }

    /// Releases a reservation, folding a failure into the sticky error.
    pub fn unreserve(&mut self, n: usize) {
        self.run(|w| w.unreserve_buffer(n));
    }

    /// Closes the IB's container and returns the builder's final status.
    pub fn close(&mut self) -> Result<(), Error> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.closed {
            self.error = Some(Error::IncorrectState);
            return Err(Error::IncorrectState);
        }
        match self.writer.end_container(self.outer) {
            Ok(()) => {
                self.outer = TlvType::NotSpecified;
                self.closed = true;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e);
                Err(e)
            }
        }
    }
}

impl<'a, 'w> fmt::Debug for IbBuilder<'a, 'w> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IbBuilder")
            .field("outer", &self.outer)
            .field("error", &self.error)
            .finish()
    }
}
