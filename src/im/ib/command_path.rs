//! CommandPathIB: addresses a command on a cluster instance.

use error::{Error, Schema};
use im::builder::IbBuilder;
use im::parser::IbParser;
use im::paths::ConcreteCommandPath;
use im::printer::PrettyPrinter;
use im::{ClusterId, CommandId, EndpointId};
use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

/// Context tags of the CommandPathIB fields.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Endpoint = 0,
    Cluster = 1,
    Command = 2,
}

pub(crate) const CONTAINER_TYPE: TlvType = TlvType::List;

bitflags! {
    struct Fields: u8 {
        const CLUSTER = 1 << Tag::Cluster as u8;
        const COMMAND = 1 << Tag::Command as u8;
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

    pub fn endpoint(&self) -> Result<EndpointId, Error> {
        self.ib.get_unsigned_u16(Tag::Endpoint as u8)
    }

    pub fn cluster(&self) -> Result<ClusterId, Error> {
        self.ib.get_unsigned_u32(Tag::Cluster as u8)
    }

    pub fn command(&self) -> Result<CommandId, Error> {
        self.ib.get_unsigned_u32(Tag::Command as u8)
    }

    /// Reads the path as fully concrete (all three axes present).
    pub fn concrete_path(&self) -> Result<ConcreteCommandPath, Error> {
        Ok(ConcreteCommandPath {
            endpoint: self.endpoint()?,
            cluster: self.cluster()?,
            command: self.command()?,
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
        let mut seen = Fields::empty();
        pline!(pp, "CommandPathIB =");
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
                t if t == Tag::Endpoint as u8 => {
                    pline!(pp, "Endpoint = 0x{:x},", reader.get_u16()?);
                }
                t if t == Tag::Cluster as u8 => {
                    seen |= Fields::CLUSTER;
                    pline!(pp, "Cluster = 0x{:x},", reader.get_u32()?);
                }
                t if t == Tag::Command as u8 => {
                    seen |= Fields::COMMAND;
                    pline!(pp, "Command = 0x{:x},", reader.get_u32()?);
                }
                _ => {
                    debug!("CommandPathIB: skipping unknown tag 0x{:02x}", tag_num);
                    pline!(pp, "Unknown tag 0x{:02x},", tag_num);
                }
            }
        }

        pp.dec_depth();
        pline!(pp, "}},");
        if !seen.contains(Fields::CLUSTER | Fields::COMMAND) {
            return Err(Error::Malformed(Schema::CommandPathIb));
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

    pub fn endpoint(&mut self, endpoint: EndpointId) -> &mut Self {
        self.ib.put_unsigned(Tag::Endpoint as u8, u64::from(endpoint));
        self
    }

    pub fn cluster(&mut self, cluster: ClusterId) -> &mut Self {
        self.ib.put_unsigned(Tag::Cluster as u8, u64::from(cluster));
        self
    }

    pub fn command(&mut self, command: CommandId) -> &mut Self {
        self.ib.put_unsigned(Tag::Command as u8, u64::from(command));
        self
    }

    /// Encodes a concrete command path.
    pub fn encode(&mut self, path: &ConcreteCommandPath) -> Result<(), Error> {
        self.endpoint(path.endpoint)
            .cluster(path.cluster)
            .command(path.command)
            .end_of_command_path_ib()
    }

    pub fn end_of_command_path_ib(&mut self) -> Result<(), Error> {
        self.ib.close()
    }
}
