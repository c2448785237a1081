//! Information-block (IB) codecs: one paired parser+builder per schema.
//!
//! Each IB module defines the context-tag assignments of its fields, a
//! `Parser` with typed accessors and a validation walk, and a `Builder` with
//! chainable setters and an `end_of_*` finalizer returning the sticky error.
//! The array-of-IB wrappers at the bottom are generated by `ib_array!`.

pub mod attribute_path;
pub mod cluster_path;
pub mod command_path;
pub mod event_path;
pub mod status;

pub mod attribute_data;
pub mod attribute_report;
pub mod attribute_status;
pub mod command_data;
pub mod command_status;
pub mod data_version_filter;
pub mod event_data;
pub mod event_filter;
pub mod event_report;
pub mod event_status;
pub mod invoke_response;

pub mod invoke_responses;

/// Generates an array-of-IB codec module: a `Parser` iterating anonymous
/// elements of the named IB, and a `Builder` with a `create_*` per element
/// and an `end_of_*` finalizer.
macro_rules! ib_array {
    (
        $(#[$attr:meta])*
        $mod_name:ident, $elem:ident, $label:expr, $create:ident, $end:ident
    ) => {
        $(#[$attr])*
        pub mod $mod_name {
            use error::Error;
            use im::builder::IbBuilder;
            use im::ib::$elem;
            use im::parser::IbParser;
            use im::printer::PrettyPrinter;
            use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

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

                /// Advances to the next array element and returns its
                /// parser. `EndOfTlv` once the array is exhausted; a
                /// non-anonymous element tag is invalid.
                pub fn next(&mut self) -> Result<$elem::Parser<'a>, Error> {
                    self.ib.reader.next()?;
                    if self.ib.reader.tag() != TlvTag::Anonymous {
                        return Err(Error::InvalidTlvTag);
                    }
                    $elem::Parser::init(&self.ib.reader)
                }

                pub fn check_schema_validity(&self) -> Result<(), Error> {
                    self.walk(&mut PrettyPrinter::new())
                }

                #[cfg(feature = "pretty-print")]
                pub fn pretty_print(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
                    self.walk(pp)
                }

                pub(crate) fn walk(&self, pp: &mut PrettyPrinter) -> Result<(), Error> {
                    pline!(pp, "{} =", $label);
                    pline!(pp, "[");
                    pp.inc_depth();
                    let mut items = self.clone();
                    loop {
                        match Parser::next(&mut items) {
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
                type Item = Result<$elem::Parser<'a>, Error>;

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
            }

            impl<'a, 'w> Builder<'a, 'w> {
                pub fn init(writer: &'w mut TlvWriter<'a>, tag: TlvTag) -> Self {
                    Builder {
                        ib: IbBuilder::open(writer, tag, TlvType::Array, None),
                    }
                }

                pub(crate) fn with_state(ib: IbBuilder<'a, 'w>) -> Self {
                    Builder { ib }
                }

                /// Opens the next (anonymous) array element.
                pub fn $create(&mut self) -> $elem::Builder<'a, '_> {
                    $elem::Builder::with_state(
                        self.ib.child(TlvTag::Anonymous, $elem::CONTAINER_TYPE),
                    )
                }

                /// Closes the array and returns the builder's final status.
                pub fn $end(&mut self) -> Result<(), Error> {
                    self.ib.close()
                }
            }
        }
    };
}

ib_array!(
    /// Array of AttributePathIBs.
    attribute_path_ibs, attribute_path, "AttributePathIBs",
    create_attribute_path, end_of_attribute_path_ibs
);
ib_array!(
    /// Array of EventPathIBs.
    event_path_ibs, event_path, "EventPathIBs",
    create_event_path, end_of_event_path_ibs
);
ib_array!(
    /// Array of EventFilterIBs.
    event_filter_ibs, event_filter, "EventFilterIBs",
    create_event_filter, end_of_event_filter_ibs
);
ib_array!(
    /// Array of DataVersionFilterIBs.
    data_version_filter_ibs, data_version_filter, "DataVersionFilterIBs",
    create_data_version_filter, end_of_data_version_filter_ibs
);
ib_array!(
    /// Array of AttributeDataIBs.
    attribute_data_ibs, attribute_data, "AttributeDataIBs",
    create_attribute_data, end_of_attribute_data_ibs
);
ib_array!(
    /// Array of AttributeStatusIBs.
    attribute_status_ibs, attribute_status, "AttributeStatusIBs",
    create_attribute_status, end_of_attribute_status_ibs
);
ib_array!(
    /// Array of AttributeReportIBs.
    attribute_report_ibs, attribute_report, "AttributeReportIBs",
    create_attribute_report, end_of_attribute_report_ibs
);
ib_array!(
    /// Array of EventReportIBs.
    event_report_ibs, event_report, "EventReportIBs",
    create_event_report, end_of_event_report_ibs
);
ib_array!(
    /// Array of CommandDataIBs carried by an InvokeRequest.
    invoke_requests, command_data, "InvokeRequests",
    create_command_data, end_of_invoke_requests
);

#[cfg(test)]
mod tests {
    use super::attribute_path_ibs;
    use error::Error;
    use tlv::{Tag as TlvTag, TlvReader, TlvType, TlvWriter};

    #[test]
    fn array_iteration() {
        let mut buf = [0; 128];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let mut b = attribute_path_ibs::Builder::init(&mut w, TlvTag::Anonymous);
            b.create_attribute_path()
                .endpoint(1)
                .end_of_attribute_path_ib()
                .unwrap();
            b.create_attribute_path()
                .endpoint(2)
                .end_of_attribute_path_ib()
                .unwrap();
            b.end_of_attribute_path_ibs().unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let mut p = attribute_path_ibs::Parser::init(&r).unwrap();
        p.check_schema_validity().unwrap();
        assert_eq!(p.next().unwrap().endpoint(), Ok(1));
        assert_eq!(p.next().unwrap().endpoint(), Ok(2));
        assert_eq!(p.next().unwrap_err(), Error::EndOfTlv);
    }

    #[test]
    fn tagged_array_element_rejected() {
        let mut buf = [0; 64];
        let len = {
            let mut w = TlvWriter::new(&mut buf);
            let outer = w.start_container(TlvTag::Anonymous, TlvType::Array).unwrap();
            let inner = w.start_container(TlvTag::Context(0), TlvType::List).unwrap();
            w.end_container(inner).unwrap();
            w.end_container(outer).unwrap();
            w.len()
        };

        let mut r = TlvReader::new(&buf[..len]);
        r.next().unwrap();
        let mut p = attribute_path_ibs::Parser::init(&r).unwrap();
        assert_eq!(p.next().unwrap_err(), Error::InvalidTlvTag);
        let p = attribute_path_ibs::Parser::init(&r).unwrap();
        assert_eq!(p.check_schema_validity(), Err(Error::InvalidTlvTag));
    }
}
