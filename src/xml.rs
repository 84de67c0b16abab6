/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Serialization of request structures as XML.
//!
//! Requests are written element by element through a [`quick_xml::Writer`].
//! Each request type implements [`XmlSerialize`] by hand; element names carry
//! their namespace prefix (`m:` for messages, `t:` for types), which is bound
//! once on the SOAP envelope.
//!
//! Deserialization of responses does not go through this module: `quick_xml`'s
//! serde implementation is used directly for that.

mod impls;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use thiserror::Error;

/// A data structure which can be serialized as XML content nodes.
pub trait XmlSerialize {
    /// Serializes this value as XML content nodes within an enclosing XML
    /// element.
    fn serialize_as_element<W>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        writer.write_event(Event::Start(BytesStart::new(name)))?;

        self.serialize_child_nodes(writer)?;

        writer.write_event(Event::End(BytesEnd::new(name)))?;

        Ok(())
    }

    /// Serializes this value as XML content nodes.
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), Error>
    where
        W: std::io::Write;
}

/// A data structure which can be serialized as the value of an XML attribute.
pub trait XmlSerializeAttr {
    /// Serializes this value as the value of an XML attribute.
    fn serialize_as_attribute(&self, start_tag: &mut BytesStart, name: &str);
}

/// Writes an element with a single text node, escaping its content.
pub(crate) fn write_text_element<W>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Error>
where
    W: std::io::Write,
{
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;

    Ok(())
}

/// An error generated during the XML serialization process.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to process XML document")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to write XML document")]
    Io(#[from] std::io::Error),
}
