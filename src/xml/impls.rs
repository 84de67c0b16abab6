/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! This module provides implementations of serialization for common types from
//! the standard library.

use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Writer,
};

use super::{Error, XmlSerialize, XmlSerializeAttr};

/// Serializes a string as a text content node.
impl XmlSerialize for str {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        writer.write_event(Event::Text(BytesText::new(self)))?;

        Ok(())
    }
}

/// Serializes a string as a text content node.
impl XmlSerialize for String {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        self.as_str().serialize_child_nodes(writer)
    }
}

/// Serializes a boolean as `true` or `false`, as expected by `xs:boolean`.
impl XmlSerialize for bool {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        let text = if *self { "true" } else { "false" };
        text.serialize_child_nodes(writer)
    }
}

/// Serializes the contents of an `Option<T>` as content nodes.
///
/// `Some(t)` is serialized identically to `t`, while `None` produces no output,
/// not even an empty element.
impl<T> XmlSerialize for Option<T>
where
    T: XmlSerialize,
{
    fn serialize_as_element<W>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        match self {
            Some(value) => <T as XmlSerialize>::serialize_as_element(value, writer, name),
            None => Ok(()),
        }
    }

    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        match self {
            Some(value) => <T as XmlSerialize>::serialize_child_nodes(value, writer),
            None => Ok(()),
        }
    }
}

/// Serializes a string as an XML attribute value.
impl XmlSerializeAttr for str {
    fn serialize_as_attribute(&self, start_tag: &mut BytesStart, name: &str) {
        start_tag.push_attribute((name, self));
    }
}

/// Serializes a boolean as an XML attribute value.
impl XmlSerializeAttr for bool {
    fn serialize_as_attribute(&self, start_tag: &mut BytesStart, name: &str) {
        let value = if *self { "true" } else { "false" };
        value.serialize_as_attribute(start_tag, name);
    }
}

/// Serializes the contents of an `Option<T>` as an XML attribute value, or
/// omits the attribute entirely for `None`.
impl<T> XmlSerializeAttr for Option<T>
where
    T: XmlSerializeAttr,
{
    fn serialize_as_attribute(&self, start_tag: &mut BytesStart, name: &str) {
        if let Some(value) = self {
            value.serialize_as_attribute(start_tag, name);
        }
    }
}
