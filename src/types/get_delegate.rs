/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::ops::Deref;

use quick_xml::{
    events::{BytesEnd, BytesStart, Event},
    Writer,
};
use serde::Deserialize;

use crate::{
    response::DelegateResponse,
    types::sealed::EnvelopeBodyContents,
    xml::{self, XmlSerialize, XmlSerializeAttr},
    Mailbox, Operation, OperationResponse, UserIds,
};

/// A request to retrieve the delegates of a mailbox.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/getdelegate>
#[derive(Clone, Debug)]
pub struct GetDelegate {
    /// Whether the permissions of each delegate should be included in the
    /// response.
    pub include_permissions: bool,

    /// The mailbox whose delegates are retrieved.
    pub mailbox: Mailbox,

    /// The delegates to retrieve. All delegates are returned when empty.
    pub user_ids: UserIds,
}

impl XmlSerialize for GetDelegate {
    fn serialize_as_element<W>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        let mut start = BytesStart::new(name);
        self.include_permissions
            .serialize_as_attribute(&mut start, "IncludePermissions");

        writer.write_event(Event::Start(start))?;
        self.serialize_child_nodes(writer)?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;

        Ok(())
    }

    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        self.mailbox.serialize_as_element(writer, "m:Mailbox")?;
        self.user_ids.serialize_as_element(writer, "m:UserIds")?;

        Ok(())
    }
}

impl Operation for GetDelegate {
    type Response = GetDelegateResponse;
}

impl EnvelopeBodyContents for GetDelegate {
    fn name() -> &'static str {
        "GetDelegate"
    }
}

/// A response to a [`GetDelegate`] request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/getdelegateresponse>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GetDelegateResponse(pub DelegateResponse);

impl Deref for GetDelegateResponse {
    type Target = DelegateResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl OperationResponse for GetDelegateResponse {}

impl EnvelopeBodyContents for GetDelegateResponse {
    fn name() -> &'static str {
        "GetDelegateResponse"
    }
}
