/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::ops::Deref;

use quick_xml::Writer;
use serde::Deserialize;

use crate::{
    response::DelegateResponse,
    types::sealed::EnvelopeBodyContents,
    xml::{self, XmlSerialize},
    DelegateUsers, DeliverMeetingRequests, Mailbox, Operation, OperationResponse,
};

/// A request to add one or more delegates to a mailbox.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/adddelegate>
#[derive(Clone, Debug)]
pub struct AddDelegate {
    pub mailbox: Mailbox,
    pub delegate_users: DelegateUsers,
    pub deliver_meeting_requests: Option<DeliverMeetingRequests>,
}

impl XmlSerialize for AddDelegate {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        self.mailbox.serialize_as_element(writer, "m:Mailbox")?;
        self.delegate_users
            .serialize_as_element(writer, "m:DelegateUsers")?;
        self.deliver_meeting_requests
            .serialize_as_element(writer, "m:DeliverMeetingRequests")?;

        Ok(())
    }
}

impl Operation for AddDelegate {
    type Response = AddDelegateResponse;
}

impl EnvelopeBodyContents for AddDelegate {
    fn name() -> &'static str {
        "AddDelegate"
    }
}

/// A response to an [`AddDelegate`] request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/adddelegateresponse>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AddDelegateResponse(pub DelegateResponse);

impl Deref for AddDelegateResponse {
    type Target = DelegateResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl OperationResponse for AddDelegateResponse {}

impl EnvelopeBodyContents for AddDelegateResponse {
    fn name() -> &'static str {
        "AddDelegateResponse"
    }
}
