/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use serde::Deserialize;

use crate::{DelegateUser, DeliverMeetingRequests};

/// The success value of an operation or of an individual entity within it.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/responsemessage#attributes>
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Warning,
    Error,
}

/// The body shared by the responses to all delegate operations.
///
/// Contrary to most EWS responses, the overall result of a delegate operation
/// is carried by the response element itself, while `ResponseMessages` holds
/// one message per delegate.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/getdelegateresponse>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DelegateResponse {
    #[serde(rename = "@ResponseClass")]
    pub response_class: Option<ResponseClass>,

    pub message_text: Option<String>,

    pub response_code: Option<String>,

    pub response_messages: Option<DelegateUserResponseMessages>,

    /// How meeting requests are delivered. Only present in `GetDelegate`
    /// responses.
    pub deliver_meeting_requests: Option<DeliverMeetingRequests>,
}

impl DelegateResponse {
    pub fn is_success(&self) -> bool {
        self.response_class == Some(ResponseClass::Success)
    }

    /// The per-delegate messages of the response, in document order.
    pub fn messages(&self) -> &[DelegateUserResponseMessage] {
        self.response_messages
            .as_ref()
            .map(|messages| messages.messages.as_slice())
            .unwrap_or_default()
    }

    /// The response code best describing a failure: the one carried by the
    /// response element, or else the first one found in a per-delegate
    /// message.
    pub fn error_code(&self) -> Option<&str> {
        self.response_code.as_deref().or_else(|| {
            self.messages()
                .iter()
                .find_map(|message| message.response_code.as_deref())
        })
    }

    /// Consumes the response and returns the delegates it describes.
    pub fn into_delegate_users(self) -> Vec<DelegateUser> {
        self.response_messages
            .map(|messages| {
                messages
                    .messages
                    .into_iter()
                    .filter_map(|message| message.delegate_user)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A collection of per-delegate responses.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/responsemessages>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DelegateUserResponseMessages {
    #[serde(rename = "DelegateUserResponseMessageType", default)]
    pub messages: Vec<DelegateUserResponseMessage>,
}

/// The result of a delegate operation for a single delegate.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/delegateuserresponsemessagetype>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DelegateUserResponseMessage {
    #[serde(rename = "@ResponseClass")]
    pub response_class: Option<ResponseClass>,

    pub message_text: Option<String>,

    pub response_code: Option<String>,

    pub delegate_user: Option<DelegateUser>,
}

impl DelegateUserResponseMessage {
    pub fn is_error(&self) -> bool {
        self.response_class == Some(ResponseClass::Error)
    }
}
