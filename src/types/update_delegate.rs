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

/// A request to change the permissions of existing delegates of a mailbox.
///
/// Folder permission levels which are left unset in a delegate's
/// permissions are not modified.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/updatedelegate>
#[derive(Clone, Debug)]
pub struct UpdateDelegate {
    pub mailbox: Mailbox,
    pub delegate_users: DelegateUsers,
    pub deliver_meeting_requests: Option<DeliverMeetingRequests>,
}

impl XmlSerialize for UpdateDelegate {
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

impl Operation for UpdateDelegate {
    type Response = UpdateDelegateResponse;
}

impl EnvelopeBodyContents for UpdateDelegate {
    fn name() -> &'static str {
        "UpdateDelegate"
    }
}

/// A response to an [`UpdateDelegate`] request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/updatedelegateresponse>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UpdateDelegateResponse(pub DelegateResponse);

impl Deref for UpdateDelegateResponse {
    type Target = DelegateResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl OperationResponse for UpdateDelegateResponse {}

impl EnvelopeBodyContents for UpdateDelegateResponse {
    fn name() -> &'static str {
        "UpdateDelegateResponse"
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        response::{
            DelegateResponse, DelegateUserResponseMessage, DelegateUserResponseMessages,
            ResponseClass,
        },
        test_utils::{assert_deserialized_content, assert_serialized_content},
        DelegatePermissionLevel, DelegatePermissions, DelegateUser, DelegateUsers,
        DeliverMeetingRequests, Mailbox, UserId,
    };

    use super::{UpdateDelegate, UpdateDelegateResponse};

    #[test]
    fn serialize_update_delegate() {
        let update_delegate = UpdateDelegate {
            mailbox: Mailbox {
                email_address: "owner@example.com".to_string(),
            },
            delegate_users: DelegateUsers(vec![DelegateUser {
                user_id: Some(UserId {
                    primary_smtp_address: Some("delegate@example.com".to_string()),
                    ..Default::default()
                }),
                delegate_permissions: Some(DelegatePermissions::inbox(
                    DelegatePermissionLevel::Editor,
                )),
                ..Default::default()
            }]),
            deliver_meeting_requests: Some(DeliverMeetingRequests::DelegatesAndSendInformationToMe),
        };

        let expected = r#"<m:UpdateDelegate><m:Mailbox><t:EmailAddress>owner@example.com</t:EmailAddress></m:Mailbox><m:DelegateUsers><t:DelegateUser><t:UserId><t:PrimarySmtpAddress>delegate@example.com</t:PrimarySmtpAddress></t:UserId><t:DelegatePermissions><t:InboxFolderPermissionLevel>Editor</t:InboxFolderPermissionLevel></t:DelegatePermissions></t:DelegateUser></m:DelegateUsers><m:DeliverMeetingRequests>DelegatesAndSendInformationToMe</m:DeliverMeetingRequests></m:UpdateDelegate>"#;

        assert_serialized_content(&update_delegate, "m:UpdateDelegate", expected);
    }

    #[test]
    fn deserialize_update_delegate_response_with_delegate_error() {
        let content = r#"<m:UpdateDelegateResponse ResponseClass="Success"
                xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">
                <m:ResponseCode>NoError</m:ResponseCode>
                <m:ResponseMessages>
                    <m:DelegateUserResponseMessageType ResponseClass="Error">
                        <m:MessageText>The user is not a delegate for the mailbox.</m:MessageText>
                        <m:ResponseCode>ErrorNotDelegate</m:ResponseCode>
                        <m:DescriptiveLinkKey>0</m:DescriptiveLinkKey>
                    </m:DelegateUserResponseMessageType>
                </m:ResponseMessages>
            </m:UpdateDelegateResponse>"#;

        let expected = UpdateDelegateResponse(DelegateResponse {
            response_class: Some(ResponseClass::Success),
            response_code: Some("NoError".to_string()),
            response_messages: Some(DelegateUserResponseMessages {
                messages: vec![DelegateUserResponseMessage {
                    response_class: Some(ResponseClass::Error),
                    message_text: Some("The user is not a delegate for the mailbox.".to_string()),
                    response_code: Some("ErrorNotDelegate".to_string()),
                    delegate_user: None,
                }],
            }),
            ..Default::default()
        });

        assert_deserialized_content(content, expected);
    }
}
