/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{fmt, str::FromStr};

use quick_xml::{
    events::{BytesEnd, BytesStart, Event},
    Writer,
};
use serde::Deserialize;

use crate::{
    xml::{self, write_text_element, XmlSerialize},
    Error,
};

pub(crate) const MESSAGES_NS_URI: &str =
    "http://schemas.microsoft.com/exchange/services/2006/messages";
pub(crate) const SOAP_NS_URI: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub(crate) const TYPES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

/// The SMTP address of a mailbox, used both for the owner of a mailbox and for
/// the delegates granted access to it.
///
/// Addresses are kept as provided, but compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MailboxIdentity(String);

impl MailboxIdentity {
    /// Wraps an address reported by the server without validating it.
    pub(crate) fn from_server(address: &str) -> Self {
        Self(address.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lower-cased form of the address, used for matching.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether both identities designate the same mailbox.
    pub fn matches(&self, other: &MailboxIdentity) -> bool {
        self.normalized() == other.normalized()
    }
}

impl FromStr for MailboxIdentity {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let address = value.trim();

        match address.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !address.contains(char::is_whitespace) =>
            {
                Ok(Self(address.to_owned()))
            }
            _ => Err(Error::InvalidAddress(value.to_owned())),
        }
    }
}

impl TryFrom<&str> for MailboxIdentity {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MailboxIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The level of access a delegate holds on one of the owner's folders.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/inboxfolderpermissionlevel>
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum DelegatePermissionLevel {
    None,
    Editor,
    Reviewer,
    Author,
    Custom,
}

impl DelegatePermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Editor => "Editor",
            Self::Reviewer => "Reviewer",
            Self::Author => "Author",
            Self::Custom => "Custom",
        }
    }
}

/// Parses a level from its EWS name, ignoring case.
impl FromStr for DelegatePermissionLevel {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [
            Self::None,
            Self::Editor,
            Self::Reviewer,
            Self::Author,
            Self::Custom,
        ]
        .into_iter()
        .find(|level| level.as_str().eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| Error::UnknownPermissionLevel(value.to_owned()))
    }
}

impl fmt::Display for DelegatePermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl XmlSerialize for DelegatePermissionLevel {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        self.as_str().serialize_child_nodes(writer)
    }
}

/// Who receives meeting requests sent to the owner of a mailbox which has
/// delegates.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/delivermeetingrequests>
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum DeliverMeetingRequests {
    DelegatesOnly,
    DelegatesAndMe,
    #[default]
    DelegatesAndSendInformationToMe,
    NoForward,
}

impl DeliverMeetingRequests {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DelegatesOnly => "DelegatesOnly",
            Self::DelegatesAndMe => "DelegatesAndMe",
            Self::DelegatesAndSendInformationToMe => "DelegatesAndSendInformationToMe",
            Self::NoForward => "NoForward",
        }
    }
}

impl XmlSerialize for DeliverMeetingRequests {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        self.as_str().serialize_child_nodes(writer)
    }
}

/// The mailbox on which an operation is performed.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/mailbox>
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Mailbox {
    pub email_address: String,
}

impl From<&MailboxIdentity> for Mailbox {
    fn from(value: &MailboxIdentity) -> Self {
        Self {
            email_address: value.as_str().to_owned(),
        }
    }
}

impl XmlSerialize for Mailbox {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        write_text_element(writer, "t:EmailAddress", &self.email_address)
    }
}

/// The identifier of a delegate.
///
/// Only one of the fields is required to identify a user in a request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/userid>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserId {
    #[serde(rename = "SID")]
    pub sid: Option<String>,

    pub primary_smtp_address: Option<String>,

    pub display_name: Option<String>,
}

impl UserId {
    pub fn from_address(address: &MailboxIdentity) -> Self {
        Self {
            primary_smtp_address: Some(address.as_str().to_owned()),
            ..Default::default()
        }
    }
}

impl XmlSerialize for UserId {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        self.sid.serialize_as_element(writer, "t:SID")?;
        self.primary_smtp_address
            .serialize_as_element(writer, "t:PrimarySmtpAddress")?;
        self.display_name.serialize_as_element(writer, "t:DisplayName")?;

        Ok(())
    }
}

/// The permissions a delegate holds on each of the owner's default folders.
///
/// Folders without a value are left untouched by update requests.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/delegatepermissions>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DelegatePermissions {
    pub calendar_folder_permission_level: Option<DelegatePermissionLevel>,
    pub tasks_folder_permission_level: Option<DelegatePermissionLevel>,
    pub inbox_folder_permission_level: Option<DelegatePermissionLevel>,
    pub contacts_folder_permission_level: Option<DelegatePermissionLevel>,
    pub notes_folder_permission_level: Option<DelegatePermissionLevel>,
    pub journal_folder_permission_level: Option<DelegatePermissionLevel>,
}

impl DelegatePermissions {
    /// Permissions which only set the level for the inbox folder.
    pub fn inbox(level: DelegatePermissionLevel) -> Self {
        Self {
            inbox_folder_permission_level: Some(level),
            ..Default::default()
        }
    }
}

impl XmlSerialize for DelegatePermissions {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        // The schema requires this exact order.
        self.calendar_folder_permission_level
            .serialize_as_element(writer, "t:CalendarFolderPermissionLevel")?;
        self.tasks_folder_permission_level
            .serialize_as_element(writer, "t:TasksFolderPermissionLevel")?;
        self.inbox_folder_permission_level
            .serialize_as_element(writer, "t:InboxFolderPermissionLevel")?;
        self.contacts_folder_permission_level
            .serialize_as_element(writer, "t:ContactsFolderPermissionLevel")?;
        self.notes_folder_permission_level
            .serialize_as_element(writer, "t:NotesFolderPermissionLevel")?;
        self.journal_folder_permission_level
            .serialize_as_element(writer, "t:JournalFolderPermissionLevel")?;

        Ok(())
    }
}

/// A delegate of a mailbox, along with its permissions.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/delegateuser>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DelegateUser {
    // Optional so that a malformed entry in a `GetDelegate` response can be
    // skipped rather than failing the whole response.
    pub user_id: Option<UserId>,

    pub delegate_permissions: Option<DelegatePermissions>,

    /// Whether the delegate receives copies of meeting-related messages sent
    /// to the owner.
    pub receive_copies_of_meeting_messages: Option<bool>,

    /// Whether the delegate can see items the owner marked as private.
    pub view_private_items: Option<bool>,
}

impl XmlSerialize for DelegateUser {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        self.user_id.serialize_as_element(writer, "t:UserId")?;
        self.delegate_permissions
            .serialize_as_element(writer, "t:DelegatePermissions")?;
        self.receive_copies_of_meeting_messages
            .serialize_as_element(writer, "t:ReceiveCopiesOfMeetingMessages")?;
        self.view_private_items
            .serialize_as_element(writer, "t:ViewPrivateItems")?;

        Ok(())
    }
}

/// A list of delegates in a request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/delegateusers>
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelegateUsers(pub Vec<DelegateUser>);

impl XmlSerialize for DelegateUsers {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        for user in &self.0 {
            user.serialize_as_element(writer, "t:DelegateUser")?;
        }

        Ok(())
    }
}

/// A list of delegate identifiers in a request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/userids>
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserIds(pub Vec<UserId>);

impl XmlSerialize for UserIds {
    /// An empty list is written as an empty element, which asks for every
    /// delegate of the mailbox.
    fn serialize_as_element<W>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        if self.0.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.serialize_child_nodes(writer)?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;

        Ok(())
    }

    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        for user_id in &self.0 {
            user_id.serialize_as_element(writer, "t:UserId")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_deserialized_content, assert_serialized_content};

    #[test]
    fn mailbox_identity_rejects_invalid_addresses() {
        for value in ["", "   ", "owner", "@example.com", "owner@", "a@b@c", "a b@c.com"] {
            assert!(
                value.parse::<MailboxIdentity>().is_err(),
                "{value:?} should not be accepted as an address"
            );
        }
    }

    #[test]
    fn mailbox_identity_matches_case_insensitively() {
        let stored: MailboxIdentity = "John@Example.com".parse().unwrap();
        let queried: MailboxIdentity = "john@example.com".parse().unwrap();

        assert!(stored.matches(&queried));
        assert_eq!(stored.as_str(), "John@Example.com", "address should be kept as given");
        assert_eq!(stored.normalized(), "john@example.com");
    }

    #[test]
    fn permission_level_parses_case_insensitively() {
        assert_eq!(
            "reviewer".parse::<DelegatePermissionLevel>().unwrap(),
            DelegatePermissionLevel::Reviewer
        );
        assert_eq!(
            "EDITOR".parse::<DelegatePermissionLevel>().unwrap(),
            DelegatePermissionLevel::Editor
        );
        assert!("Owner".parse::<DelegatePermissionLevel>().is_err());
    }

    #[test]
    fn serialize_delegate_user() {
        let user = DelegateUser {
            user_id: Some(UserId::from_address(&"d@example.com".parse().unwrap())),
            delegate_permissions: Some(DelegatePermissions::inbox(
                DelegatePermissionLevel::Reviewer,
            )),
            receive_copies_of_meeting_messages: Some(false),
            view_private_items: Some(true),
        };

        let expected = "<t:DelegateUser><t:UserId><t:PrimarySmtpAddress>d@example.com</t:PrimarySmtpAddress></t:UserId><t:DelegatePermissions><t:InboxFolderPermissionLevel>Reviewer</t:InboxFolderPermissionLevel></t:DelegatePermissions><t:ReceiveCopiesOfMeetingMessages>false</t:ReceiveCopiesOfMeetingMessages><t:ViewPrivateItems>true</t:ViewPrivateItems></t:DelegateUser>";

        assert_serialized_content(&user, "t:DelegateUser", expected);
    }

    #[test]
    fn deserialize_delegate_user() {
        let content = r#"<t:DelegateUser xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                <t:UserId>
                    <t:SID>S-1-5-21-1333220396-2200287332-232816053-1115</t:SID>
                    <t:PrimarySmtpAddress>User2@Example.com</t:PrimarySmtpAddress>
                    <t:DisplayName>User2</t:DisplayName>
                </t:UserId>
                <t:DelegatePermissions>
                    <t:CalendarFolderPermissionLevel>Editor</t:CalendarFolderPermissionLevel>
                    <t:InboxFolderPermissionLevel>Author</t:InboxFolderPermissionLevel>
                </t:DelegatePermissions>
                <t:ReceiveCopiesOfMeetingMessages>false</t:ReceiveCopiesOfMeetingMessages>
                <t:ViewPrivateItems>false</t:ViewPrivateItems>
            </t:DelegateUser>"#;

        let expected = DelegateUser {
            user_id: Some(UserId {
                sid: Some("S-1-5-21-1333220396-2200287332-232816053-1115".to_string()),
                primary_smtp_address: Some("User2@Example.com".to_string()),
                display_name: Some("User2".to_string()),
            }),
            delegate_permissions: Some(DelegatePermissions {
                calendar_folder_permission_level: Some(DelegatePermissionLevel::Editor),
                inbox_folder_permission_level: Some(DelegatePermissionLevel::Author),
                ..Default::default()
            }),
            receive_copies_of_meeting_messages: Some(false),
            view_private_items: Some(false),
        };

        assert_deserialized_content(content, expected);
    }
}
