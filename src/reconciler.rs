/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Listing and reconciliation of the delegates of a mailbox.

use std::{env, ops::Deref};

use uuid::Uuid;

use crate::{
    add_delegate::AddDelegate,
    get_delegate::GetDelegate,
    response::{DelegateResponse, ResponseClass},
    server_version::ExchangeServerVersion,
    soap::{Envelope, Header, ResponseHeader},
    transport::HttpTransport,
    types::sealed::EnvelopeBodyContents,
    update_delegate::UpdateDelegate,
    Config, DelegatePermissionLevel, DelegatePermissions, DelegateUser, DelegateUsers,
    DeliverMeetingRequests, Error, HttpResponse, Mailbox, MailboxIdentity, Operation, Result,
    SoapRequest, StatusCode, Transport, TransportError, UserId, UserIds,
};

pub(crate) const LOG_NETWORK_PAYLOADS_ENV_VAR: &str = "EWS_DELEGATION_LOG_NETWORK_PAYLOADS";

const UNKNOWN_ERROR: &str = "UnknownError";
const HTML_PREVIEW_LEN: usize = 100;

/// A delegate of the owner's mailbox, along with its inbox access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateRecord {
    /// The lower-cased address of the delegate.
    pub delegate: MailboxIdentity,

    /// The delegate's permission level on the owner's inbox, or `None` if the
    /// server did not report one.
    pub inbox_level: Option<DelegatePermissionLevel>,
}

impl DelegateRecord {
    /// Builds a record from a delegate reported by the server, if it carries
    /// a usable address.
    fn from_delegate_user(user: DelegateUser) -> Option<Self> {
        let address = user.user_id?.primary_smtp_address?;
        if address.trim().is_empty() {
            return None;
        }

        Some(Self {
            delegate: MailboxIdentity::from_server(&address),
            inbox_level: user
                .delegate_permissions
                .and_then(|permissions| permissions.inbox_folder_permission_level),
        })
    }
}

/// The delegates of a mailbox, as returned by a single `GetDelegate`
/// request.
///
/// Records are produced as the iterator is consumed; iterating never sends
/// another request.
#[derive(Debug)]
pub struct Delegates {
    users: std::vec::IntoIter<DelegateUser>,
}

impl Iterator for Delegates {
    type Item = DelegateRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.users.find_map(DelegateRecord::from_delegate_user)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.users.size_hint().1)
    }
}

/// The result of a write operation, as judged by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,

    /// A fixed message on success, otherwise the response code reported by
    /// the server.
    pub message: String,
}

impl OperationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Options applied to a delegate when it is added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddDelegateOptions {
    /// Whether the delegate receives copies of the owner's meeting messages.
    pub receive_copies: bool,

    /// Whether the delegate can see the owner's private items.
    pub view_private: bool,

    pub deliver_meeting_requests: DeliverMeetingRequests,
}

/// Manages the inbox delegates of one mailbox.
///
/// The reconciler holds no state besides its configuration: every operation
/// works from a fresh server response.
pub struct DelegationReconciler<T> {
    owner: MailboxIdentity,
    transport: T,
    server_version: ExchangeServerVersion,
}

impl DelegationReconciler<HttpTransport> {
    /// Creates a reconciler talking to the endpoint described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let transport = HttpTransport::new(
            config.endpoint_url()?,
            config.credentials(),
            config.verify_tls,
            config.timeout(),
        )?;

        Ok(Self::new(config.owner_identity()?, transport)
            .with_server_version(config.server_version))
    }
}

impl<T> DelegationReconciler<T>
where
    T: Transport,
{
    pub fn new(owner: MailboxIdentity, transport: T) -> Self {
        Self {
            owner,
            transport,
            server_version: ExchangeServerVersion::default(),
        }
    }

    /// Sets the schema version requested in each request header.
    pub fn with_server_version(mut self, server_version: ExchangeServerVersion) -> Self {
        self.server_version = server_version;
        self
    }

    pub fn owner(&self) -> &MailboxIdentity {
        &self.owner
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retrieves the delegates of the owner's mailbox with their inbox
    /// permission level.
    ///
    /// Delegates without an address are skipped.
    pub fn list_delegates(&self) -> Result<Delegates> {
        let response = self.make_operation_request(GetDelegate {
            include_permissions: true,
            mailbox: Mailbox::from(&self.owner),
            user_ids: UserIds::default(),
        })?;

        match response.response_class {
            Some(ResponseClass::Error) => {
                return Err(Error::Response {
                    operation: GetDelegate::name(),
                    code: response.error_code().unwrap_or(UNKNOWN_ERROR).to_owned(),
                    message: response.message_text.clone(),
                });
            }
            Some(ResponseClass::Warning) => log::warn!(
                "GetDelegate for {} returned a warning: {}",
                self.owner,
                response.error_code().unwrap_or(UNKNOWN_ERROR)
            ),
            Some(ResponseClass::Success) => (),
            None => log::warn!("GetDelegate response carries no response class"),
        }

        Ok(Delegates {
            users: response.0.into_delegate_users().into_iter(),
        })
    }

    /// Adds a delegate with Reviewer access to the owner's inbox.
    pub fn add_delegate(
        &self,
        delegate: &MailboxIdentity,
        options: &AddDelegateOptions,
    ) -> Result<OperationOutcome> {
        let operation = AddDelegate {
            mailbox: Mailbox::from(&self.owner),
            delegate_users: DelegateUsers(vec![DelegateUser {
                user_id: Some(UserId::from_address(delegate)),
                delegate_permissions: Some(DelegatePermissions::inbox(
                    DelegatePermissionLevel::Reviewer,
                )),
                receive_copies_of_meeting_messages: Some(options.receive_copies),
                view_private_items: Some(options.view_private),
            }]),
            deliver_meeting_requests: Some(options.deliver_meeting_requests),
        };

        self.perform_write(operation, "AddDelegate Success")
    }

    /// Sets the inbox permission level of an existing delegate. Permissions
    /// on other folders are left untouched.
    pub fn update_delegate(
        &self,
        delegate: &MailboxIdentity,
        level: DelegatePermissionLevel,
    ) -> Result<OperationOutcome> {
        let operation = UpdateDelegate {
            mailbox: Mailbox::from(&self.owner),
            delegate_users: DelegateUsers(vec![DelegateUser {
                user_id: Some(UserId::from_address(delegate)),
                delegate_permissions: Some(DelegatePermissions::inbox(level)),
                ..Default::default()
            }]),
            deliver_meeting_requests: Some(DeliverMeetingRequests::DelegatesAndSendInformationToMe),
        };

        self.perform_write(operation, "UpdateDelegate Success")
    }

    /// Makes sure `delegate` holds Reviewer access to the owner's inbox,
    /// adding or updating it only when needed.
    pub fn ensure_reviewer(&self, delegate: &MailboxIdentity) -> Result<OperationOutcome> {
        self.ensure_level(delegate, DelegatePermissionLevel::Reviewer)
    }

    /// Makes sure `delegate` holds exactly `level` on the owner's inbox.
    ///
    /// Delegates are always added as Reviewers, so bringing an absent
    /// delegate to another level takes an add followed by an update. The
    /// update is skipped if the add fails.
    pub fn ensure_level(
        &self,
        delegate: &MailboxIdentity,
        level: DelegatePermissionLevel,
    ) -> Result<OperationOutcome> {
        let existing = self
            .list_delegates()?
            .find(|record| record.delegate.matches(delegate));

        match existing {
            None => {
                log::debug!("{delegate} is not a delegate of {}, adding it", self.owner);

                let outcome = self.add_delegate(delegate, &AddDelegateOptions::default())?;
                if !outcome.success || level == DelegatePermissionLevel::Reviewer {
                    return Ok(outcome);
                }

                self.update_delegate(delegate, level)
            }
            Some(record) if record.inbox_level == Some(level) => {
                log::debug!("{delegate} already has {level} access, nothing to do");

                Ok(OperationOutcome::success(format!("Already {level}")))
            }
            Some(record) => {
                log::debug!(
                    "{delegate} has {} access, updating to {level}",
                    record
                        .inbox_level
                        .map_or("no", |current| current.as_str())
                );

                self.update_delegate(delegate, level)
            }
        }
    }

    /// Sends a write operation and turns its response into an outcome.
    ///
    /// Failures reported by the server, including SOAP faults, make for an
    /// unsuccessful outcome rather than an error.
    fn perform_write<Op>(&self, operation: Op, success_message: &str) -> Result<OperationOutcome>
    where
        Op: Operation,
        Op::Response: Deref<Target = DelegateResponse>,
    {
        let op_name = <Op as EnvelopeBodyContents>::name();

        let response = match self.make_operation_request(operation) {
            Ok(response) => response,
            Err(Error::RequestFault(fault)) => {
                log::warn!("{op_name} resulted in a SOAP fault: {}", fault.faultstring);
                return Ok(OperationOutcome::failure(fault.response_code()));
            }
            Err(err) => return Err(err),
        };

        if !response.is_success() {
            let code = response.error_code().unwrap_or(UNKNOWN_ERROR);
            log::warn!("{op_name} failed with response code {code}");

            return Ok(OperationOutcome::failure(code));
        }

        for message in response.messages().iter().filter(|message| message.is_error()) {
            log::warn!(
                "{op_name} succeeded, but reported an error for a delegate: {}",
                message.response_code.as_deref().unwrap_or(UNKNOWN_ERROR)
            );
        }

        Ok(OperationOutcome::success(success_message))
    }

    /// Wraps an operation in an envelope, sends it and parses the response.
    fn make_operation_request<Op>(&self, operation: Op) -> Result<Op::Response>
    where
        Op: Operation,
    {
        let op_name = <Op as EnvelopeBodyContents>::name();

        let envelope = Envelope {
            headers: vec![Header::RequestServerVersion {
                version: self.server_version,
            }],
            body: operation,
        };
        let request_body = envelope.as_xml_document()?;

        let response = self.send_request(op_name, &request_body)?;

        let envelope: Envelope<Op::Response, ResponseHeader> =
            Envelope::from_xml_document(response.body.as_bytes())?;

        if let Some(version) = envelope.server_version() {
            log::debug!("{op_name} answered by Exchange {version}");
        }

        Ok(envelope.body)
    }

    /// Sends a serialized request and checks that the response is a
    /// successful XML document.
    fn send_request(&self, op_name: &'static str, request_body: &[u8]) -> Result<HttpResponse> {
        // Generate random id for logging purposes.
        let request_id = Uuid::new_v4();
        log::info!("Making operation request {request_id}: {op_name}");

        if env::var(LOG_NETWORK_PAYLOADS_ENV_VAR).is_ok() {
            log::info!("C: {}", String::from_utf8_lossy(request_body));
        }

        let response = self.transport.send(SoapRequest {
            operation: op_name,
            body: request_body,
            anchor_mailbox: Some(self.owner.as_str()),
        })?;

        log::info!(
            "Response received for request {request_id} (status {}): {op_name}",
            response.status
        );

        if env::var(LOG_NETWORK_PAYLOADS_ENV_VAR).is_ok() {
            log::info!("S: {}", response.body);
        }

        if response.status == StatusCode::UNAUTHORIZED {
            let challenges: Vec<&str> = response
                .headers
                .get_all("WWW-Authenticate")
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect();

            return Err(Error::Authentication {
                www_authenticate: (!challenges.is_empty()).then(|| challenges.join(", ")),
            });
        }

        if !response.status.is_success() {
            log::error!("Request FAILED with status {}: {op_name}", response.status);
            return Err(TransportError::Status(response.status).into());
        }

        if is_html(&response.body) {
            return Err(Error::Protocol {
                preview: response.body.chars().take(HTML_PREVIEW_LEN).collect(),
            });
        }

        Ok(response)
    }
}

/// Whether a response body is an HTML page, as served by login portals and
/// misconfigured proxies.
fn is_html(body: &str) -> bool {
    let start: String = body
        .trim_start()
        .chars()
        .take(14)
        .collect::<String>()
        .to_ascii_lowercase();

    start.starts_with("<!doctype html") || start.starts_with("<html")
}
