/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Error values for delegation operations.
//!
//! Faults raised by the transport, authentication and parsing layers are
//! represented as [`enum@Error`] variants. Business-level failures reported
//! by Exchange for write operations (e.g. a delegate that already exists) are
//! not errors: they are returned as an unsuccessful
//! [`OperationOutcome`](crate::OperationOutcome).

use thiserror::Error;

use crate::{soap::Fault, StatusCode};

/// Error types for delegation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The server rejected the owner's credentials (HTTP 401).
    #[error("401 Unauthorized. WWW-Authenticate: {}", www_authenticate.as_deref().unwrap_or("None"))]
    Authentication { www_authenticate: Option<String> },

    /// The server answered with an HTML page instead of a SOAP document,
    /// which usually points at a wrong EWS URL or an authentication redirect.
    #[error(
        "received HTML response instead of XML, check the EWS URL and credentials. First 100 chars: {preview}"
    )]
    Protocol { preview: String },

    #[error("an error occurred during HTTP transport: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to deserialize response from XML")]
    MalformedResponse(#[from] serde_path_to_error::Error<quick_xml::DeError>),

    #[error("request resulted in a SOAP fault: {}", .0.faultstring)]
    RequestFault(Box<Fault>),

    /// A read operation was answered with an error response class.
    #[error("{operation} failed with response code {code}: {}", message.as_deref().unwrap_or(""))]
    Response {
        operation: &'static str,
        code: String,
        message: Option<String>,
    },

    #[error("failed to serialize request as XML")]
    Serialize(#[from] crate::xml::Error),

    #[error("invalid mailbox address: {0:?}")]
    InvalidAddress(String),

    #[error("unknown inbox permission level: {0:?}")]
    UnknownPermissionLevel(String),

    #[error("invalid EWS endpoint URL")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse configuration file")]
    ConfigFile(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the HTTP exchange itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server responded with a client or server error status other than
    /// 401.
    #[error("HTTP error ({0})")]
    Status(StatusCode),

    /// The request could not be sent or its response could not be read,
    /// including timeouts and TLS failures.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("NTLM negotiation failed: {0}")]
    Ntlm(String),

    /// A failure reported by a non-HTTP transport implementation.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error originates from the transport layer, as opposed to
    /// the content of a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// A result which error type is always an [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
