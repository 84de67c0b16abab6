/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Delivery of SOAP documents to an EWS endpoint.
//!
//! The [`DelegationReconciler`](crate::DelegationReconciler) only ever talks
//! to the server through the [`Transport`] trait, so that the HTTP stack (and
//! its authentication handshake) can be swapped for an in-memory
//! implementation.

mod http;

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::TransportError;

pub use self::http::HttpTransport;

/// A serialized SOAP request, ready to be posted.
#[derive(Clone, Copy, Debug)]
pub struct SoapRequest<'a> {
    /// The name of the EWS operation carried by the request, e.g.
    /// `GetDelegate`.
    pub operation: &'static str,

    /// The complete XML document.
    pub body: &'a [u8],

    /// The mailbox used by Exchange to route the request to the right
    /// backend, sent as `X-AnchorMailbox`.
    pub anchor_mailbox: Option<&'a str>,
}

/// A means of sending SOAP requests and getting back the server's response.
///
/// Implementations return any HTTP response they receive, whatever its
/// status; interpreting the status is left to the caller. Errors are reserved
/// for failures to complete the exchange at all.
pub trait Transport {
    fn send(&self, request: SoapRequest<'_>) -> Result<HttpResponse, TransportError>;
}

impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    fn send(&self, request: SoapRequest<'_>) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// The status code of an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);

    /// Check if status is within 200-299.
    pub fn is_success(&self) -> bool {
        300 > self.0 && self.0 >= 200
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An HTTP response resulting from a previous request.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode(status),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header to the response. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }

        self
    }
}
