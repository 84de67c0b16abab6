/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use reqwest::{
    blocking::{Client, Response},
    header::{AUTHORIZATION, CONTENT_TYPE},
    redirect::Policy,
};
use url::Url;

use crate::{
    authentication::{ntlm, Credentials},
    HttpResponse, SoapRequest, StatusCode, Transport, TransportError,
};

/// A [`Transport`] posting requests to an EWS endpoint over HTTPS, with
/// either NTLM or Basic authentication.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
    workstation: String,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint.
    ///
    /// Redirects are not followed, as EWS answers authentication failures
    /// for misconfigured endpoints with redirects to HTML login pages.
    pub fn new(
        endpoint: Url,
        credentials: Credentials,
        verify_tls: bool,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        if !verify_tls {
            log::warn!("TLS certificate verification is disabled for {endpoint}");
        }

        // NTLM authenticates a connection rather than a request, so the
        // handshake must reuse the connection it started on.
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .pool_max_idle_per_host(1)
            .build()?;

        let workstation = gethostname::gethostname()
            .to_string_lossy()
            .to_uppercase();

        Ok(Self {
            client,
            endpoint,
            credentials,
            workstation,
        })
    }

    fn post(
        &self,
        request: &SoapRequest<'_>,
        authorization: Option<&str>,
    ) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(request.body.to_vec());

        if let Some(anchor_mailbox) = request.anchor_mailbox {
            builder = builder.header("X-AnchorMailbox", anchor_mailbox);
        }

        if let Some(authorization) = authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        Ok(builder.send()?)
    }

    fn send_ntlm(
        &self,
        request: &SoapRequest<'_>,
        domain: &str,
        username: &str,
        password: &str,
    ) -> Result<HttpResponse, TransportError> {
        let negotiate = ntlm::negotiate_header_value(&self.workstation)?;
        let response = self.post(request, Some(&negotiate))?;

        if response.status().as_u16() != StatusCode::UNAUTHORIZED.0 {
            return read_response(response);
        }

        let Some(challenge) = ntlm::challenge_from_headers(response.headers())? else {
            log::debug!("server did not answer the NTLM negotiation with a challenge");
            return read_response(response);
        };

        // The body of the challenge response must be consumed for the
        // connection to be reused.
        let _ = response.bytes()?;

        let authenticate = ntlm::authenticate_header_value(
            &challenge,
            domain,
            username,
            password,
            &self.workstation,
        )?;

        read_response(self.post(request, Some(&authenticate))?)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: SoapRequest<'_>) -> Result<HttpResponse, TransportError> {
        match &self.credentials {
            Credentials::Basic { .. } => {
                let authorization = self.credentials.basic_auth_header_value();
                read_response(self.post(&request, authorization.as_deref())?)
            }
            Credentials::Ntlm {
                domain,
                username,
                password,
            } => self.send_ntlm(&request, domain, username, password),
        }
    }
}

fn read_response(response: Response) -> Result<HttpResponse, TransportError> {
    let status = StatusCode(response.status().as_u16());
    let headers = response.headers().clone();
    let body = response.text()?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
