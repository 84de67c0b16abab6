/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The messages of the NTLM HTTP handshake.
//!
//! The client opens with a negotiate (type 1) message, the server answers
//! with a 401 carrying a challenge (type 2) message in `WWW-Authenticate`,
//! and the client repeats its request with an authenticate (type 3) message.
//! All three messages must travel over the same connection.

use base64::prelude::*;
use ntlmclient::{Flags, Message, NegotiateMessage};
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};

use crate::TransportError;

const SCHEME: &str = "NTLM";

/// Builds the `Authorization` header value opening the handshake.
pub(crate) fn negotiate_header_value(workstation: &str) -> Result<String, TransportError> {
    let message = Message::Negotiate(NegotiateMessage {
        flags: Flags::NEGOTIATE_UNICODE
            | Flags::REQUEST_TARGET
            | Flags::NEGOTIATE_NTLM
            | Flags::NEGOTIATE_WORKSTATION_SUPPLIED,
        supplied_domain: String::new(),
        supplied_workstation: workstation.to_owned(),
        os_version: Default::default(),
    });

    let bytes = message
        .to_bytes()
        .map_err(|err| TransportError::Ntlm(format!("failed to encode negotiate message: {err:?}")))?;

    Ok(format!("{SCHEME} {}", BASE64_STANDARD.encode(bytes)))
}

/// Extracts the raw challenge message from the `WWW-Authenticate` headers of
/// a 401 response.
///
/// Returns `None` when the server did not send an NTLM challenge, e.g. when
/// it only offers the scheme without data because the negotiate message was
/// rejected.
pub(crate) fn challenge_from_headers(
    headers: &HeaderMap,
) -> Result<Option<Vec<u8>>, TransportError> {
    let token = headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.trim().split_once(' '))
        .find(|(scheme, token)| scheme.eq_ignore_ascii_case(SCHEME) && !token.trim().is_empty())
        .map(|(_, token)| token.trim());

    token
        .map(|token| {
            BASE64_STANDARD
                .decode(token)
                .map_err(|err| TransportError::Ntlm(format!("malformed challenge: {err}")))
        })
        .transpose()
}

/// Builds the `Authorization` header value answering the server's
/// challenge with an NTLMv2 response.
pub(crate) fn authenticate_header_value(
    challenge: &[u8],
    domain: &str,
    username: &str,
    password: &str,
    workstation: &str,
) -> Result<String, TransportError> {
    let challenge = match Message::try_from(challenge) {
        Ok(Message::Challenge(challenge)) => challenge,
        Ok(other) => {
            return Err(TransportError::Ntlm(format!(
                "expected challenge message, got {other:?}"
            )))
        }
        Err(err) => {
            return Err(TransportError::Ntlm(format!(
                "failed to decode challenge message: {err:?}"
            )))
        }
    };

    let target_info: Vec<u8> = challenge
        .target_information
        .iter()
        .flat_map(|entry| entry.to_bytes())
        .collect();

    let credentials = ntlmclient::Credentials {
        username: username.to_owned(),
        password: password.to_owned(),
        domain: domain.to_owned(),
    };

    let response = ntlmclient::respond_challenge_ntlm_v2(
        challenge.challenge,
        &target_info,
        ntlmclient::get_ntlm_time(),
        &credentials,
    );

    let message = response.to_message(
        &credentials,
        workstation,
        Flags::NEGOTIATE_UNICODE | Flags::NEGOTIATE_NTLM,
    );

    let bytes = message.to_bytes().map_err(|err| {
        TransportError::Ntlm(format!("failed to encode authenticate message: {err:?}"))
    })?;

    Ok(format!("{SCHEME} {}", BASE64_STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue, WWW_AUTHENTICATE};

    use super::{challenge_from_headers, negotiate_header_value};

    #[test]
    fn negotiate_message_has_ntlm_signature() {
        let value = negotiate_header_value("WORKSTATION").expect("encoding should succeed");

        // "NTLMSSP\0" followed by message type 1.
        assert!(
            value.starts_with("NTLM TlRMTVNTUAABAAAA"),
            "unexpected negotiate header: {value}"
        );
    }

    #[test]
    fn challenge_is_found_among_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("Negotiate"));
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("NTLM AQID"));

        let challenge = challenge_from_headers(&headers).expect("challenge should decode");

        assert_eq!(challenge, Some(vec![1, 2, 3]));
    }

    #[test]
    fn bare_scheme_is_not_a_challenge() {
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("NTLM"));

        assert_eq!(
            challenge_from_headers(&headers).expect("no challenge is not an error"),
            None
        );
    }

    #[test]
    fn malformed_challenge_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("NTLM !!!"));

        assert!(challenge_from_headers(&headers).is_err());
    }
}
