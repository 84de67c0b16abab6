/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;

use base64::prelude::*;

/// The credentials to use when authenticating against a server.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// The username and password to use for Basic authentication.
    Basic { username: String, password: String },

    /// The account to use for NTLMv2 challenge-response authentication.
    ///
    /// `domain` is empty when the user logs in with a user principal name
    /// (e.g. `user@example.com`).
    Ntlm {
        domain: String,
        username: String,
        password: String,
    },
}

impl Credentials {
    /// Creates NTLM credentials from a login in either the down-level
    /// (`DOMAIN\user`) or the user principal name (`user@example.com`) form.
    pub fn ntlm(login: &str, password: &str) -> Self {
        let (domain, username) = match login.split_once('\\') {
            Some((domain, username)) => (domain.to_owned(), username.to_owned()),
            None => (String::new(), login.to_owned()),
        };

        Self::Ntlm {
            domain,
            username,
            password: password.to_owned(),
        }
    }

    pub fn basic(username: &str, password: &str) -> Self {
        Self::Basic {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    /// The login used to authenticate, as it would be typed by the user.
    pub fn login(&self) -> String {
        match self {
            Self::Basic { username, .. } => username.clone(),
            Self::Ntlm {
                domain, username, ..
            } if !domain.is_empty() => format!("{domain}\\{username}"),
            Self::Ntlm { username, .. } => username.clone(),
        }
    }

    /// Formats Basic credentials to be used as the value of an HTTP
    /// Authorization header.
    ///
    /// Returns `None` for credentials negotiated through a handshake.
    pub fn basic_auth_header_value(&self) -> Option<String> {
        match self {
            Self::Basic { username, password } => {
                // Format credentials per the "Basic" authentication scheme. See
                // https://datatracker.ietf.org/doc/html/rfc7617 for details.
                let auth_string = BASE64_STANDARD.encode(format!("{username}:{password}"));

                Some(format!("Basic {auth_string}"))
            }
            Self::Ntlm { .. } => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Ntlm {
                domain, username, ..
            } => f
                .debug_struct("Ntlm")
                .field("domain", domain)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Credentials;

    #[test]
    fn ntlm_login_with_domain() {
        let credentials = Credentials::ntlm("CORP\\jdoe", "hunter2");

        assert_eq!(
            credentials,
            Credentials::Ntlm {
                domain: "CORP".to_string(),
                username: "jdoe".to_string(),
                password: "hunter2".to_string(),
            }
        );
        assert_eq!(credentials.login(), "CORP\\jdoe");
    }

    #[test]
    fn ntlm_login_with_user_principal_name() {
        let credentials = Credentials::ntlm("jdoe@example.com", "hunter2");

        let Credentials::Ntlm {
            domain, username, ..
        } = &credentials
        else {
            panic!("credentials should be NTLM, got {credentials:?}");
        };
        assert!(domain.is_empty(), "domain should be empty for a UPN");
        assert_eq!(username, "jdoe@example.com");
    }

    #[test]
    fn basic_header_value() {
        let credentials = Credentials::basic("Aladdin", "open sesame");

        assert_eq!(
            credentials.basic_auth_header_value().as_deref(),
            Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
        );
        assert_eq!(Credentials::ntlm("a", "b").basic_auth_header_value(), None);
    }

    #[test]
    fn debug_output_redacts_password() {
        let output = format!("{:?}", Credentials::ntlm("CORP\\jdoe", "hunter2"));

        assert!(output.contains("jdoe"));
        assert!(!output.contains("hunter2"), "password leaked: {output}");
    }
}
