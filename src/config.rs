/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Connection settings for an owner's mailbox.
//!
//! Settings are usually read from a TOML file:
//!
//! ```toml
//! endpoint = "https://mail.example.com/EWS/Exchange.asmx"
//! owner = "owner@example.com"
//! username = "CORP\\owner"
//! password = "..."
//! verify_tls = true
//! timeout_secs = 60
//! auth = "ntlm"
//! ```

use std::{fmt, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::{
    authentication::Credentials, server_version::ExchangeServerVersion, Error, MailboxIdentity,
    Result,
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// The authentication scheme used against the EWS endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    #[default]
    Ntlm,
    Basic,
}

impl std::str::FromStr for AuthScheme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ntlm" => Ok(AuthScheme::Ntlm),
            "basic" => Ok(AuthScheme::Basic),
            _ => Err(Error::Config(format!("unknown authentication scheme {value:?}"))),
        }
    }
}

/// Settings needed to manage the delegates of one mailbox.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The URL of the EWS endpoint, e.g.
    /// `https://mail.example.com/EWS/Exchange.asmx`.
    pub endpoint: String,

    /// The address of the mailbox whose delegates are managed.
    pub owner: String,

    /// The login of the owner, either `DOMAIN\user` or a user principal name.
    pub username: String,

    pub password: String,

    /// Whether the server's TLS certificate is verified.
    pub verify_tls: bool,

    /// The timeout applied to each HTTP request.
    pub timeout_secs: u64,

    pub auth: AuthScheme,

    /// The schema version requested from the server.
    pub server_version: ExchangeServerVersion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            owner: String::new(),
            username: String::new(),
            password: String::new(),
            verify_tls: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth: AuthScheme::default(),
            server_version: ExchangeServerVersion::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from a TOML file. Missing keys take their
    /// default value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        Ok(toml::from_str(&contents)?)
    }

    /// The names of the required settings which are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("endpoint", &self.endpoint),
            ("owner", &self.owner),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Checks that every required setting is present and well-formed.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        self.endpoint_url()?;
        self.owner_identity()?;

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }

        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(self.endpoint.trim())?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::Config(format!(
                "unsupported endpoint scheme {scheme:?}"
            ))),
        }
    }

    pub fn owner_identity(&self) -> Result<MailboxIdentity> {
        self.owner.parse()
    }

    pub fn credentials(&self) -> Credentials {
        match self.auth {
            AuthScheme::Ntlm => Credentials::ntlm(&self.username, &self.password),
            AuthScheme::Basic => Credentials::basic(&self.username, &self.password),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("owner", &self.owner)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("timeout_secs", &self.timeout_secs)
            .field("auth", &self.auth)
            .field("server_version", &self.server_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Config {
        Config {
            endpoint: "https://mail.example.com/EWS/Exchange.asmx".to_string(),
            owner: "owner@example.com".to_string(),
            username: "CORP\\owner".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parse_full_file() {
        let config: Config = toml::from_str(
            r#"
            endpoint = "https://mail.example.com/EWS/Exchange.asmx"
            owner = "owner@example.com"
            username = "owner@example.com"
            password = "secret"
            verify_tls = false
            timeout_secs = 15
            auth = "basic"
            server_version = "Exchange2013_SP1"
            "#,
        )
        .expect("configuration should parse");

        assert!(!config.verify_tls);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.auth, AuthScheme::Basic);
        assert_eq!(config.server_version, ExchangeServerVersion::Exchange2013_SP1);
        assert_eq!(
            config.credentials(),
            Credentials::basic("owner@example.com", "secret")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_apply_to_missing_keys() {
        let config: Config = toml::from_str(r#"owner = "owner@example.com""#)
            .expect("configuration should parse");

        assert!(config.verify_tls, "TLS should be verified by default");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.auth, AuthScheme::Ntlm);
        assert_eq!(config.server_version, ExchangeServerVersion::Exchange2010_SP2);
        assert_eq!(
            config.missing_fields(),
            vec!["endpoint", "username", "password"]
        );
    }

    #[test]
    fn validate_names_missing_fields() {
        let config = Config {
            password: "  ".to_string(),
            ..complete()
        };

        let err = config.validate().expect_err("blank password should be rejected");
        assert!(
            err.to_string().contains("password"),
            "error should name the missing field: {err}"
        );
    }

    #[test]
    fn validate_rejects_malformed_values() {
        let bad_scheme = Config {
            endpoint: "ftp://mail.example.com/EWS/Exchange.asmx".to_string(),
            ..complete()
        };
        assert!(bad_scheme.validate().is_err());

        let bad_owner = Config {
            owner: "owner".to_string(),
            ..complete()
        };
        assert!(matches!(bad_owner.validate(), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn debug_output_redacts_password() {
        let output = format!("{:?}", complete());

        assert!(!output.contains("secret"), "password leaked: {output}");
    }

    #[test]
    fn auth_scheme_parses_case_insensitively() {
        assert_eq!("NTLM".parse::<AuthScheme>().unwrap(), AuthScheme::Ntlm);
        assert_eq!("Basic".parse::<AuthScheme>().unwrap(), AuthScheme::Basic);
        assert!("kerberos".parse::<AuthScheme>().is_err());
    }
}
