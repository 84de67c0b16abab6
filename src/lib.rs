/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Management of Exchange inbox delegation through Exchange Web Services.
//!
//! This crate implements the delegate-permission surface of EWS
//! (`GetDelegate`, `AddDelegate` and `UpdateDelegate`) on top of a pluggable
//! [`Transport`], and exposes it through a [`DelegationReconciler`] which can
//! list an owner's delegates, grant or change inbox access, and converge a
//! delegate towards a desired inbox permission level.
//!
//! ```no_run
//! use ews_delegation::{Config, DelegationReconciler, MailboxIdentity};
//!
//! # fn run() -> ews_delegation::Result<()> {
//! let config = Config::from_file("delegation.toml")?;
//! let reconciler = DelegationReconciler::from_config(&config)?;
//!
//! for record in reconciler.list_delegates()? {
//!     println!("{}: {:?}", record.delegate, record.inbox_level);
//! }
//!
//! let delegate: MailboxIdentity = "assistant@example.com".parse()?;
//! let outcome = reconciler.ensure_reviewer(&delegate)?;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

pub mod authentication;
pub mod config;
mod error;
pub mod reconciler;
pub mod transport;
mod types;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use config::{AuthScheme, Config};
pub use error::{Error, Result, TransportError};
pub use reconciler::{
    AddDelegateOptions, DelegateRecord, Delegates, DelegationReconciler, OperationOutcome,
};
pub use transport::{HttpResponse, SoapRequest, StatusCode, Transport};
pub use types::*;
