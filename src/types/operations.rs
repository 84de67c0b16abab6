/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use serde::de::DeserializeOwned;

use crate::{types::sealed, xml::XmlSerialize};

/// A marker trait for EWS operations.
///
/// Types implementing this trait may appear in requests to EWS as the operation
/// to be performed.
pub trait Operation: XmlSerialize + sealed::EnvelopeBodyContents + std::fmt::Debug {
    /// The structure returned by EWS in response to requests containing this
    /// operation.
    type Response: OperationResponse;
}

/// A marker trait for EWS operation responses.
///
/// Types implementing this trait may appear in responses from EWS after
/// requesting an operation be performed.
pub trait OperationResponse:
    DeserializeOwned + sealed::EnvelopeBodyContents + std::fmt::Debug
{
}
