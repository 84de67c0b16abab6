/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod common;
mod operations;

pub use common::*;
pub use operations::*;
pub mod response;
pub mod server_version;
pub mod soap;

pub mod add_delegate;
pub mod get_delegate;
pub mod update_delegate;

pub(crate) mod sealed {
    /// A trait for structures which may appear in the body of a SOAP envelope.
    pub trait EnvelopeBodyContents {
        /// Gets the name of the element enclosing the contents of this
        /// structure when represented in XML.
        fn name() -> &'static str;
    }
}
