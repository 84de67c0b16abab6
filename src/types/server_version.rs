/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use quick_xml::events::BytesStart;
use serde::Deserialize;

use crate::xml::XmlSerializeAttr;

/// The Exchange Server version identifiers allowed in `RequestServerVersion`
/// headers.
///
/// Delegate management requires at least Exchange 2007 SP1; requests target
/// Exchange 2010 SP2 unless configured otherwise.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/requestserverversion#version-attribute-values>
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum ExchangeServerVersion {
    Exchange2007_SP1,
    Exchange2010,
    Exchange2010_SP1,
    #[default]
    Exchange2010_SP2,
    Exchange2013,
    Exchange2013_SP1,
}

impl ExchangeServerVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeServerVersion::Exchange2007_SP1 => "Exchange2007_SP1",
            ExchangeServerVersion::Exchange2010 => "Exchange2010",
            ExchangeServerVersion::Exchange2010_SP1 => "Exchange2010_SP1",
            ExchangeServerVersion::Exchange2010_SP2 => "Exchange2010_SP2",
            ExchangeServerVersion::Exchange2013 => "Exchange2013",
            ExchangeServerVersion::Exchange2013_SP1 => "Exchange2013_SP1",
        }
    }
}

impl XmlSerializeAttr for ExchangeServerVersion {
    fn serialize_as_attribute(&self, start_tag: &mut BytesStart, name: &str) {
        self.as_str().serialize_as_attribute(start_tag, name);
    }
}

/// The version information of the Exchange Server instance that generated
/// the attached response.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/serverversioninfo>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ServerVersionInfo {
    #[serde(rename = "@MajorVersion")]
    pub major_version: Option<String>,

    #[serde(rename = "@MinorVersion")]
    pub minor_version: Option<String>,

    #[serde(rename = "@MajorBuildNumber")]
    pub major_build_number: Option<String>,

    #[serde(rename = "@MinorBuildNumber")]
    pub minor_build_number: Option<String>,

    #[serde(rename = "@Version")]
    pub version: Option<String>,
}

impl std::fmt::Display for ServerVersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let part = |value: &Option<String>| value.clone().unwrap_or_else(|| "?".to_string());

        write!(
            f,
            "{}.{}.{}.{} ({})",
            part(&self.major_version),
            part(&self.minor_version),
            part(&self.major_build_number),
            part(&self.minor_build_number),
            self.version.as_deref().unwrap_or("unknown schema"),
        )
    }
}
