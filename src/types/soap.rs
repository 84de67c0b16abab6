/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};
use serde::Deserialize;

use crate::{
    server_version::{ExchangeServerVersion, ServerVersionInfo},
    types::sealed,
    xml::{self, XmlSerialize, XmlSerializeAttr},
    Error, Operation, OperationResponse, MESSAGES_NS_URI, SOAP_NS_URI, TYPES_NS_URI,
};

mod de;
use self::de::{DeserializeEnvelope, EnvelopeContent};

/// An element of the `soap:Header` section of a request.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383497>
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Header {
    /// The schema version targeted by the attached request.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/requestserverversion>
    RequestServerVersion { version: ExchangeServerVersion },
}

impl XmlSerialize for Header {
    fn serialize_child_nodes<W>(&self, writer: &mut Writer<W>) -> Result<(), xml::Error>
    where
        W: std::io::Write,
    {
        match self {
            Header::RequestServerVersion { version } => {
                let mut start = BytesStart::new("t:RequestServerVersion");
                version.serialize_as_attribute(&mut start, "Version");
                writer.write_event(Event::Empty(start))?;
            }
        }

        Ok(())
    }
}

/// An element of the `soap:Header` section of a response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResponseHeader {
    /// The version information of the Exchange Server instance that generated
    /// the attached response.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/serverversioninfo>
    ServerVersionInfo(ServerVersionInfo),
}

/// A SOAP envelope containing the body of an EWS operation or response.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383494>
///
/// Requests carry [`Header`]s and responses carry [`ResponseHeader`]s.
#[derive(Clone, Debug)]
pub struct Envelope<B, H = Header> {
    pub headers: Vec<H>,
    pub body: B,
}

impl<B> Envelope<B>
where
    B: Operation,
{
    /// Serializes the SOAP envelope as a complete XML document.
    pub fn as_xml_document(&self) -> Result<Vec<u8>, Error> {
        const SOAP_ENVELOPE: &str = "soap:Envelope";
        const SOAP_HEADER: &str = "soap:Header";
        const SOAP_BODY: &str = "soap:Body";

        let mut writer = Writer::new(Vec::new());

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml::Error::from)?;

        // Both EWS namespaces are bound here so that every element below can
        // be written with its prefix only.
        writer
            .write_event(Event::Start(BytesStart::new(SOAP_ENVELOPE).with_attributes([
                ("xmlns:soap", SOAP_NS_URI),
                ("xmlns:t", TYPES_NS_URI),
                ("xmlns:m", MESSAGES_NS_URI),
            ])))
            .map_err(xml::Error::from)?;

        writer
            .write_event(Event::Start(BytesStart::new(SOAP_HEADER)))
            .map_err(xml::Error::from)?;
        for header in &self.headers {
            header.serialize_child_nodes(&mut writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(SOAP_HEADER)))
            .map_err(xml::Error::from)?;

        writer
            .write_event(Event::Start(BytesStart::new(SOAP_BODY)))
            .map_err(xml::Error::from)?;

        let name = format!("m:{}", <B as sealed::EnvelopeBodyContents>::name());
        self.body.serialize_as_element(&mut writer, &name)?;

        writer
            .write_event(Event::End(BytesEnd::new(SOAP_BODY)))
            .map_err(xml::Error::from)?;
        writer
            .write_event(Event::End(BytesEnd::new(SOAP_ENVELOPE)))
            .map_err(xml::Error::from)?;

        Ok(writer.into_inner())
    }
}

impl<B> Envelope<B, ResponseHeader>
where
    B: OperationResponse,
{
    /// Populates an [`Envelope`] from raw XML.
    ///
    /// A SOAP fault in place of the expected body results in
    /// [`Error::RequestFault`].
    pub fn from_xml_document(document: &[u8]) -> Result<Self, Error> {
        let de = &mut quick_xml::de::Deserializer::from_reader(document);

        // `serde_path_to_error` records where in the document deserialization
        // failed.
        let envelope: DeserializeEnvelope<B> = serde_path_to_error::deserialize(de)?;

        match envelope.body {
            EnvelopeContent::Body(body) => Ok(Envelope {
                headers: envelope
                    .header
                    .map(|header| header.into_headers())
                    .unwrap_or_default(),
                body,
            }),
            EnvelopeContent::Fault(fault) => Err(Error::RequestFault(Box::new(fault))),
        }
    }

    /// The version of the server which produced this envelope, if it said.
    pub fn server_version(&self) -> Option<&ServerVersionInfo> {
        self.headers.iter().find_map(|header| match header {
            ResponseHeader::ServerVersionInfo(info) => Some(info),
        })
    }
}

/// A structured representation of a SOAP fault, indicating an error in an EWS
/// request.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383507>
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Fault {
    /// An error code indicating the fault in the original request.
    pub faultcode: String,

    /// A human-readable description of the error.
    pub faultstring: String,

    pub faultactor: Option<String>,

    /// Clarifying information about EWS-specific errors.
    pub detail: Option<FaultDetail>,
}

impl Fault {
    /// The EWS response code best describing this fault.
    ///
    /// The code from the fault details is preferred; otherwise the
    /// `faultcode` is used with its namespace prefix removed.
    pub fn response_code(&self) -> &str {
        self.detail
            .as_ref()
            .and_then(|detail| detail.response_code.as_deref())
            .unwrap_or_else(|| {
                self.faultcode
                    .rsplit_once(':')
                    .map_or(self.faultcode.as_str(), |(_, code)| code)
            })
    }
}

/// EWS-specific details regarding a SOAP fault.
///
/// This element is not documented in the EWS reference.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FaultDetail {
    /// An error code indicating the nature of the issue.
    pub response_code: Option<String>,

    /// A human-readable description of the error.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::{
        get_delegate::{GetDelegate, GetDelegateResponse},
        server_version::ExchangeServerVersion,
        Error, Mailbox, UserIds,
    };

    use super::{Envelope, Header, ResponseHeader};

    #[test]
    fn serialize_envelope_with_header() {
        let envelope = Envelope {
            headers: vec![Header::RequestServerVersion {
                version: ExchangeServerVersion::Exchange2010_SP2,
            }],
            body: GetDelegate {
                include_permissions: true,
                mailbox: Mailbox {
                    email_address: "owner@example.com".to_string(),
                },
                user_ids: UserIds::default(),
            },
        };

        let actual = envelope
            .as_xml_document()
            .expect("serialization should succeed");
        let actual = String::from_utf8(actual).expect("document should be UTF-8");

        let expected = r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types" xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"><soap:Header><t:RequestServerVersion Version="Exchange2010_SP2"/></soap:Header><soap:Body><m:GetDelegate IncludePermissions="true"><m:Mailbox><t:EmailAddress>owner@example.com</t:EmailAddress></m:Mailbox><m:UserIds/></m:GetDelegate></soap:Body></soap:Envelope>"#;

        assert_eq!(actual, expected);
    }

    #[test]
    fn deserialize_envelope_with_server_version() {
        // Body attributes and unknown headers are routinely sent by Exchange.
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header><h:ServerVersionInfo MajorVersion="15" MinorVersion="2" MajorBuildNumber="1544" MinorBuildNumber="4" Version="V2017_07_11" xmlns:h="http://schemas.microsoft.com/exchange/services/2006/types"/></s:Header><s:Body xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema"><m:GetDelegateResponse ResponseClass="Success" xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"><m:ResponseCode>NoError</m:ResponseCode></m:GetDelegateResponse></s:Body></s:Envelope>"#;

        let envelope = <Envelope<GetDelegateResponse, ResponseHeader>>::from_xml_document(
            xml.as_bytes(),
        )
        .expect("deserialization should succeed");

        assert!(envelope.body.is_success(), "response should be successful");

        let version = envelope
            .server_version()
            .expect("server version should be present");
        assert_eq!(version.major_version.as_deref(), Some("15"));
        assert_eq!(version.version.as_deref(), Some("V2017_07_11"));
    }

    #[test]
    fn deserialize_envelope_without_header() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:GetDelegateResponse ResponseClass="Success" xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"/></s:Body></s:Envelope>"#;

        let envelope = <Envelope<GetDelegateResponse, ResponseHeader>>::from_xml_document(
            xml.as_bytes(),
        )
        .expect("deserialization should succeed");

        assert!(envelope.headers.is_empty());
    }

    #[test]
    fn deserialize_envelope_with_fault() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode xmlns:a="http://schemas.microsoft.com/exchange/services/2006/types">a:ErrorInvalidServerVersion</faultcode><faultstring xml:lang="en-US">The specified server version is invalid.</faultstring><detail><e:ResponseCode xmlns:e="http://schemas.microsoft.com/exchange/services/2006/errors">ErrorInvalidServerVersion</e:ResponseCode><e:Message xmlns:e="http://schemas.microsoft.com/exchange/services/2006/errors">The specified server version is invalid.</e:Message></detail></s:Fault></s:Body></s:Envelope>"#;

        let err = <Envelope<GetDelegateResponse, ResponseHeader>>::from_xml_document(
            xml.as_bytes(),
        )
        .expect_err("should return error when body contains fault");

        if let Error::RequestFault(fault) = err {
            assert_eq!(
                fault.faultcode, "a:ErrorInvalidServerVersion",
                "fault code should match original document"
            );
            assert_eq!(
                fault.faultstring, "The specified server version is invalid.",
                "fault string should match original document"
            );
            assert!(
                fault.faultactor.is_none(),
                "fault actor should not be present"
            );
            assert_eq!(fault.response_code(), "ErrorInvalidServerVersion");

            let detail = fault.detail.expect("fault detail should be present");
            assert_eq!(
                detail.message.as_deref(),
                Some("The specified server version is invalid."),
                "error message should match original document"
            );
        } else {
            panic!("error should be request fault, got: {err:?}");
        }
    }

    #[test]
    fn fault_without_detail_uses_fault_code() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>Bad request.</faultstring></s:Fault></s:Body></s:Envelope>"#;

        let err = <Envelope<GetDelegateResponse, ResponseHeader>>::from_xml_document(
            xml.as_bytes(),
        )
        .expect_err("should return error when body contains fault");

        let Error::RequestFault(fault) = err else {
            panic!("error should be request fault, got: {err:?}");
        };
        assert_eq!(fault.response_code(), "Client");
    }

    #[test]
    fn unexpected_body_element_is_rejected() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:AddDelegateResponse ResponseClass="Success" xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"/></s:Body></s:Envelope>"#;

        let err = <Envelope<GetDelegateResponse, ResponseHeader>>::from_xml_document(
            xml.as_bytes(),
        )
        .expect_err("should reject a response for another operation");

        assert!(
            matches!(err, Error::MalformedResponse(_)),
            "error should be a deserialization error, got: {err:?}"
        );
    }

    #[test]
    fn non_xml_document_is_rejected() {
        let err = <Envelope<GetDelegateResponse, ResponseHeader>>::from_xml_document(
            b"Service Unavailable",
        )
        .expect_err("should reject a document which is not XML");

        assert!(
            matches!(err, Error::MalformedResponse(_)),
            "error should be a deserialization error, got: {err:?}"
        );
    }
}
