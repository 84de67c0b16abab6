/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{cell::RefCell, collections::VecDeque};

use quick_xml::{de::Deserializer, Writer};
use serde::Deserialize;

use crate::{xml::XmlSerialize, HttpResponse, SoapRequest, Transport, TransportError};

/// Assert the expected result of XML serialization.
pub fn assert_serialized_content<T: XmlSerialize>(
    data: &T,
    root_tag_name: &str,
    expected_xml_content: &str,
) {
    let mut writer = Writer::new(Vec::new());
    data.serialize_as_element(&mut writer, root_tag_name)
        .unwrap();

    let buf = writer.into_inner();
    let actual_xml_content = std::str::from_utf8(buf.as_slice()).unwrap();

    assert_eq!(actual_xml_content, expected_xml_content);
}

/// Assert the expected result of XML deserialization.
pub fn assert_deserialized_content<T>(content: &str, expected: T)
where
    T: for<'a> Deserialize<'a> + Eq + std::fmt::Debug,
{
    let mut deserializer = Deserializer::from_reader(content.as_bytes());
    let deserialized_data: T = serde_path_to_error::deserialize(&mut deserializer).unwrap();
    assert_eq!(deserialized_data, expected);
}

/// Wraps the body of a response in a SOAP envelope, as sent by Exchange.
pub fn soap_envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header><h:ServerVersionInfo MajorVersion="15" MinorVersion="1" MajorBuildNumber="2507" MinorBuildNumber="6" Version="V2017_07_11" xmlns:h="http://schemas.microsoft.com/exchange/services/2006/types"/></s:Header><s:Body xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">{body}</s:Body></s:Envelope>"#
    )
}

/// A request captured by a [`MockTransport`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub operation: &'static str,
    pub body: String,
    pub anchor_mailbox: Option<String>,
}

/// A [`Transport`] replaying canned responses in order and recording the
/// requests it receives.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a 200 response with the given body wrapped in an envelope.
    pub fn respond_with(self, body: &str) -> Self {
        self.respond(HttpResponse::new(200, soap_envelope(body)))
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.responses.borrow_mut().push_back(Ok(response));
        self
    }

    pub fn fail_with(self, err: TransportError) -> Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// The operations sent so far, in order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.requests
            .borrow()
            .iter()
            .map(|request| request.operation)
            .collect()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: SoapRequest<'_>) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            operation: request.operation,
            body: String::from_utf8_lossy(request.body).into_owned(),
            anchor_mailbox: request.anchor_mailbox.map(str::to_owned),
        });

        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(TransportError::Other(format!(
                "no response queued for {}",
                request.operation
            )))
        })
    }
}
