use super::{DecodedEntity, Transport};
use crate::error::{ClientError, TransportFault};
use crate::spi::{RequestBody, TransportConfig};
use crate::template::plain_string;
use http::header::CONTENT_TYPE;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Default transport: a blocking `reqwest` client with timeouts from the
/// transport-config provider. One instance per client, reused across calls.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Construction fault when the underlying client cannot be built.
    pub fn new(config: &dyn TransportConfig) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|err| {
                ClientError::construction(format!("failed to build http transport: {err}"))
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        url: &str,
        method: &Method,
        headers: &BTreeMap<String, String>,
        body: &RequestBody,
    ) -> Result<DecodedEntity, ClientError> {
        let mut request = self.client.request(method.clone(), url);
        for (name, value) in headers {
            // The multipart writer owns the content type; it must carry the
            // generated boundary.
            if matches!(body, RequestBody::Multipart(_))
                && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
            {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }
        request = match body {
            RequestBody::None => request,
            RequestBody::Json(text) | RequestBody::Form(text) => request.body(text.clone()),
            RequestBody::Multipart(map) => {
                let mut form = reqwest::blocking::multipart::Form::new();
                for (key, value) in map {
                    form = form.text(key.clone(), plain_string(value));
                }
                request.multipart(form)
            }
            RequestBody::Raw(map) => match serde_json::to_string(map) {
                Ok(text) => request.body(text),
                Err(err) => {
                    error!(error = %err, "raw body map not serializable, sending empty body");
                    request
                }
            },
        };

        let response = request.send().map_err(|err| {
            ClientError::Transport(TransportFault::network(url, method.clone(), err.into()))
        })?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|err| {
            ClientError::Transport(TransportFault::network(url, method.clone(), err.into()))
        })?;

        if !(200..300).contains(&status) {
            return Err(ClientError::Transport(TransportFault::status(
                url,
                method.clone(),
                status,
                Some(text),
            )));
        }

        debug!(url, status, body_len = text.len(), "transport call succeeded");
        if text.trim().is_empty() {
            return Ok(DecodedEntity { status, body: None });
        }
        let body = serde_json::from_str::<Value>(&text).map_err(|source| ClientError::Decode {
            message: format!("response from {url} is not valid json"),
            source,
        })?;
        Ok(DecodedEntity {
            status,
            body: Some(body),
        })
    }
}
