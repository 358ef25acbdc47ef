use anyhow::Result;
use models::device::Device;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const DEVICES_PATH: &str = "/api/devices";

/// Response of a successful request.
///
/// The gateway decides what it sends back, so the body is kept as text and
/// only parsed when the caller asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Parses a `fetch_devices` body as a list of devices.
    pub fn devices(&self) -> serde_json::Result<Vec<Device>> {
        self.json()
    }
}

/// Client for the gateway's `/api/devices` resource.
///
/// Every call is a single request. Transport failures and non-success
/// statuses come back as the `reqwest::Error` that produced them, so callers
/// can `downcast_ref::<reqwest::Error>()` to inspect the status.
#[derive(Debug, Clone)]
pub struct DeviceAPI {
    client: Client,
    domain: String,
}

impl DeviceAPI {
    pub fn new(config: &crate::config::Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, config.current_domain()))
    }

    pub fn with_client(client: Client, domain: impl Into<String>) -> Self {
        let domain = domain.into().trim_end_matches('/').to_owned();
        Self { client, domain }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Any 2xx reply is returned as is, whatever its body. Use
    /// [`Reply::devices`] to read it as a device list.
    pub async fn fetch_devices(&self) -> Result<Reply> {
        let resp = self
            .send(self.client.get(format!("{}{}", self.domain, DEVICES_PATH)))
            .await?;

        reply(resp).await
    }

    pub async fn create_device(&self, data: &Device) -> Result<Reply> {
        let resp = self
            .send(
                self.client
                    .post(format!("{}{}", self.domain, DEVICES_PATH))
                    .json(data),
            )
            .await?;

        reply(resp).await
    }

    /// `id` goes into the path as given. It is not percent-encoded, so it
    /// must already be path safe.
    pub async fn update_device(&self, id: &str, data: &Device) -> Result<Reply> {
        let resp = self
            .send(
                self.client
                    .put(format!("{}{}/{}", self.domain, DEVICES_PATH, id))
                    .json(data),
            )
            .await?;

        reply(resp).await
    }

    pub async fn delete_device(&self, id: &str) -> Result<Reply> {
        let resp = self
            .send(
                self.client
                    .delete(format!("{}{}/{}", self.domain, DEVICES_PATH, id)),
            )
            .await?;

        reply(resp).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending request");

        let resp = self
            .client
            .execute(request)
            .await
            .inspect_err(|err| warn!(%method, %url, "request failed: {err}"))?
            .error_for_status()
            .inspect_err(|err| warn!(%method, %url, "request rejected: {err}"))?;

        debug!(%method, %url, status = %resp.status(), "request done");

        Ok(resp)
    }
}

async fn reply(resp: Response) -> Result<Reply> {
    let status = resp.status();
    let body = resp.text().await?;

    Ok(Reply { status, body })
}
