use crate::config::Project;
use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct ImportResponse {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    status: Option<u16>,
    error: Option<String>,
}

/// Client for the Loco REST API of a single project.
pub struct LocoClient {
    client: Client,
    host: Url,
}

impl LocoClient {
    pub fn new(project: &Project) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Loco {}", project.token))
                .map_err(|_| anyhow!("API token of project {} is not a valid header", project.name))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("localise/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let host = Url::parse(&project.host)
            .map_err(|e| anyhow!("Invalid API host {} for project {}: {}", project.host, project.name, e))?;
        if host.cannot_be_a_base() {
            return Err(anyhow!("Invalid API host {} for project {}", project.host, project.name));
        }

        Ok(LocoClient { client, host })
    }

    /// `host` joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Invalid API host {}", self.host))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Uploads one file's content as `locale` in the given format.
    pub async fn import(
        &self,
        format: &str,
        locale: &str,
        content: Vec<u8>,
    ) -> Result<ImportResponse> {
        let url = self.endpoint(&["api", "import", format])?;

        tracing::info!("Uploading {} bytes for locale {} to {}", content.len(), locale, url);

        let response = match self
            .client
            .post(url.clone())
            .query(&[("locale", locale)])
            .body(content)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Failed to send request to [{}]: {}", url, e);
                return Err(anyhow!("Failed to send request to {}: {}", url, e));
            }
        };

        let body = read_body(&url, response).await?;
        let response: ImportResponse =
            serde_json::from_slice(&body).unwrap_or(ImportResponse { message: None });

        if let Some(message) = &response.message {
            tracing::debug!("Import response: {}", message);
        }

        Ok(response)
    }

    /// Downloads the translations of `locale` rendered in the given format.
    /// The body is returned untouched, exports are not always UTF-8 text.
    pub async fn export(&self, locale: &str, format: &str) -> Result<Vec<u8>> {
        let file_name = format!("{}.{}", locale, format);
        let url = self.endpoint(&["api", "export", "locale", &file_name])?;

        tracing::info!("Downloading translation from: {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Failed to send request to [{}]: {}", url, e);
                return Err(anyhow!("Failed to send request to {}: {}", url, e));
            }
        };

        read_body(&url, response).await
    }
}

async fn read_body(url: &Url, response: Response) -> Result<Vec<u8>> {
    let status = response.status();
    let body = match response.bytes().await {
        Ok(b) => b.to_vec(),
        Err(e) => {
            tracing::error!("Failed to read response from [{}]: {}", url, e);
            return Err(anyhow!("Failed to read response from {}: {}", url, e));
        }
    };

    tracing::debug!("Response status: {}, {} bytes", status, body.len());

    if !status.is_success() {
        let reason = serde_json::from_slice::<ErrorResponse>(&body)
            .ok()
            .and_then(|error_response| {
                tracing::error!(
                    "API request failed [{}]: status={}, code={}",
                    url,
                    status,
                    error_response
                        .status
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                error_response.error
            });

        return Err(match reason {
            Some(reason) => anyhow!("{} ({})", reason, status),
            None => anyhow!("Request to {} failed with status {}", url, status),
        });
    }

    Ok(body)
}
