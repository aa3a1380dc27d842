use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{Method, Request, Response};

/// Transport for remote sample sources.
///
/// Implementors only provide [`execute`](HttpClient::execute); the body
/// download and status check are shared.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// GETs `url`, failing on non-success status codes.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let req = Request::new(Method::GET, url.parse()?);

        let resp = self.execute(req).await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Fetching {url} returned status {status}");
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
