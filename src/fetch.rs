use log::{debug, info};

use crate::error::Result;

/// GET `url` once and return the whole body as text.
///
/// The status code is not checked; an error page is returned like any other
/// body. System proxy settings are ignored.
pub async fn fetch_script(url: &str) -> Result<String> {
    let client = reqwest::Client::builder().no_proxy().build()?;

    info!("Fetching {}", url);
    let response = client.get(url).send().await?;
    debug!("{} answered {}", url, response.status());

    let body = response.text().await?;
    debug!("Received {} bytes", body.len());
    Ok(body)
}
