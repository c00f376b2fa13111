use crate::{ErrorKind, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

/// Sends the request once and decodes a JSON body.
///
/// Client errors (4xx) are fatal `BadRequest`s; nothing is retried.
pub(crate) async fn query_api_raw<Response>(request: RequestBuilder) -> Result<Response>
where
    Response: DeserializeOwned,
{
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    if status.is_client_error() {
        Err(ErrorKind::BadRequest(status.as_u16(), body).into())
    } else {
        Err(ErrorKind::UnexpectedStatus(status.as_u16(), body).into())
    }
}
