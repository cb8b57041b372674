//! Built-in HTTP clients for the answer backends that need no account
//! beyond an API key.

mod iex;
mod isgd;
mod openweathermap;

pub use iex::Iex;
pub use isgd::IsGd;
pub use openweathermap::OpenWeatherMap;

use jive_search::SearchError;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Send `request` and decode a JSON body, naming `provider` in any error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest(&format!("{provider} request failed"), e))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{provider} HTTP error: {e}")))?;

    let body = response
        .json::<T>()
        .await
        .map_err(|e| SearchError::Parse(format!("{provider} response: {e}")))?;
    Ok(body)
}

/// Trim a configured base URL so paths can be appended with `/`.
pub(crate) fn base(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}
