use async_trait::async_trait;
use serde::Deserialize;

use super::{base, get_json};
use crate::error::{JiveError, Result};
use crate::instant::answerers::{ShortUrl, Shortener};

const PROVIDER: &str = "is.gd";

/// The is.gd JSON API.
#[derive(Debug, Clone)]
pub struct IsGd {
    client: reqwest::Client,
    base_url: String,
}

impl IsGd {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base(base_url),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    #[serde(default)]
    shorturl: String,
    #[serde(default)]
    errorcode: i64,
}

#[async_trait]
impl Shortener for IsGd {
    async fn shorten(&self, url: &url::Url) -> Result<ShortUrl> {
        let created: Created = get_json(
            self.client
                .get(format!("{}/create.php", self.base_url))
                .query(&[("format", "json"), ("url", url.as_str())]),
            PROVIDER,
        )
        .await?;

        if created.errorcode != 0 || created.shorturl.is_empty() {
            return Err(JiveError::ExternalUnavailable(format!(
                "{PROVIDER} could not shorten the url (code {})",
                created.errorcode
            )));
        }
        Ok(ShortUrl {
            original: url.to_string(),
            short: created.shorturl,
            provider: PROVIDER.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn shortens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/create.php"))
            .and(query_param("format", "json"))
            .and(query_param("url", "https://www.example.com/long/path"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shorturl": "https://is.gd/abc123"})))
            .mount(&server)
            .await;

        let url = url::Url::parse("https://www.example.com/long/path").unwrap();
        let short = IsGd::new(reqwest::Client::new(), &server.uri())
            .shorten(&url)
            .await
            .unwrap();
        assert_eq!(
            short,
            ShortUrl {
                original: "https://www.example.com/long/path".into(),
                short: "https://is.gd/abc123".into(),
                provider: "is.gd".into(),
            }
        );
    }

    #[tokio::test]
    async fn error_codes_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"errorcode": 1, "errormessage": "Please specify a URL to shorten."}),
            ))
            .mount(&server)
            .await;

        let url = url::Url::parse("https://example.com/").unwrap();
        let err = IsGd::new(reqwest::Client::new(), &server.uri())
            .shorten(&url)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "external-unavailable");
    }
}
