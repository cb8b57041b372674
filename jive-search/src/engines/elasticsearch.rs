//! Image search against an Elasticsearch index.
//!
//! Records are matched on their `alt` text. The NSFW cut happens inside
//! the query (`lt` the threshold when safe, `gte` otherwise), and
//! [`crate::pipeline::images`] filters once more on the way out.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::engine::ImageEngine;
use crate::error::SearchError;
use crate::http;
use crate::types::{Image, ImageResults};

/// Client for one image index.
#[derive(Debug, Clone)]
pub struct ElasticsearchImages {
    client: reqwest::Client,
    url: String,
    index: String,
    nsfw_threshold: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    total: Total,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Older clusters report a bare number, newer ones `{"value": n}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Total {
    Count(u64),
    Object { value: u64 },
}

impl Default for Total {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl Total {
    fn value(&self) -> u64 {
        match self {
            Self::Count(n) | Self::Object { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

impl ElasticsearchImages {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig, url: &str, index: &str) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            url: url.trim_end_matches('/').to_owned(),
            index: index.to_owned(),
            nsfw_threshold: config.nsfw_threshold,
        })
    }

    fn query_body(&self, query: &str, safe: bool, number: usize, offset: usize) -> Value {
        let range = if safe {
            json!({ "lt": self.nsfw_threshold })
        } else {
            json!({ "gte": self.nsfw_threshold })
        };

        json!({
            "query": {
                "function_score": {
                    "query": {
                        "bool": {
                            "should": [
                                { "multi_match": { "query": query, "fields": ["alt"] } }
                            ],
                            "must": [
                                { "range": { "nsfw_score": range } }
                            ]
                        }
                    },
                    "field_value_factor": {
                        "field": format!("classification.{query}"),
                        "modifier": "log1p",
                        "missing": 0.0,
                        "factor": 2
                    },
                    "boost_mode": "sum"
                }
            },
            "from": offset,
            "size": number
        })
    }
}

fn decode_hits(body: SearchResponse) -> Result<ImageResults, SearchError> {
    let count = body.hits.total.value();
    let mut images = Vec::with_capacity(body.hits.hits.len());
    for hit in body.hits.hits {
        let mut source = match hit.source {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(SearchError::Parse(format!(
                    "image {} has a non-object _source: {other}",
                    hit.id
                )))
            }
        };
        source.insert("id".into(), Value::String(hit.id));
        let image: Image = serde_json::from_value(Value::Object(source))
            .map_err(|e| SearchError::Parse(format!("image record: {e}")))?;
        images.push(image);
    }

    Ok(ImageResults {
        count,
        images,
        ..Default::default()
    })
}

#[async_trait]
impl ImageEngine for ElasticsearchImages {
    async fn fetch(
        &self,
        query: &str,
        safe: bool,
        number: usize,
        offset: usize,
    ) -> Result<ImageResults, SearchError> {
        tracing::trace!(query, safe, offset, "image search");

        let body: SearchResponse = self
            .client
            .post(format!("{}/{}/_search", self.url, self.index))
            .json(&self.query_body(query, safe, number, offset))
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("image index request failed", e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("image index HTTP error: {e}")))?
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("image index response: {e}")))?;

        let results = decode_hits(body)?;
        tracing::debug!(count = results.count, returned = results.images.len(), "image index answered");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "elasticsearch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(url: &str) -> ElasticsearchImages {
        ElasticsearchImages::new(&SearchConfig::default(), url, "images").expect("engine")
    }

    #[test]
    fn safe_query_uses_lt_threshold() {
        let body = engine("http://localhost:9200").query_body("cats", true, 100, 200);
        let range = &body["query"]["function_score"]["query"]["bool"]["must"][0]["range"]["nsfw_score"];
        assert_eq!(range["lt"], 0.8);
        assert!(range.get("gte").is_none());
        assert_eq!(body["from"], 200);
        assert_eq!(body["size"], 100);
    }

    #[test]
    fn unsafe_query_uses_gte_threshold() {
        let body = engine("http://localhost:9200").query_body("cats", false, 100, 0);
        let range = &body["query"]["function_score"]["query"]["bool"]["must"][0]["range"]["nsfw_score"];
        assert_eq!(range["gte"], 0.8);
    }

    #[test]
    fn query_text_is_escaped() {
        let body = engine("http://localhost:9200").query_body("a \"quoted\" term", true, 10, 0);
        let mm = &body["query"]["function_score"]["query"]["bool"]["should"][0]["multi_match"];
        assert_eq!(mm["query"], "a \"quoted\" term");
    }

    #[test]
    fn decode_accepts_both_total_shapes() {
        let old: SearchResponse =
            serde_json::from_value(json!({"hits": {"total": 7, "hits": []}})).expect("old");
        let new: SearchResponse =
            serde_json::from_value(json!({"hits": {"total": {"value": 9}, "hits": []}})).expect("new");
        assert_eq!(decode_hits(old).expect("decode").count, 7);
        assert_eq!(decode_hits(new).expect("decode").count, 9);
    }

    #[tokio::test]
    async fn fetch_reads_hits_and_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {
                    "total": {"value": 2},
                    "hits": [
                        {"_id": "https://a.com/1.jpg", "_source": {"domain": "a.com", "alt": "cat", "nsfw_score": 0.1, "width": 640, "height": 480}},
                        {"_id": "https://b.com/2.png", "_source": {"domain": "b.com", "nsfw_score": 0.3}}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let results = engine(&server.uri()).fetch("cat", true, 100, 0).await.expect("fetch");
        assert_eq!(results.count, 2);
        assert_eq!(results.images[0].url, "https://a.com/1.jpg");
        assert_eq!(results.images[0].width, 640);
        assert_eq!(results.images[1].domain, "b.com");
    }

    #[tokio::test]
    async fn fetch_maps_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let err = engine(&server.uri()).fetch("cat", true, 100, 0).await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
    }
}
