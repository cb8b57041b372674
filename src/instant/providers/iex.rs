//! IEX batch quotes: the latest trade plus five years of daily bars.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use jive_search::SearchError;
use serde::Deserialize;

use super::{base, get_json};
use crate::error::Result;
use crate::instant::answerers::stock::{Eod, Exchange, Last, Quote, StockFetcher};

const PROVIDER: &str = "IEX";

#[derive(Debug, Clone)]
pub struct Iex {
    client: reqwest::Client,
    base_url: String,
}

impl Iex {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base(base_url),
        }
    }
}

#[async_trait]
impl StockFetcher for Iex {
    async fn fetch(&self, ticker: &str) -> Result<Quote> {
        let batch: IexBatch = get_json(
            self.client
                .get(format!("{}/stock/{ticker}/batch", self.base_url))
                .query(&[("types", "quote,chart"), ("range", "5y")]),
            PROVIDER,
        )
        .await?;
        batch.into_quote()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IexQuote {
    symbol: String,
    company_name: String,
    primary_exchange: String,
    latest_price: f64,
    /// Milliseconds since the epoch.
    latest_update: i64,
    #[serde(default)]
    change: f64,
    #[serde(default)]
    change_percent: f64,
}

#[derive(Debug, Deserialize)]
struct IexBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Debug, Deserialize)]
struct IexBatch {
    quote: IexQuote,
    #[serde(default)]
    chart: Vec<IexBar>,
}

fn exchange(name: &str) -> Result<Exchange> {
    match name {
        "Nasdaq Global Select" => Ok(Exchange::Nasdaq),
        "New York Stock Exchange" => Ok(Exchange::Nyse),
        other => Err(SearchError::Parse(format!("IEX response: unknown exchange {other}")).into()),
    }
}

impl IexBatch {
    fn into_quote(self) -> Result<Quote> {
        let q = self.quote;
        let time = DateTime::from_timestamp(q.latest_update / 1000, 0).ok_or_else(|| {
            SearchError::Parse(format!("IEX response: bad timestamp {}", q.latest_update))
        })?;

        let history = self
            .chart
            .into_iter()
            .map(|bar| {
                let date = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d").map_err(|e| {
                    SearchError::Parse(format!("IEX response: bad date {}: {e}", bar.date))
                })?;
                Ok(Eod {
                    date,
                    open: bar.open,
                    close: bar.close,
                    high: bar.high,
                    low: bar.low,
                    volume: bar.volume,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Quote {
            exchange: exchange(&q.primary_exchange)?,
            ticker: q.symbol,
            name: q.company_name,
            last: Last {
                price: q.latest_price,
                time,
                change: q.change,
                change_percent: q.change_percent,
            },
            history,
            provider: PROVIDER.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const AAPL: &str = r#"{"quote":{"symbol":"AAPL","companyName":"Apple Inc.","primaryExchange":"Nasdaq Global Select","sector":"Technology","calculationPrice":"tops","open":168.07,"openTime":1522071000233,"close":164.94,"closeTime":1521835200671,"high":171.59,"low":166.44,"latestPrice":171.42,"latestSource":"IEX real time price","latestTime":"2:52:35 PM","latestUpdate":1522090355062,"latestVolume":25265896,"iexRealtimePrice":171.42,"iexRealtimeSize":100,"iexLastUpdated":1522090355062,"delayedPrice":171.533,"delayedPriceTime":1522089470450,"previousClose":164.94,"change":6.48,"changePercent":0.03929,"iexMarketPercent":0.03243,"iexVolume":819373,"avgTotalVolume":36742833,"iexBidPrice":171.42,"iexBidSize":100,"iexAskPrice":171.45,"iexAskSize":100,"marketCap":869787308460,"peRatio":18.63,"week52High":183.5,"week52Low":138.62,"ytdChange":-0.038589885200847475},"chart":[{"date":"2013-03-26","open":60.5276,"high":60.5797,"low":59.8891,"close":59.9679,"volume":73428208,"unadjustedVolume":10489744,"change":-0.317828,"changePercent":-0.527,"vwap":60.1238,"label":"Mar 26, 13","changeOverTime":0},{"date":"2013-03-27","open":59.3599,"high":59.4041,"low":58.6147,"close":58.7903,"volume":81854409,"unadjustedVolume":11693487,"change":-1.1777,"changePercent":-1.964,"vwap":58.9435,"label":"Mar 27, 13","changeOverTime":-0.019637172553983017}]}"#;

    #[tokio::test]
    async fn decodes_batch_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/AAPL/batch"))
            .and(query_param("types", "quote,chart"))
            .and(query_param("range", "5y"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(AAPL, "application/json"))
            .mount(&server)
            .await;

        let quote = Iex::new(reqwest::Client::new(), &server.uri())
            .fetch("AAPL")
            .await
            .unwrap();

        assert_eq!(quote.ticker, "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.exchange, Exchange::Nasdaq);
        assert_eq!(quote.provider, "IEX");
        assert_eq!(
            quote.last,
            Last {
                price: 171.42,
                time: Utc.timestamp_opt(1522090355, 0).unwrap(),
                change: 6.48,
                change_percent: 0.03929,
            }
        );
        assert_eq!(quote.history.len(), 2);
        assert_eq!(
            quote.history[0],
            Eod {
                date: NaiveDate::from_ymd_opt(2013, 3, 26).unwrap(),
                open: 60.5276,
                close: 59.9679,
                high: 60.5797,
                low: 59.8891,
                volume: 73428208,
            }
        );
    }

    #[test]
    fn unknown_exchange_is_rejected() {
        assert_eq!(exchange("New York Stock Exchange").unwrap(), Exchange::Nyse);
        assert!(exchange("Pink Sheets").is_err());
    }

    #[tokio::test]
    async fn missing_ticker_is_an_external_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown symbol"))
            .mount(&server)
            .await;
        let err = Iex::new(reqwest::Client::new(), &server.uri())
            .fetch("ZZZZ")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "external-unavailable");
    }
}
