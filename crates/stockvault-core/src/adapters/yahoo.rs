use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, Duration};
use tracing::{debug, warn};

use crate::data_source::{HistoryRequest, QuoteSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{QuoteSeries, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Daily history from the Yahoo Finance chart API.
pub struct YahooSource {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    base_url: String,
    timeout_ms: u64,
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooSource {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            retry: RetryConfig::default(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 10_000,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_endpoint(&self, req: &HistoryRequest) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            UtcDateTime::start_of_day(req.start).unix_timestamp(),
            UtcDateTime::start_of_day(req.end).unix_timestamp(),
        )
    }

    async fn fetch_with_retry(&self, req: &HistoryRequest) -> Result<Option<QuoteSeries>, SourceError> {
        let endpoint = self.chart_endpoint(req);
        let mut attempt = 0;

        loop {
            match self.fetch_once(&endpoint, req).await {
                Ok(series) => return Ok(series),
                Err(error) if self.retry.should_retry(&error, attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        symbol = %req.symbol,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "yahoo request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn fetch_once(
        &self,
        endpoint: &str,
        req: &HistoryRequest,
    ) -> Result<Option<QuoteSeries>, SourceError> {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::unavailable(format!(
                        "yahoo request timed out after {}ms",
                        self.timeout_ms
                    ))
                } else {
                    SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
                }
            })?;

        match response.status {
            404 => {
                return Err(SourceError::invalid_request(format!(
                    "yahoo does not know symbol '{}'",
                    req.symbol
                )))
            }
            429 => return Err(SourceError::rate_limited("yahoo returned status 429")),
            status if !response.is_success() => {
                return Err(SourceError::unavailable(format!(
                    "yahoo returned status {status}"
                )))
            }
            _ => {}
        }

        parse_chart(&response.body, req)
    }
}

impl QuoteSource for YahooSource {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn fetch_daily<'a>(
        &'a self,
        req: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<QuoteSeries>, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_with_retry(req))
    }
}

/// Turn a chart payload into a daily series over `[req.start, req.end)`.
///
/// Rows missing any of open/high/low/close are dropped. Timestamps are moved to
/// the exchange's local date and pinned to midnight UTC, so a trading day always
/// maps to the same key. When two rows land on the same date (Yahoo appends the
/// live session bar), the later one wins.
fn parse_chart(body: &str, req: &HistoryRequest) -> Result<Option<QuoteSeries>, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(SourceError::invalid_request(format!(
                "yahoo does not know symbol '{}': {}",
                req.symbol,
                error.description.unwrap_or_default()
            )));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(None);
    };
    let Some(timestamps) = result.timestamp.filter(|ts| !ts.is_empty()) else {
        debug!(symbol = %req.symbol, "yahoo returned no timestamps");
        return Ok(None);
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(None);
    };

    let offset = Duration::seconds(result.meta.map_or(0, |m| m.gmtoffset));
    let mut rows: Vec<(Date, f64, f64, f64, f64, f64)> = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let column = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open),
            column(&quote.high),
            column(&quote.low),
            column(&quote.close),
        ) else {
            continue;
        };
        let volume = column(&quote.volume).unwrap_or(0.0);

        let local = UtcDateTime::from_unix_timestamp(ts)
            .map_err(|e| SourceError::internal(e.to_string()))?
            .into_inner()
            + offset;
        let date = local.date();
        if date < req.start || date >= req.end {
            continue;
        }

        match rows.last_mut() {
            Some(last) if last.0 == date => *last = (date, open, high, low, close, volume),
            _ => rows.push((date, open, high, low, close, volume)),
        }
    }

    if rows.is_empty() {
        return Ok(None);
    }

    let mut series = QuoteSeries::default();
    for (date, open, high, low, close, volume) in rows {
        series.push(UtcDateTime::start_of_day(date), open, high, low, close, volume);
    }
    Ok(Some(series))
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    result: Option<Vec<YahooChartResult>>,
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    meta: Option<YahooChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::Symbol;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use time::macros::date;

    /// Replays queued responses in order and records every request.
    #[derive(Debug, Default)]
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().expect("request log").clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests.lock().expect("request log").push(request);
            let next = self
                .responses
                .lock()
                .expect("response queue")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("no scripted response left")));
            Box::pin(async move { next })
        }
    }

    fn request(symbol: &str) -> HistoryRequest {
        HistoryRequest::new(
            Symbol::parse(symbol).expect("symbol"),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 10),
        )
        .expect("request")
    }

    fn source(client: Arc<ScriptedHttpClient>) -> YahooSource {
        YahooSource::with_http_client(client)
            .with_base_url("https://yahoo.test/")
            .with_retry(RetryConfig::fixed(std::time::Duration::ZERO, 2))
    }

    // 2024-01-02 14:30 UTC and 2024-01-03 14:30 UTC, New York offset.
    const TWO_DAY_CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "symbol": "ABC", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704292200],
                "indicators": {"quote": [{
                    "open": [10.0, 11.0],
                    "high": [12.0, 13.0],
                    "low": [9.0, 10.0],
                    "close": [11.0, 12.0],
                    "volume": [100, null]
                }]}
            }],
            "error": null
        }
    }"#;

    #[tokio::test]
    async fn builds_chart_url_and_parses_daily_rows() {
        let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(TWO_DAY_CHART))]);
        let series = source(client.clone())
            .fetch_daily(&request("^GSPC"))
            .await
            .expect("fetch succeeds")
            .expect("series present");

        assert_eq!(series.len(), 2);
        assert_eq!(series.dates()[0], UtcDateTime::start_of_day(date!(2024 - 01 - 02)));
        assert_eq!(series.dates()[1], UtcDateTime::start_of_day(date!(2024 - 01 - 03)));
        assert_eq!(series.close(), &[11.0, 12.0]);
        assert_eq!(series.volume(), &[100.0, 0.0]);

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://yahoo.test/v8/finance/chart/%5EGSPC?period1=1704067200&period2=1704844800&interval=1d&events=history"
        );
    }

    #[test]
    fn drops_rows_with_missing_prices() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704153600,1704240000,1704326400],
            "indicators":{"quote":[{
                "open":[1.0,null,3.0],"high":[1.0,2.0,3.0],
                "low":[1.0,2.0,3.0],"close":[1.0,2.0,3.0],"volume":[1,2,3]
            }]}
        }],"error":null}}"#;

        let series = parse_chart(body, &request("ABC"))
            .expect("parse")
            .expect("series");
        assert_eq!(series.len(), 2);
        assert_eq!(series.open(), &[1.0, 3.0]);
    }

    #[test]
    fn missing_timestamps_mean_no_data() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert_eq!(parse_chart(body, &request("ABC")).expect("parse"), None);
    }

    #[test]
    fn same_date_rows_keep_the_latest() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704153600,1704196800],
            "indicators":{"quote":[{
                "open":[1.0,1.5],"high":[2.0,2.5],"low":[0.5,1.0],
                "close":[1.5,2.0],"volume":[10,20]
            }]}
        }],"error":null}}"#;

        let series = parse_chart(body, &request("ABC"))
            .expect("parse")
            .expect("series");
        assert_eq!(series.len(), 1);
        assert_eq!(series.close(), &[2.0]);
        assert_eq!(series.volume(), &[20.0]);
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_retried() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::new(404, body))]);

        let error = source(client.clone())
            .fetch_daily(&request("NOPE"))
            .await
            .expect_err("unknown symbol");

        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let client = ScriptedHttpClient::new(vec![
            Err(HttpError::timeout("request timeout")),
            Ok(HttpResponse::new(429, "")),
            Ok(HttpResponse::ok_json(TWO_DAY_CHART)),
        ]);

        let series = source(client.clone())
            .fetch_daily(&request("ABC"))
            .await
            .expect("third attempt succeeds");

        assert!(series.is_some());
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn timeouts_are_reported_with_the_configured_limit() {
        let client = ScriptedHttpClient::new(vec![
            Err(HttpError::timeout("operation timed out")),
            Err(HttpError::timeout("operation timed out")),
            Err(HttpError::timeout("operation timed out")),
        ]);

        let error = source(client.clone())
            .with_timeout_ms(1_500)
            .fetch_daily(&request("ABC"))
            .await
            .expect_err("every attempt times out");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert_eq!(
            error.to_string(),
            "yahoo request timed out after 1500ms (source.unavailable)"
        );
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let client = ScriptedHttpClient::new(vec![
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::ok_json(TWO_DAY_CHART)),
        ]);

        let error = source(client.clone())
            .fetch_daily(&request("ABC"))
            .await
            .expect_err("budget of two retries is exhausted");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert_eq!(client.recorded_requests().len(), 3);
    }
}
