use crate::data_structures::ExchangeRate;
use crate::error::FetchError;
use crate::validation::EXCHANGE_RATE;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use serde_json::Value;

pub const CBU_USD_ENDPOINT: &str = "https://cbu.uz/uz/arkhiv-kursov-valyut/json/USD";

/// Source of the so'm per USD exchange rate.
pub trait RateProvider {
    fn fetch(&self) -> Result<ExchangeRate, FetchError>;
}

/// Fetches the official rate from the Central Bank of Uzbekistan.
///
/// The endpoint is dated (`{endpoint}/YYYY-MM-DD/`) and answers with a JSON
/// array whose first element carries `Rate` and `Date` (`DD.MM.YYYY`).
/// Blocking: run it off the async executor.
#[derive(Debug, Clone)]
pub struct CbuRateProvider {
    endpoint: String,
    timeout: std::time::Duration,
}

impl CbuRateProvider {
    pub fn new() -> Self {
        Self::with_endpoint(CBU_USD_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: std::time::Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url_for(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}/",
            self.endpoint.trim_end_matches('/'),
            date.format("%Y-%m-%d")
        )
    }

    pub fn fetch_for(&self, date: NaiveDate) -> Result<ExchangeRate, FetchError> {
        let url = self.url_for(date);
        debug!("Fetching exchange rate from {}", url);

        // The blocking client owns a runtime of its own, so it is built per call
        // on whatever thread performs the fetch.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent("customs-fees/0.1")
            .build()?;

        let response = client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_rate_response(&body)
    }
}

impl Default for CbuRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RateProvider for CbuRateProvider {
    fn fetch(&self) -> Result<ExchangeRate, FetchError> {
        self.fetch_for(Utc::now().date_naive())
    }
}

/// A rate entered by the user. Never reported as live.
#[derive(Debug, Clone, Copy)]
pub struct StaticRateProvider {
    rate: f64,
}

impl StaticRateProvider {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl RateProvider for StaticRateProvider {
    fn fetch(&self) -> Result<ExchangeRate, FetchError> {
        check_fetched_rate(self.rate)?;
        Ok(ExchangeRate::fallback(self.rate))
    }
}

pub fn parse_rate_response(body: &str) -> Result<ExchangeRate, FetchError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let entries = json
        .as_array()
        .ok_or_else(|| FetchError::Parse("expected a JSON array".to_string()))?;
    let entry = entries.first().ok_or(FetchError::Empty)?;

    let rate = extract_rate(entry)?;
    let date = extract_date(entry)?;
    check_fetched_rate(rate)?;

    Ok(ExchangeRate::live(rate, date))
}

fn extract_rate(entry: &Value) -> Result<f64, FetchError> {
    match entry.get("Rate") {
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FetchError::Parse(format!("invalid 'Rate' value '{}'", s))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| FetchError::Parse("invalid 'Rate' number".to_string())),
        _ => Err(FetchError::Parse("missing or invalid 'Rate' field".to_string())),
    }
}

fn extract_date(entry: &Value) -> Result<NaiveDate, FetchError> {
    let date = entry
        .get("Date")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FetchError::Parse("missing or invalid 'Date' field".to_string()))?;

    NaiveDate::parse_from_str(date.trim(), "%d.%m.%Y")
        .map_err(|_| FetchError::Parse(format!("invalid 'Date' value '{}'", date)))
}

fn check_fetched_rate(rate: f64) -> Result<f64, FetchError> {
    let (min, max) = EXCHANGE_RATE;
    if !rate.is_finite() || rate < min || rate > max {
        return Err(FetchError::OutOfRange(rate));
    }
    Ok(rate)
}

#[derive(Debug, Clone, Copy)]
struct CachedRate {
    rate: ExchangeRate,
    expires_at: DateTime<Utc>,
}

/// `now + after`, or never when that is past the end of representable time.
fn expiry(now: DateTime<Utc>, after: Duration) -> DateTime<Utc> {
    now.checked_add_signed(after).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Wraps a [`RateProvider`] with a time-to-live cache and a static fallback.
///
/// A failed fetch is never an error for the caller: it yields the fallback
/// rate (`is_live == false`) and is retried after `retry_after`.
pub struct CachedRateProvider<P> {
    inner: P,
    ttl: Duration,
    retry_after: Duration,
    fallback_rate: f64,
    cached: Option<CachedRate>,
    last_error: Option<String>,
}

impl<P: RateProvider> CachedRateProvider<P> {
    pub fn new(inner: P, ttl: Duration, fallback_rate: f64) -> Self {
        Self {
            inner,
            ttl,
            retry_after: ttl.min(Duration::minutes(5)),
            fallback_rate,
            cached: None,
            last_error: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn fallback_rate(&self) -> f64 {
        self.fallback_rate
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.cached {
            Some(cached) => now >= cached.expires_at,
            None => true,
        }
    }

    /// The cached rate, or the fallback if nothing has been recorded yet.
    pub fn peek(&self) -> ExchangeRate {
        self.cached
            .map(|cached| cached.rate)
            .unwrap_or_else(|| ExchangeRate::fallback(self.fallback_rate))
    }

    pub fn time_until_refresh(&self, now: DateTime<Utc>) -> Duration {
        match self.cached {
            Some(cached) if cached.expires_at > now => cached.expires_at - now,
            _ => Duration::zero(),
        }
    }

    /// Stores the outcome of a fetch performed at `now` and returns the rate to use.
    pub fn record(
        &mut self,
        result: Result<ExchangeRate, FetchError>,
        now: DateTime<Utc>,
    ) -> ExchangeRate {
        let cached = match result {
            Ok(rate) => {
                info!("Exchange rate updated: {}", rate);
                self.last_error = None;
                CachedRate {
                    rate,
                    expires_at: expiry(now, self.ttl),
                }
            }
            Err(e) => {
                warn!(
                    "Exchange rate unavailable, using fallback {}: {}",
                    self.fallback_rate, e
                );
                self.last_error = Some(e.to_string());
                CachedRate {
                    rate: ExchangeRate::fallback(self.fallback_rate),
                    expires_at: expiry(now, self.retry_after),
                }
            }
        };

        self.cached = Some(cached);
        cached.rate
    }

    /// Returns the cached rate, fetching synchronously first when it has expired.
    pub fn current(&mut self, now: DateTime<Utc>) -> ExchangeRate {
        if self.needs_refresh(now) {
            let result = self.inner.fetch();
            return self.record(result, now);
        }
        self.peek()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
