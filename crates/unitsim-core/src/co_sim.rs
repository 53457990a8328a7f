//! Suspending assertion engine.
//!
//! Same contract as [`UnitSim`](crate::UnitSim), except producers may be
//! async. [`CoUnitSim::evaluate`] blocks the calling thread on a
//! current-thread runtime that lives exactly as long as the call; the
//! expectation is awaited to completion before the actual producer starts.
//!
//! Cancellation, from the [`CancelToken`], the configured timeout, or a
//! producer returning [`Cancelled`], drops the pending producer and fails
//! with `SimError::Cancelled`. Nothing is logged in that case.

use crate::cancel::CancelToken;
use crate::config::SimConfig;
use crate::json::{JsonCodec, SerdeJsonCodec};
use crate::report::DebugLogging;
use crate::sim::canonicalize_for;
use crate::verdict::Verdict;
use futures::future::{FutureExt, LocalBoxFuture};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use unitsim_core_types::schema::OP_CO_EVALUATE;
use unitsim_core_types::SimId;
use unitsim_errors::{BoxError, Cancelled, Result, SimError, Track};
use unitsim_logging::{DebugLogger, TracingLogger};

/// Deferred suspending producer; JSON-mode producers canonicalize with the codec passed at resolution
type CoProducer<T> = Box<dyn FnOnce(Arc<dyn JsonCodec>) -> LocalBoxFuture<'static, Result<T>>>;

/// One test's suspending expect/whenever lifecycle
pub struct CoUnitSim<T> {
    sim_id: SimId,
    title: Option<String>,
    logging: DebugLogging,
    codec: Arc<dyn JsonCodec>,
    log_differences: bool,
    timeout: Option<Duration>,
    expectation: Option<CoProducer<T>>,
    actual: Option<CoProducer<T>>,
}

impl<T> std::fmt::Debug for CoUnitSim<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoUnitSim")
            .field("sim_id", &self.sim_id)
            .field("title", &self.title)
            .field("timeout", &self.timeout)
            .field("expectation_set", &self.expectation.is_some())
            .field("actual_set", &self.actual.is_some())
            .finish()
    }
}

/// Map a producer's error to the failure kind it represents
fn classify(track: Track, err: BoxError) -> SimError {
    if let Some(marker) = err.downcast_ref::<Cancelled>() {
        return SimError::Cancelled {
            track,
            reason: marker.reason.clone(),
        };
    }
    if err.is::<tokio::time::error::Elapsed>() {
        return SimError::Cancelled {
            track,
            reason: err.to_string(),
        };
    }
    match err.downcast::<SimError>() {
        Ok(nested) if nested.is_cancelled() => SimError::Cancelled {
            track,
            reason: nested.to_string(),
        },
        Ok(nested) => SimError::Resolution {
            track,
            source: nested,
        },
        Err(source) => SimError::Resolution { track, source },
    }
}

impl<T: PartialEq + Serialize + 'static> Default for CoUnitSim<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Serialize + 'static> CoUnitSim<T> {
    pub fn new() -> Self {
        let sim_id = SimId::new();
        let logger = TracingLogger::new().with_sim_id(sim_id.clone());
        Self {
            sim_id,
            title: None,
            logging: DebugLogging::with_logger(Arc::new(logger)),
            codec: Arc::new(SerdeJsonCodec),
            log_differences: true,
            timeout: None,
            expectation: None,
            actual: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn DebugLogger>) -> Self {
        let checker = self.logging.diff_checker().clone();
        self.logging = DebugLogging::new(logger, checker);
        self
    }

    pub fn with_logging(mut self, logging: DebugLogging) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Bound the time spent resolving both producers
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_config(mut self, config: &SimConfig) -> Self {
        self.log_differences = config.log_differences;
        if let Some(timeout) = config.timeout() {
            self.timeout = Some(timeout);
        }
        self
    }

    pub fn sim_id(&self) -> &SimId {
        &self.sim_id
    }

    pub fn expect<F>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> T + 'static,
    {
        self.expectation = Some(Box::new(move |_: Arc<dyn JsonCodec>| {
            async move { Ok::<T, SimError>(producer()) }.boxed_local()
        }));
        self
    }

    pub fn try_expect<F, E>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> std::result::Result<T, E> + 'static,
        E: Into<BoxError>,
    {
        self.expectation = Some(Box::new(move |_: Arc<dyn JsonCodec>| {
            async move { producer().map_err(|e| classify(Track::Expectation, e.into())) }
                .boxed_local()
        }));
        self
    }

    /// Register a suspending expectation producer
    pub fn co_expect<F, Fut>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = T> + 'static,
    {
        self.expectation = Some(Box::new(move |_: Arc<dyn JsonCodec>| {
            producer().map(Ok::<T, SimError>).boxed_local()
        }));
        self
    }

    pub fn try_co_expect<F, Fut, E>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
        E: Into<BoxError>,
    {
        self.expectation = Some(fallible_co(Track::Expectation, producer));
        self
    }

    pub fn whenever<F>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> T + 'static,
    {
        self.actual = Some(Box::new(move |_: Arc<dyn JsonCodec>| {
            async move { Ok::<T, SimError>(producer()) }.boxed_local()
        }));
        self
    }

    pub fn try_whenever<F, E>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> std::result::Result<T, E> + 'static,
        E: Into<BoxError>,
    {
        self.actual = Some(Box::new(move |_: Arc<dyn JsonCodec>| {
            async move { producer().map_err(|e| classify(Track::Actual, e.into())) }
                .boxed_local()
        }));
        self
    }

    /// Register a suspending actual-value producer
    pub fn co_whenever<F, Fut>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = T> + 'static,
    {
        self.actual = Some(Box::new(move |_: Arc<dyn JsonCodec>| {
            producer().map(Ok::<T, SimError>).boxed_local()
        }));
        self
    }

    pub fn try_co_whenever<F, Fut, E>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
        E: Into<BoxError>,
    {
        self.actual = Some(fallible_co(Track::Actual, producer));
        self
    }

    /// Run `body` to register producers, then evaluate under `token`.
    ///
    /// # Errors
    ///
    /// Any error [`evaluate`](Self::evaluate) returns.
    pub fn run_blocking<F>(mut self, token: &CancelToken, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self),
    {
        body(&mut self);
        self.evaluate(token)
    }

    /// Block the calling thread until both producers resolve, then compare.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`evaluate_async`](Self::evaluate_async) there.
    ///
    /// # Errors
    ///
    /// - `Bridge` — called from inside a tokio runtime, or the scoped runtime could not be built
    /// - everything [`evaluate_async`](Self::evaluate_async) returns
    pub fn evaluate(self, token: &CancelToken) -> Result<()> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SimError::Bridge {
                message: "evaluate called from inside a tokio runtime; await evaluate_async instead"
                    .to_string(),
            });
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| SimError::Bridge {
                message: e.to_string(),
            })?;
        runtime.block_on(self.evaluate_async(token))
    }

    /// Resolve and compare on the caller's runtime.
    ///
    /// A configured timeout needs the tokio time driver on that runtime.
    ///
    /// # Errors
    ///
    /// - `MissingProducer` — a track was never registered
    /// - `Cancelled` — token cancelled, timeout elapsed, or a producer reported cancellation
    /// - `Resolution` / `Canonicalization` — a producer failed
    /// - `AssertionMismatch` — values differ; the report has been logged
    pub async fn evaluate_async(self, token: &CancelToken) -> Result<()> {
        let started = Instant::now();
        let expectation = self.expectation.ok_or(SimError::MissingProducer {
            track: Track::Expectation,
        })?;
        let actual = self.actual.ok_or(SimError::MissingProducer {
            track: Track::Actual,
        })?;
        let deadline = self
            .timeout
            .map(|limit| (tokio::time::Instant::now() + limit, limit));

        let expected = resolve(
            Track::Expectation,
            expectation,
            self.codec.clone(),
            token,
            deadline,
        )
        .await?;
        let actual = resolve(Track::Actual, actual, self.codec.clone(), token, deadline).await?;

        Verdict {
            op: OP_CO_EVALUATE,
            sim_id: &self.sim_id,
            title: self.title.as_deref(),
            logging: &self.logging,
            log_differences: self.log_differences,
            started,
        }
        .judge(&expected, &actual)
    }
}

impl CoUnitSim<String> {
    pub fn expect_json<F, S>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> S + 'static,
        S: AsRef<str>,
    {
        self.expectation = Some(json_co(Track::Expectation, move || {
            futures::future::ready(producer().as_ref().to_string())
        }));
        self
    }

    pub fn whenever_json<F, S>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> S + 'static,
        S: AsRef<str>,
    {
        self.actual = Some(json_co(Track::Actual, move || {
            futures::future::ready(producer().as_ref().to_string())
        }));
        self
    }

    /// Register a suspending expectation given as JSON text
    pub fn co_expect_json<F, Fut, S>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = S> + 'static,
        S: AsRef<str>,
    {
        self.expectation = Some(json_co(Track::Expectation, producer));
        self
    }

    /// Register a suspending actual value given as JSON text
    pub fn co_whenever_json<F, Fut, S>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = S> + 'static,
        S: AsRef<str>,
    {
        self.actual = Some(json_co(Track::Actual, producer));
        self
    }
}

fn fallible_co<T, F, Fut, E>(track: Track, producer: F) -> CoProducer<T>
where
    T: 'static,
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = std::result::Result<T, E>> + 'static,
    E: Into<BoxError>,
{
    Box::new(move |_: Arc<dyn JsonCodec>| {
        producer()
            .map(move |r| r.map_err(|e| classify(track, e.into())))
            .boxed_local()
    })
}

fn json_co<F, Fut, S>(track: Track, producer: F) -> CoProducer<String>
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = S> + 'static,
    S: AsRef<str>,
{
    Box::new(move |codec: Arc<dyn JsonCodec>| {
        async move {
            let raw = producer().await;
            canonicalize_for(track, codec.as_ref(), raw.as_ref())
        }
        .boxed_local()
    })
}

/// Await one producer, racing it against the token and the shared deadline
async fn resolve<T>(
    track: Track,
    producer: CoProducer<T>,
    codec: Arc<dyn JsonCodec>,
    token: &CancelToken,
    deadline: Option<(tokio::time::Instant, Duration)>,
) -> Result<T> {
    let guarded = async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(SimError::Cancelled {
                track,
                reason: "cancellation requested".to_string(),
            }),
            resolved = producer(codec) => resolved,
        }
    };
    match deadline {
        Some((at, limit)) => tokio::time::timeout_at(at, guarded)
            .await
            .unwrap_or_else(|_| {
                Err(SimError::Cancelled {
                    track,
                    reason: format!("timed out after {}ms", limit.as_millis()),
                })
            }),
        None => guarded.await,
    }
}

/// Run one suspending assertion and panic with the failure message if it fails.
///
/// ```
/// unitsim_core::test_blocking(|sim| {
///     sim.co_expect(|| async { 3 });
///     sim.whenever(|| 1 + 2);
/// });
/// ```
///
/// # Panics
///
/// Panics when evaluation fails for any reason.
#[track_caller]
pub fn test_blocking<T, F>(body: F)
where
    T: PartialEq + Serialize + 'static,
    F: FnOnce(&mut CoUnitSim<T>),
{
    if let Err(err) = try_test_blocking(body) {
        panic!("{}", err);
    }
}

/// Like [`test_blocking`] but returns the failure instead of panicking.
///
/// # Errors
///
/// Any error [`CoUnitSim::evaluate`] returns.
pub fn try_test_blocking<T, F>(body: F) -> Result<()>
where
    T: PartialEq + Serialize + 'static,
    F: FnOnce(&mut CoUnitSim<T>),
{
    CoUnitSim::new().run_blocking(&CancelToken::new(), body)
}
