//! Blocking assertion engine.
//!
//! ```
//! use unitsim_core::UnitSim;
//!
//! let mut sim = UnitSim::new().with_title("doubles input");
//! sim.whenever(|| 21 * 2);
//! sim.expect(|| 42);
//! sim.evaluate().unwrap();
//! ```
//!
//! Registration order does not matter and a second registration on the same
//! track replaces the first. Neither producer runs before `evaluate`, which
//! resolves the expectation first, then the actual value.

use crate::config::SimConfig;
use crate::json::{JsonCodec, SerdeJsonCodec};
use crate::report::DebugLogging;
use crate::verdict::Verdict;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use unitsim_core_types::schema::OP_EVALUATE;
use unitsim_core_types::SimId;
use unitsim_errors::{BoxError, Result, SimError, Track};
use unitsim_logging::{DebugLogger, TracingLogger};

/// Deferred producer; JSON-mode producers canonicalize with the codec passed at resolution
type Producer<T> = Box<dyn FnOnce(&dyn JsonCodec) -> Result<T>>;

/// One test's blocking expect/whenever lifecycle.
///
/// `evaluate` consumes the engine, so an evaluated engine cannot be reused.
pub struct UnitSim<T> {
    sim_id: SimId,
    title: Option<String>,
    logging: DebugLogging,
    codec: Arc<dyn JsonCodec>,
    log_differences: bool,
    expectation: Option<Producer<T>>,
    actual: Option<Producer<T>>,
}

impl<T> std::fmt::Debug for UnitSim<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitSim")
            .field("sim_id", &self.sim_id)
            .field("title", &self.title)
            .field("expectation_set", &self.expectation.is_some())
            .field("actual_set", &self.actual.is_some())
            .finish()
    }
}

impl<T: PartialEq + Serialize + 'static> Default for UnitSim<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Serialize + 'static> UnitSim<T> {
    /// Fresh engine reporting through tracing with the structural diff checker
    pub fn new() -> Self {
        let sim_id = SimId::new();
        let logger = TracingLogger::new().with_sim_id(sim_id.clone());
        Self {
            sim_id,
            title: None,
            logging: DebugLogging::with_logger(Arc::new(logger)),
            codec: Arc::new(SerdeJsonCodec),
            log_differences: true,
            expectation: None,
            actual: None,
        }
    }

    /// Name the assertion; a titled failure is reported in the horizontal layout
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Send report lines to `logger`, keeping the current diff checker
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

    pub fn with_config(mut self, config: &SimConfig) -> Self {
        self.log_differences = config.log_differences;
        self
    }

    pub fn sim_id(&self) -> &SimId {
        &self.sim_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Register the expectation producer
    pub fn expect<F>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> T + 'static,
    {
        self.expectation = Some(Box::new(move |_: &dyn JsonCodec| Ok(producer())));
        self
    }

    /// Register a fallible expectation producer; its error fails the test
    /// as a resolution failure
    pub fn try_expect<F, E>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> std::result::Result<T, E> + 'static,
        E: Into<BoxError>,
    {
        self.expectation = Some(fallible(Track::Expectation, producer));
        self
    }

    /// Register the actual-value producer
    pub fn whenever<F>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> T + 'static,
    {
        self.actual = Some(Box::new(move |_: &dyn JsonCodec| Ok(producer())));
        self
    }

    /// Register a fallible actual-value producer
    pub fn try_whenever<F, E>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> std::result::Result<T, E> + 'static,
        E: Into<BoxError>,
    {
        self.actual = Some(fallible(Track::Actual, producer));
        self
    }

    /// Run `body` to register producers, then evaluate.
    ///
    /// # Errors
    ///
    /// Any error [`evaluate`](Self::evaluate) returns.
    pub fn run<F>(mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self),
    {
        body(&mut self);
        self.evaluate()
    }

    /// Resolve both producers, expectation first, and compare.
    ///
    /// # Errors
    ///
    /// - `MissingProducer` — a track was never registered (nothing is resolved)
    /// - `Resolution` / `Canonicalization` — a producer failed; nothing is compared or logged
    /// - `AssertionMismatch` — values differ; the report has been logged
    pub fn evaluate(self) -> Result<()> {
        let started = Instant::now();
        let expectation = self.expectation.ok_or(SimError::MissingProducer {
            track: Track::Expectation,
        })?;
        let actual = self.actual.ok_or(SimError::MissingProducer {
            track: Track::Actual,
        })?;

        let expected = expectation(self.codec.as_ref())?;
        let actual = actual(self.codec.as_ref())?;

        Verdict {
            op: OP_EVALUATE,
            sim_id: &self.sim_id,
            title: self.title.as_deref(),
            logging: &self.logging,
            log_differences: self.log_differences,
            started,
        }
        .judge(&expected, &actual)
    }
}

impl UnitSim<String> {
    /// Register an expectation given as JSON text; it is canonicalized on resolution
    pub fn expect_json<F, S>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> S + 'static,
        S: AsRef<str>,
    {
        self.expectation = Some(json_producer(Track::Expectation, producer));
        self
    }

    /// Register an actual value given as JSON text; it is canonicalized on resolution
    pub fn whenever_json<F, S>(&mut self, producer: F) -> &mut Self
    where
        F: FnOnce() -> S + 'static,
        S: AsRef<str>,
    {
        self.actual = Some(json_producer(Track::Actual, producer));
        self
    }
}

fn fallible<T, F, E>(track: Track, producer: F) -> Producer<T>
where
    F: FnOnce() -> std::result::Result<T, E> + 'static,
    E: Into<BoxError>,
{
    Box::new(move |_: &dyn JsonCodec| {
        producer().map_err(|e| SimError::Resolution {
            track,
            source: e.into(),
        })
    })
}

pub(crate) fn canonicalize_for(
    track: Track,
    codec: &dyn JsonCodec,
    raw: &str,
) -> Result<String> {
    codec
        .canonicalize(raw)
        .map_err(|e| SimError::Canonicalization {
            track,
            message: e.to_string(),
        })
}

fn json_producer<F, S>(track: Track, producer: F) -> Producer<String>
where
    F: FnOnce() -> S + 'static,
    S: AsRef<str>,
{
    Box::new(move |codec: &dyn JsonCodec| canonicalize_for(track, codec, producer().as_ref()))
}

/// Run one blocking assertion and panic with the failure message if it fails.
///
/// This is the entry point for `#[test]` functions.
///
/// ```
/// unitsim_core::test(|sim| {
///     sim.expect(|| "Go".to_string());
///     sim.whenever(|| "Go".to_string());
/// });
/// ```
///
/// # Panics
///
/// Panics when evaluation fails for any reason.
#[track_caller]
pub fn test<T, F>(body: F)
where
    T: PartialEq + Serialize + 'static,
    F: FnOnce(&mut UnitSim<T>),
{
    if let Err(err) = try_test(body) {
        panic!("{}", err);
    }
}

/// Like [`test`] but returns the failure instead of panicking.
///
/// # Errors
///
/// Any error [`UnitSim::evaluate`] returns.
pub fn try_test<T, F>(body: F) -> Result<()>
where
    T: PartialEq + Serialize + 'static,
    F: FnOnce(&mut UnitSim<T>),
{
    UnitSim::new().run(body)
}
