//! Injectable clock
//!
//! Time-dependent components (failure tracker, temporal boost, answer cache,
//! domain metrics) take a `Clock` so tests control the passage of time.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used in production
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;
