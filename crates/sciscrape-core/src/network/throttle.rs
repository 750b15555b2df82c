use std::time::Duration;

/// Fixed politeness delay paid after every request, successful or not.
///
/// There is no backoff and no retry; the delay only spaces requests out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Negative or non-finite values mean no delay.
    #[must_use]
    pub fn from_secs_f64(seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            Self::new(Duration::from_secs_f64(seconds))
        } else {
            Self::none()
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        tracing::debug!(interval = ?self.interval, "Politeness delay");
        tokio::time::sleep(self.interval).await;
    }
}
