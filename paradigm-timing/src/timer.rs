use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source that every blocking wait goes through.
pub trait Clock: Send + Sync {
    /// Time since the clock was created.
    fn now(&self) -> Duration;
    fn sleep(&self, d: Duration);

    fn elapsed(&self, since: Duration) -> Duration {
        self.now().saturating_sub(since)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionClock {
    pub start: Instant,
}

impl Clock for HighPrecisionClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // Resume with the remainder when a signal interrupts the sleep.
        loop {
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            if rc != EINTR {
                break;
            }
            req = rem;
        }
    }
}

impl Default for HighPrecisionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual clock: `sleep` advances time instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.nanos.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d)
    }
}
