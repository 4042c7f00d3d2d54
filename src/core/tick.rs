//=========================================================================
// Tick Clock
//=========================================================================
//
// Cooperative pacing primitive for the logic task.
//
// Long-running flows (load polling, the intent pump) suspend between
// units of work by awaiting one tick, which keeps the single-threaded
// scheduler responsive at a fixed rate instead of busy-spinning.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use tokio::time::sleep;

//=== Tick Clock ==========================================================

/// Fixed-rate yield point for cooperative loops.
///
/// One `next().await` suspends the caller for a single tick period,
/// letting every other task on the scheduler run before the caller
/// resumes. Clones share the same period but pace independently.
#[derive(Debug, Clone)]
pub struct TickClock {
    period: Duration,
}

impl TickClock {
    /// Creates a clock ticking at the given rate.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn from_tps(tps: f64) -> Self {
        assert!(tps > 0.0, "Tick rate must be positive, got {}", tps);
        Self {
            period: Duration::from_secs_f64(1.0 / tps),
        }
    }

    /// One tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Suspends the caller for one tick.
    pub async fn next(&self) {
        sleep(self.period).await;
    }
}

//=== Tests ===============================================================
