//! Crash reporting
//!
//! Polls the crash counter and logs it whenever it has moved.

use bump_core::CollisionMonitor;
use defmt::info;
use embassy_time::{Duration, Ticker};

/// Time between counter checks
const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Crash counter reporting task
#[embassy_executor::task]
pub async fn crash_report(monitor: &'static CollisionMonitor) {
    let mut reported = monitor.crash_count();
    let mut ticker = Ticker::every(REPORT_INTERVAL);

    loop {
        ticker.next().await;

        let count = monitor.crash_count();
        if count != reported {
            info!("Crashes: {} total, {} since last report", count, count.wrapping_sub(reported));
            reported = count;
        }
    }
}
