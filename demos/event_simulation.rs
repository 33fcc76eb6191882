//! Discrete-event simulation driven by a projected heap
//!
//! Timers are queued by deadline. Handles let the simulation postpone,
//! expedite and cancel timers that are already scheduled.
//!
//! ```bash
//! RUST_LOG=info cargo run --example event_simulation
//! ```

use mutable_heap::compare::{FnProjection, NaturalOrder};
use mutable_heap::{HeapError, ProjectedHeap};
use tracing::info;

#[derive(Debug, Clone)]
struct Timer {
    deadline: u64,
    name: &'static str,
    period: Option<u64>,
}

type Schedule = ProjectedHeap<Timer, FnProjection<Timer, u64>, NaturalOrder>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Event Simulation ===\n");

    let by_deadline: FnProjection<Timer, u64> =
        FnProjection::new(|t| &t.deadline, |t| &mut t.deadline);
    let mut schedule: Schedule = ProjectedHeap::with_projection(by_deadline, NaturalOrder);

    let timer = |deadline, name, period| Timer {
        deadline,
        name,
        period,
    };
    let heartbeat = schedule.push(timer(10, "heartbeat", Some(10)));
    let flush = schedule.push(timer(25, "flush", None));
    let retry = schedule.push(timer(40, "retry", None));
    let lease = schedule.push(timer(90, "lease-expiry", None));

    let mut now = 0;
    let mut fired = 0;
    while let Ok(fired_timer) = schedule.pop() {
        now = fired_timer.deadline;
        fired += 1;
        info!(now, name = fired_timer.name, pending = schedule.len(), "timer fired");
        println!("t={now:>3}  {}", fired_timer.name);

        match (fired_timer.name, fired) {
            // A write burst makes the pending flush urgent
            ("heartbeat", 1) => {
                if schedule.ensure_priority(flush, now + 2)? {
                    info!(now, deadline = now + 2, "flush expedited");
                }
            }
            // The flush carried the acknowledgement the retry was waiting for
            ("flush", _) => {
                let cancelled = schedule.erase(retry)?;
                info!(now, name = cancelled.name, "timer cancelled");
            }
            ("heartbeat", 4) => {
                schedule.update(lease, now + 100)?;
                info!(now, deadline = now + 100, "lease renewed");
            }
            _ => {}
        }

        if let Some(period) = fired_timer.period {
            if now < 60 {
                schedule.push(Timer {
                    deadline: now + period,
                    ..fired_timer
                });
            }
        }
    }

    println!("\nFired {fired} timers, simulation ended at t={now}");

    // Each heartbeat reschedule was a fresh push; the first handle died with
    // the first firing
    match schedule.update(heartbeat, 0) {
        Err(HeapError::InvalidHandle) => println!("Stale heartbeat handle rejected"),
        other => println!("Unexpected result for stale handle: {other:?}"),
    }
    Ok(())
}
