//! Fixed-rate frame pacing.

use std::time::{Duration, Instant};

/// Schedules frames at a fixed interval.
///
/// Each deadline is the previous deadline plus one interval, so short
/// frames do not accumulate drift. A frame that overruns by more than one
/// whole interval resynchronizes to "now" instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Option<Duration>,
    next: Instant,
}

impl FramePacer {
    /// `frame_rate == 0` disables pacing.
    pub fn new(frame_rate: u32) -> Self {
        let interval = (frame_rate > 0).then(|| Duration::from_secs(1) / frame_rate);
        Self {
            interval,
            next: Instant::now(),
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Time left until the next deadline, advancing the schedule.
    ///
    /// Returns `None` when the frame is already late (or pacing is off).
    pub fn advance(&mut self, now: Instant) -> Option<Duration> {
        let interval = self.interval?;
        self.next = next_deadline(self.next, interval, now);
        self.next.checked_duration_since(now).filter(|d| !d.is_zero())
    }

    /// Sleeps until the next deadline.
    pub fn wait(&mut self) {
        if let Some(remaining) = self.advance(Instant::now()) {
            std::thread::sleep(remaining);
        }
    }
}

/// Deadline following `previous`, measured from the previous deadline.
pub fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let next = previous + interval;
    if now > next + interval {
        now
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn deadlines_do_not_drift() {
        let start = Instant::now();
        let mut deadline = start;
        for i in 1..=10u32 {
            // Work took 5 ms of every frame.
            let now = deadline + Duration::from_millis(5);
            deadline = next_deadline(deadline, FRAME, now);
            assert_eq!(deadline, start + FRAME * i);
        }
    }

    #[test]
    fn long_stall_resynchronizes() {
        let start = Instant::now();
        let now = start + FRAME * 5;
        assert_eq!(next_deadline(start, FRAME, now), now);
    }

    #[test]
    fn slightly_late_frame_keeps_schedule() {
        let start = Instant::now();
        let now = start + FRAME + Duration::from_millis(3);
        assert_eq!(next_deadline(start, FRAME, now), start + FRAME);
    }

    #[test]
    fn zero_rate_is_unpaced() {
        let mut pacer = FramePacer::new(0);
        assert_eq!(pacer.interval(), None);
        assert_eq!(pacer.advance(Instant::now()), None);
    }

    #[test]
    fn advance_reports_remaining_time() {
        let mut pacer = FramePacer::new(10);
        let remaining = pacer.advance(pacer.next).unwrap();
        assert_eq!(remaining, Duration::from_millis(100));
    }
}
