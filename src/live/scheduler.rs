/// A buffer placed on the output timeline, in seconds of output-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledBuffer {
    pub id: u64,
    pub start: f64,
    pub duration: f64,
}

impl ScheduledBuffer {
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Gapless back-to-back placement of reply audio.
///
/// Each buffer starts at `max(now, end of previous buffer)`, so start times
/// never decrease while the cursor is not reset. Buffers stay queued until
/// their end time has passed or the queue is flushed.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    next_start: f64,
    queue: Vec<ScheduledBuffer>,
    next_id: u64,
}

impl PlaybackScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_start: 0.0,
            queue: Vec::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, now: f64, duration: f64) -> ScheduledBuffer {
        let start = self.next_start.max(now);
        let buffer = ScheduledBuffer {
            id: self.next_id,
            start,
            duration,
        };
        self.next_id += 1;
        self.next_start = start + duration;
        self.queue.push(buffer);
        buffer
    }

    /// Drop every queued buffer and move the cursor to `now`.
    pub fn flush(&mut self, now: f64) -> Vec<ScheduledBuffer> {
        self.next_start = now;
        std::mem::take(&mut self.queue)
    }

    /// Remove buffers that finished playing by `now`; returns how many.
    pub fn reap(&mut self, now: f64) -> usize {
        let before = self.queue.len();
        self.queue.retain(|b| b.end() > now);
        before - self.queue.len()
    }

    /// Whether any buffer is pending or playing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_play_back_to_back() {
        let mut scheduler = PlaybackScheduler::new();
        let a = scheduler.schedule(1.0, 0.5);
        let b = scheduler.schedule(1.1, 0.25);
        assert!((a.start - 1.0).abs() < f64::EPSILON);
        assert!((b.start - 1.5).abs() < f64::EPSILON);
        assert!((scheduler.next_start - 1.75).abs() < f64::EPSILON);
    }

    #[test]
    fn late_buffer_starts_now() {
        let mut scheduler = PlaybackScheduler::new();
        scheduler.schedule(0.0, 0.5);
        let late = scheduler.schedule(3.0, 0.5);
        assert!((late.start - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn flush_clears_queue_and_resets_cursor() {
        let mut scheduler = PlaybackScheduler::new();
        scheduler.schedule(0.0, 5.0);
        scheduler.schedule(0.0, 5.0);
        assert_eq!(scheduler.flush(2.0).len(), 2);
        assert!(!scheduler.is_active());

        let next = scheduler.schedule(2.0, 1.0);
        assert!((next.start - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reap_removes_finished_buffers_only() {
        let mut scheduler = PlaybackScheduler::new();
        scheduler.schedule(0.0, 1.0);
        scheduler.schedule(0.0, 1.0);
        assert_eq!(scheduler.reap(1.5), 1);
        assert!(scheduler.is_active());
        assert_eq!(scheduler.reap(2.0), 1);
        assert!(!scheduler.is_active());
    }

    #[derive(Clone, Copy)]
    enum Step {
        Arrive { now: f64, duration: f64 },
        Flush(f64),
    }

    fn steps_from_seed(mut seed: u64, count: usize) -> Vec<Step> {
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };
        let mut now = 0.0;
        (0..count)
            .map(|_| {
                #[allow(clippy::cast_precision_loss)]
                let jitter = (next() % 1000) as f64 / 1000.0;
                now += jitter * 0.3;
                if next() % 7 == 0 {
                    Step::Flush(now)
                } else {
                    Step::Arrive {
                        now,
                        duration: 0.01 + jitter * 0.5,
                    }
                }
            })
            .collect()
    }

    #[test]
    fn arrivals_never_overlap_or_start_in_the_past() {
        use self::Step::{Arrive, Flush};

        let arrive = |now, duration| Arrive { now, duration };
        let mut cases = vec![
            vec![arrive(0.0, 1.0), arrive(0.0, 1.0)],
            vec![
                arrive(0.0, 2.0),
                arrive(0.5, 0.1),
                Flush(0.7),
                arrive(0.7, 0.3),
                arrive(5.0, 0.3),
            ],
            vec![Flush(1.0), arrive(1.0, 0.0), arrive(1.0, 0.2)],
        ];
        cases.extend((1..=32).map(|seed| steps_from_seed(seed * 0x9E37_79B9, 64)));

        for (i, steps) in cases.iter().enumerate() {
            let mut scheduler = PlaybackScheduler::new();
            let mut previous: Option<ScheduledBuffer> = None;
            for step in steps {
                match *step {
                    Flush(now) => {
                        scheduler.flush(now);
                        previous = None;
                    }
                    Arrive { now, duration } => {
                        let buffer = scheduler.schedule(now, duration);
                        assert!(buffer.start >= now, "case {i}: {buffer:?} starts before {now}");
                        if let Some(prev) = previous {
                            assert!(
                                buffer.start >= prev.end() - 1e-9,
                                "case {i}: {buffer:?} overlaps {prev:?}"
                            );
                        }
                        previous = Some(buffer);
                    }
                }
            }
        }
    }
}
