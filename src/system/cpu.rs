use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Polls closer together than this report 0% rather than a noisy ratio.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug)]
struct CpuSample {
    ticks: u64,
    observed_at: Instant,
    poll: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct SystemCpuBaseline {
    total_ticks: u64,
    sampled_at: Option<Instant>,
}

#[derive(Clone, Copy, Debug)]
struct PollWindow {
    total_now: u64,
    total_delta: u64,
    started_at: Instant,
}

/// Turns cumulative per-process CPU ticks into a utilization percentage.
///
/// One poll is bracketed by [`begin_poll`](Self::begin_poll) and
/// [`finish_poll`](Self::finish_poll). Every process seen in between is
/// measured against the same system-wide tick delta, so the percentages of a
/// single poll share one denominator.
#[derive(Debug)]
pub struct CpuAccountant {
    samples: HashMap<i32, CpuSample>,
    baseline: SystemCpuBaseline,
    logical_cores: usize,
    poll: u64,
    window: Option<PollWindow>,
}

impl CpuAccountant {
    pub fn new(logical_cores: usize) -> Self {
        CpuAccountant {
            samples: HashMap::new(),
            baseline: SystemCpuBaseline::default(),
            logical_cores: logical_cores.max(1),
            poll: 0,
            window: None,
        }
    }

    pub fn logical_cores(&self) -> usize {
        self.logical_cores
    }

    /// Number of pids with a stored sample.
    pub fn tracked(&self) -> usize {
        self.samples.len()
    }

    pub fn begin_poll(&mut self, total_ticks: u64, now: Instant) {
        self.poll += 1;
        self.window = Some(PollWindow {
            total_now: total_ticks,
            total_delta: total_ticks.saturating_sub(self.baseline.total_ticks),
            started_at: now,
        });
    }

    pub fn observe(&mut self, pid: i32, ticks: u64, now: Instant) -> f32 {
        let percent = match (self.samples.get(&pid), self.window) {
            (Some(prev), Some(window)) if self.is_warm(&window, now) => {
                let used = ticks as f64 - prev.ticks as f64;
                let ratio = used / window.total_delta as f64;
                (ratio * 100.0 * self.logical_cores as f64).clamp(0.0, 100.0) as f32
            }
            _ => 0.0,
        };

        self.samples.insert(
            pid,
            CpuSample {
                ticks,
                observed_at: now,
                poll: self.poll,
            },
        );
        percent
    }

    /// Commits the poll's system totals as the next baseline and drops samples
    /// for pids that were not observed during this poll.
    pub fn finish_poll(&mut self) {
        let Some(window) = self.window.take() else {
            return;
        };
        self.baseline = SystemCpuBaseline {
            total_ticks: window.total_now,
            sampled_at: Some(window.started_at),
        };
        let poll = self.poll;
        self.samples.retain(|_, sample| sample.poll == poll);
    }

    /// Time of the last observation of `pid`, if any.
    pub fn last_observed(&self, pid: i32) -> Option<Instant> {
        self.samples.get(&pid).map(|s| s.observed_at)
    }

    fn is_warm(&self, window: &PollWindow, now: Instant) -> bool {
        let Some(previous) = self.baseline.sampled_at else {
            return false;
        };
        now.saturating_duration_since(previous) > MIN_SAMPLE_INTERVAL
            && window.total_delta > 0
            && self.baseline.total_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(acc: &mut CpuAccountant, total: u64, now: Instant, procs: &[(i32, u64)]) -> Vec<f32> {
        acc.begin_poll(total, now);
        let out = procs
            .iter()
            .map(|&(pid, ticks)| acc.observe(pid, ticks, now))
            .collect();
        acc.finish_poll();
        out
    }

    #[test]
    fn first_observation_is_zero() {
        let mut acc = CpuAccountant::new(4);
        let t0 = Instant::now();
        assert_eq!(poll(&mut acc, 1_000, t0, &[(10, 500)]), vec![0.0]);
    }

    #[test]
    fn percentage_uses_shared_system_delta() {
        let mut acc = CpuAccountant::new(4);
        let t0 = Instant::now();
        poll(&mut acc, 1_000, t0, &[(10, 100), (11, 100)]);

        // 400 system ticks elapsed; pid 10 used 50, pid 11 used 10.
        let t1 = t0 + Duration::from_secs(1);
        let out = poll(&mut acc, 1_400, t1, &[(10, 150), (11, 110)]);
        assert!((out[0] - 50.0).abs() < 1e-4);
        assert!((out[1] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn result_is_clamped_to_hundred() {
        let mut acc = CpuAccountant::new(8);
        let t0 = Instant::now();
        poll(&mut acc, 1_000, t0, &[(1, 0)]);
        let out = poll(&mut acc, 1_100, t0 + Duration::from_secs(1), &[(1, 100)]);
        assert_eq!(out, vec![100.0]);
    }

    #[test]
    fn counter_going_backwards_clamps_to_zero() {
        let mut acc = CpuAccountant::new(1);
        let t0 = Instant::now();
        poll(&mut acc, 1_000, t0, &[(1, 900)]);
        let out = poll(&mut acc, 1_100, t0 + Duration::from_secs(1), &[(1, 10)]);
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn zero_system_delta_is_zero() {
        let mut acc = CpuAccountant::new(2);
        let t0 = Instant::now();
        poll(&mut acc, 1_000, t0, &[(1, 10)]);
        let out = poll(&mut acc, 1_000, t0 + Duration::from_secs(1), &[(1, 60)]);
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn polls_closer_than_threshold_are_zero() {
        let mut acc = CpuAccountant::new(1);
        let t0 = Instant::now();
        poll(&mut acc, 1_000, t0, &[(1, 10)]);
        let out = poll(&mut acc, 1_200, t0 + Duration::from_millis(50), &[(1, 60)]);
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn cold_baseline_is_zero() {
        let mut acc = CpuAccountant::new(1);
        let t0 = Instant::now();
        // previous total of zero means the system counters were unreadable
        poll(&mut acc, 0, t0, &[(1, 10)]);
        let out = poll(&mut acc, 500, t0 + Duration::from_secs(1), &[(1, 60)]);
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn unobserved_pids_are_evicted_at_end_of_poll() {
        let mut acc = CpuAccountant::new(1);
        let t0 = Instant::now();
        poll(&mut acc, 1_000, t0, &[(1, 10), (2, 10)]);
        assert_eq!(acc.tracked(), 2);

        poll(&mut acc, 1_100, t0 + Duration::from_secs(1), &[(1, 20)]);
        assert_eq!(acc.tracked(), 1);
        assert!(acc.last_observed(2).is_none());
        assert_eq!(acc.last_observed(1), Some(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn observe_without_poll_records_sample() {
        let mut acc = CpuAccountant::new(1);
        assert_eq!(acc.observe(5, 100, Instant::now()), 0.0);
        assert_eq!(acc.tracked(), 1);
    }
}
