use std::time::{Duration, Instant};

use hostop::remote::parser;
use hostop::system::cpu::CpuAccountant;
use proptest::prelude::*;

proptest! {
    #[test]
    fn percentages_stay_in_range(
        cores in 1usize..64,
        total_start in 1u64..1_000_000,
        total_step in 0u64..100_000,
        ticks_start in 0u64..1_000_000,
        // includes counter resets (negative deltas)
        ticks_delta in -10_000i64..1_000_000,
        gap_ms in 0u64..2_000,
    ) {
        let mut acc = CpuAccountant::new(cores);
        let t0 = Instant::now();
        acc.begin_poll(total_start, t0);
        acc.observe(1, ticks_start, t0);
        acc.finish_poll();

        let t1 = t0 + Duration::from_millis(gap_ms);
        let ticks = (ticks_start as i64 + ticks_delta).max(0) as u64;
        acc.begin_poll(total_start + total_step, t1);
        let percent = acc.observe(1, ticks, t1);
        acc.finish_poll();

        prop_assert!((0.0..=100.0).contains(&percent), "out of range: {}", percent);
    }

    #[test]
    fn first_sight_of_a_pid_is_zero(
        cores in 1usize..64,
        polls in prop::collection::vec((1u64..1_000_000, 0u64..1_000_000), 1..8),
        pid in 1i32..100_000,
    ) {
        let mut acc = CpuAccountant::new(cores);
        let mut now = Instant::now();
        let mut total = 0u64;
        for (step, _) in &polls {
            total += step;
            acc.begin_poll(total, now);
            acc.finish_poll();
            now += Duration::from_millis(500);
        }
        let ticks = polls.last().map(|&(_, t)| t).unwrap_or(0);
        acc.begin_poll(total + 1_000, now);
        prop_assert_eq!(acc.observe(pid, ticks, now), 0.0);
    }

    #[test]
    fn unchanged_system_total_reads_zero(
        cores in 1usize..64,
        total in 1u64..1_000_000,
        ticks in 0u64..1_000_000,
        extra in 0u64..1_000_000,
    ) {
        let mut acc = CpuAccountant::new(cores);
        let t0 = Instant::now();
        acc.begin_poll(total, t0);
        acc.observe(7, ticks, t0);
        acc.finish_poll();

        let t1 = t0 + Duration::from_secs(1);
        acc.begin_poll(total, t1);
        prop_assert_eq!(acc.observe(7, ticks + extra, t1), 0.0);
    }

    #[test]
    fn parser_yields_one_record_per_line(
        lines in prop::collection::vec("[a-zA-Z0-9 ./:_-]{0,80}", 0..150),
    ) {
        let raw = lines.join("\n");
        let records = parser::parse(&raw);
        let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
        prop_assert_eq!(records.len(), non_blank.min(parser::MAX_LINES));
        for record in &records {
            prop_assert!((0.0..=100.0).contains(&record.cpu_percent));
            prop_assert!(!record.name.is_empty());
        }
    }
}
