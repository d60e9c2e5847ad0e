use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostop::remote::parser;
use hostop::system::cpu::CpuAccountant;
use std::hint::black_box;
use std::time::{Duration, Instant};

fn ps_listing(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 3 {
            0 => format!("{:>6} {:>4.1} {:>4.1} worker_{i}\n", i + 1, (i % 100) as f32, 0.3),
            1 => format!(
                "root {} 0.0 {:.1} 0.2 S 10:02 0:03 ? x daemon_{i}\n",
                i + 1,
                (i % 50) as f32
            ),
            _ => format!("garbage_line_{i}\n"),
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_50_100_500");

    for size in [50usize, 100, 500] {
        let raw = ps_listing(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| {
                let records = parser::parse(black_box(raw));
                black_box(records);
            })
        });
    }

    group.finish();
}

fn bench_cpu_accounting(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_accounting_500_1000_2000");

    for size in [500i32, 1000, 2000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut acc = CpuAccountant::new(8);
            let mut now = Instant::now();
            let mut total = 1_000u64;
            b.iter(|| {
                now += Duration::from_millis(500);
                total += 800;
                acc.begin_poll(total, now);
                for pid in 1..=size {
                    black_box(acc.observe(pid, total / 16 + pid as u64, now));
                }
                acc.finish_poll();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_cpu_accounting);
criterion_main!(benches);
