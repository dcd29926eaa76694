use std::collections::VecDeque;
use std::hint::black_box;

use block_deque::BlockDeque;
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_deque(c: &mut Criterion) {
    let n = 10_000;
    {
        let mut group = c.benchmark_group("VecDeque vs BlockDeque (PushBack 10k)");
        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    d.push_back(black_box(i));
                }
                d
            })
        });

        group.bench_function("BlockDeque<i32>", |b| {
            b.iter(|| {
                let mut d: BlockDeque<i32> = BlockDeque::new();
                for i in 0..n {
                    d.push_back(black_box(i));
                }
                d
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("VecDeque vs BlockDeque (PushFront 10k)");
        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    d.push_front(black_box(i));
                }
                d
            })
        });

        group.bench_function("BlockDeque<i32>", |b| {
            b.iter(|| {
                let mut d: BlockDeque<i32> = BlockDeque::new();
                for i in 0..n {
                    d.push_front(black_box(i));
                }
                d
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("VecDeque vs BlockDeque (Iterate 10k)");
        let d_std: VecDeque<i32> = (0..n).collect();
        let d_block: BlockDeque<i32> = (0..n).collect();

        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| d_std.iter().map(|v| black_box(*v) as i64).sum::<i64>())
        });

        group.bench_function("BlockDeque<i32>", |b| {
            b.iter(|| d_block.iter().map(|v| black_box(*v) as i64).sum::<i64>())
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("BlockDeque positions");
        let d: BlockDeque<i32> = (0..n).collect();

        group.bench_function("get by index", |b| {
            b.iter(|| {
                for i in (0..n as usize).step_by(97) {
                    black_box(d.get(black_box(i)).ok());
                }
            })
        });

        group.bench_function("advance + distance", |b| {
            b.iter(|| {
                let pos = d.advance(d.begin(), black_box(7_777)).unwrap();
                black_box(d.distance(d.begin(), pos).unwrap())
            })
        });

        group.bench_function("insert + erase in the middle", |b| {
            let mut d = d.clone();
            let middle = d.advance(d.begin(), (n / 2) as isize).unwrap();
            b.iter(|| {
                let pos = d.insert(middle, black_box(-1)).unwrap();
                d.erase(pos).unwrap();
            })
        });
        group.finish();
    }
}

criterion_group!(benches, bench_deque);
criterion_main!(benches);
