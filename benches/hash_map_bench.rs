use aids::{Arena, Bucket, ByteView, HashMap};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
    c.bench_function("map::insert_fresh_100k", |b| {
        b.iter_batched(
            HashMap::<&str, u64>::new,
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    let _ = m.insert(k.as_str(), i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_presized_100k(c: &mut Criterion) {
    let keys: Vec<String> = lcg(2).take(100_000).map(key).collect();
    c.bench_function("map::insert_presized_100k", |b| {
        b.iter_batched(
            || HashMap::<&str, u64>::with_capacity_in(1 << 18, aids::Heap).unwrap(),
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    let _ = m.insert(k.as_str(), i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    c.bench_function("map::find_hit_10k_on_100k", |b| {
        let mut m = HashMap::new();
        let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            let _ = m.insert(k.clone(), i as u64).unwrap();
        }
        // Precompute 10k random query keys using LCG
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(m.get(k.as_str()));
            }
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    c.bench_function("map::find_miss_10k_on_100k", |b| {
        let mut m = HashMap::new();
        for (i, x) in lcg(11).take(100_000).enumerate() {
            let _ = m.insert(key(x), i as u64).unwrap();
        }
        let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();
        b.iter(|| {
            for k in &misses {
                black_box(m.get(k.as_str()));
            }
        })
    });
}

fn word_corpus() -> String {
    let words: Vec<String> = lcg(42).take(200_000).map(|x| key(x % 5_000)).collect();
    words.join(" ")
}

fn bench_word_count(c: &mut Criterion) {
    let corpus = word_corpus();

    c.bench_function("map::word_count_heap", |b| {
        b.iter(|| {
            let mut freq: HashMap<ByteView<'_>, u32> = HashMap::new();
            let mut text = ByteView::from(corpus.as_str());
            while !text.is_empty() {
                let word = text.chop_word();
                if !word.is_empty() {
                    *freq.get_or_insert_default(word).unwrap() += 1;
                }
            }
            black_box(freq.len())
        })
    });

    c.bench_function("map::word_count_arena", |b| {
        let mut arena: Arena<Bucket<ByteView<'_>, u32>> = Arena::with_capacity(1 << 15);
        b.iter(|| {
            arena.reset();
            let mut freq = HashMap::new_in(&mut arena);
            let mut text = ByteView::from(corpus.as_str());
            while !text.is_empty() {
                let word = text.chop_word();
                if !word.is_empty() {
                    *freq.get_or_insert_default(word).unwrap() += 1;
                }
            }
            black_box(freq.len())
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_find_hit_10k, bench_find_miss_10k, bench_word_count
}
criterion_main!(benches_insert, benches_ops);
