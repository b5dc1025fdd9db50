//! Criterion benchmarks for the three query entry points (`§8`, "Ambient
//! test tooling"). Not run as part of `cargo test`; run with `cargo bench`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use autocomplete_topk::{Builder, DefaultArtifact, TopKEngine};

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "search", "engine",
    "autocomplete", "query", "rust", "index", "trie", "posting", "list", "score", "rank", "term",
];

fn synthetic_corpus(n: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|score| {
            let num_terms: usize = rng.gen_range(1..=4);
            let text: Vec<&str> = (0..num_terms)
                .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
                .collect();
            format!("{score} {}", text.join(" "))
        })
        .collect()
}

fn build_artifact(n: usize) -> DefaultArtifact {
    let lines = synthetic_corpus(n, 42);
    Builder::from_lines(lines.iter().map(String::as_str)).expect("synthetic corpus builds")
}

fn bench_topk(c: &mut Criterion) {
    let mut group = c.benchmark_group("topk");
    for &n in &[1_000usize, 10_000, 100_000] {
        let artifact = build_artifact(n);
        let mut engine = TopKEngine::new(&artifact);
        for &k in &[10u32, 50] {
            group.bench_with_input(BenchmarkId::new(format!("topk/n={n}"), k), &k, |b, &k| {
                b.iter(|| engine.topk("the q", k as usize).count());
            });
            group.bench_with_input(BenchmarkId::new(format!("prefix_topk/n={n}"), k), &k, |b, &k| {
                b.iter(|| engine.prefix_topk("the q", k as usize).count());
            });
            group.bench_with_input(BenchmarkId::new(format!("conjunctive_topk/n={n}"), k), &k, |b, &k| {
                b.iter(|| engine.conjunctive_topk("the fox", k as usize).count());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_topk);
criterion_main!(benches);
