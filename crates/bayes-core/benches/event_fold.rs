use bayes_core::belief::{BeliefDistribution, OddsTable};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn build_odds(vocabulary: usize) -> OddsTable<String> {
    (0..vocabulary)
        .map(|index| {
            let genuine = 1.0 + (index % 7) as f64;
            let spam = 1.0 + (index % 11) as f64;
            (format!("word{index}"), [genuine, spam])
        })
        .collect()
}

fn document(length: usize, vocabulary: usize) -> Vec<String> {
    (0..length)
        .map(|index| format!("word{}", (index * 31) % vocabulary))
        .collect()
}

fn event_fold_bench(c: &mut Criterion) {
    let odds = build_odds(512);
    let prior = BeliefDistribution::from_pairs([("genuine", 0.9), ("spam", 0.1)]).unwrap();
    let mut group = c.benchmark_group("event_fold");
    for length in [16usize, 256, 4096] {
        let events = document(length, 512);
        group.bench_function(format!("folded_{length}"), |b| {
            b.iter(|| {
                let mut belief = prior.clone();
                let _ = black_box(belief.update_from_events(&events, &odds).is_ok());
            })
        });
        group.bench_function(format!("sequential_{length}"), |b| {
            b.iter(|| {
                let mut belief = prior.clone();
                for event in &events {
                    if let Some(likelihoods) = odds.get(event) {
                        let _ = belief.update(likelihoods);
                    }
                }
                black_box(belief)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, event_fold_bench);
criterion_main!(benches);
