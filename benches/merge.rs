//! Performance benchmarks for merging.
//!
//! Run with: `cargo bench --bench merge`
//!
//! ## Scenarios
//!
//! | Benchmark | What is measured |
//! |-----------|------------------|
//! | topic_merge | Merging two topics whose statements all collide |
//! | identity_automerge | A subject identifier collision triggering a merge |
//! | topic_map_merge | Copying a map into an empty map and into a copy of itself |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use topicmap_kernel::{TopicId, TopicMapId, TopicMapSystem, TopicMapSystemFactory};

fn make_system() -> TopicMapSystem {
    TopicMapSystemFactory::new_instance().new_topic_map_system()
}

fn psi(sys: &mut TopicMapSystem, tm: TopicMapId, name: &str) -> TopicId {
    let sid = sys
        .create_locator(&format!("http://psi.example.org/{name}"))
        .unwrap();
    sys.create_topic_by_subject_identifier(tm, &sid).unwrap()
}

/// A map of `size` topics, each with a name, an occurrence and one binary association.
fn build_map(sys: &mut TopicMapSystem, iri: &str, size: usize) -> TopicMapId {
    let locator = sys.create_locator(iri).unwrap();
    let tm = sys.create_topic_map(&locator).unwrap();
    let ty = psi(sys, tm, "type");
    let related = psi(sys, tm, "related");
    let mut previous = psi(sys, tm, "t0");
    for i in 1..size {
        let topic = psi(sys, tm, &format!("t{i}"));
        sys.create_name(topic, None, format!("Topic {i}"), &[]).unwrap();
        sys.create_occurrence(topic, ty, i as i32, &[]).unwrap();
        let association = sys.create_association(tm, related, &[]).unwrap();
        sys.create_role(association, ty, previous).unwrap();
        sys.create_role(association, related, topic).unwrap();
        previous = topic;
    }
    tm
}

/// Two topics with `statements` identical names, occurrences and associations each.
fn build_colliding_pair(statements: usize) -> (TopicMapSystem, TopicId, TopicId) {
    let mut sys = make_system();
    let locator = sys.create_locator("http://example.org/bench").unwrap();
    let tm = sys.create_topic_map(&locator).unwrap();
    let ty = psi(&mut sys, tm, "type");
    let other = psi(&mut sys, tm, "other");
    let a = psi(&mut sys, tm, "a");
    let b = psi(&mut sys, tm, "b");
    for topic in [a, b] {
        for i in 0..statements {
            sys.create_name(topic, None, format!("Name {i}"), &[]).unwrap();
            sys.create_occurrence(topic, ty, i as i64, &[]).unwrap();
            let association = sys.create_association(tm, ty, &[]).unwrap();
            sys.create_role(association, ty, topic).unwrap();
            let partner = psi(&mut sys, tm, &format!("partner-{i}"));
            sys.create_role(association, other, partner).unwrap();
        }
    }
    (sys, a, b)
}

fn bench_topic_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("topic_merge");
    for statements in [1, 10, 50] {
        group.throughput(Throughput::Elements(statements as u64 * 3));
        group.bench_with_input(BenchmarkId::new("statements", statements), &statements, |b, &n| {
            b.iter_batched(
                || build_colliding_pair(n),
                |(mut sys, a, source)| {
                    sys.merge_topics(a, source).unwrap();
                    black_box(sys)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_identity_automerge(c: &mut Criterion) {
    c.bench_function("identity_automerge", |b| {
        b.iter_batched(
            || {
                let (sys, a, source) = build_colliding_pair(10);
                let sid = sys.create_locator("http://psi.example.org/a").unwrap();
                (sys, a, source, sid)
            },
            |(mut sys, a, source, sid)| {
                let survivor = sys.add_subject_identifier(source, &sid).unwrap();
                assert_eq!(survivor, a);
                black_box(sys)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_topic_map_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("topic_map_merge");
    for size in [10, 100, 500] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("into_empty", size), &size, |b, &n| {
            b.iter_batched(
                || {
                    let mut sys = make_system();
                    let source = build_map(&mut sys, "http://example.org/source", n);
                    let locator = sys.create_locator("http://example.org/target").unwrap();
                    let target = sys.create_topic_map(&locator).unwrap();
                    (sys, target, source)
                },
                |(mut sys, target, source)| {
                    sys.merge_in(target, source).unwrap();
                    black_box(sys)
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("into_copy", size), &size, |b, &n| {
            b.iter_batched(
                || {
                    let mut sys = make_system();
                    let source = build_map(&mut sys, "http://example.org/source", n);
                    let target = build_map(&mut sys, "http://example.org/target", n);
                    (sys, target, source)
                },
                |(mut sys, target, source)| {
                    sys.merge_in(target, source).unwrap();
                    black_box(sys)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_topic_merge, bench_identity_automerge, bench_topic_map_merge);
criterion_main!(benches);
