use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jobly::{ColumnOverrides, Filter, JobFilter, Sql, SqlValue, sql_for_partial_update, value};

/// `n` `(key, value)` pairs: `col0 = 0, col1 = 1, ...`
fn fields(n: usize) -> Vec<(String, SqlValue)> {
    (0..n).map(|i| (format!("col{i}"), value(i as i64))).collect()
}

fn bench_partial_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause_builder/partial_update");
    let overrides = ColumnOverrides::from_pairs(&[("col0", "column_zero"), ("col1", "column_one")]);

    for n in [1, 5, 20, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let set = sql_for_partial_update(fields(n), &overrides).unwrap();
                black_box(set.set_clause());
            });
        });
    }

    group.finish();
}

fn bench_update_statement(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause_builder/update_statement");

    for n in [1, 5, 20, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let set = sql_for_partial_update(fields(n), &ColumnOverrides::new()).unwrap();
                let mut q = Sql::new("UPDATE jobs SET ");
                set.append_to(&mut q);
                q.push(" WHERE id = ").push_bind(1_i32);
                black_box(q.to_sql());
            });
        });
    }

    group.finish();
}

fn bench_job_filter(c: &mut Criterion) {
    let filter = JobFilter {
        title: Some("engineer".into()),
        min_salary: Some(100_000),
        has_equity: true,
    };

    c.bench_function("clause_builder/job_filter", |b| {
        b.iter(|| {
            let clause = filter.where_clause().unwrap();
            black_box(clause.build_clause());
        });
    });
}

criterion_group!(
    benches,
    bench_partial_update,
    bench_update_statement,
    bench_job_filter
);
criterion_main!(benches);
