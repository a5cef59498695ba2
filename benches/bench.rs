use setcov::coverage::CoverCounters;
use setcov::env::Environment;
use setcov::greedy::Greedy;
use setcov::instance::{Instance, fill_rows_from_cols};
use setcov::subgradient::Pricer;
use setcov::{E, Solution};

fn main() {
    divan::main();
}

/// Deterministic pseudo-random instance: `ncols` columns of ~`col_size`
/// rows over `nrows` rows, plus one cheap covering block per stripe so the
/// instance is always feasible.
fn synthetic_instance(nrows: usize, ncols: usize, col_size: usize) -> Instance {
    let mut inst = Instance::default();
    let mut state = 0x9e3779b97f4a7c15u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut rows_buf = Vec::new();
    for stripe in 0..nrows.div_ceil(col_size) {
        rows_buf.clear();
        rows_buf.extend(stripe * col_size..((stripe + 1) * col_size).min(nrows));
        inst.cols.push_col(&rows_buf);
        inst.costs.push(100.0);
    }
    while inst.cols.size() < ncols {
        rows_buf.clear();
        for _ in 0..col_size {
            let i = (next() % nrows as u64) as usize;
            if !rows_buf.contains(&i) {
                rows_buf.push(i);
            }
        }
        inst.cols.push_col(&rows_buf);
        inst.costs.push(50.0 + (next() % 100) as E);
    }
    fill_rows_from_cols(&inst.cols, nrows, &mut inst.rows);
    inst
}

#[divan::bench]
fn cover_counters(bencher: divan::Bencher) {
    let inst = synthetic_instance(1000, 5000, 10);
    let mut cover = CoverCounters::new(1000);
    bencher.bench_local(move || {
        for j in 0..inst.cols.size() {
            cover.cover(inst.cols.col(j));
        }
        for j in 0..inst.cols.size() {
            cover.uncover(inst.cols.col(j));
        }
    });
}

#[divan::bench]
fn greedy_construction(bencher: divan::Bencher) {
    let inst = synthetic_instance(1000, 5000, 10);
    let env = Environment::default();
    let mults = vec![0.5; 1000];
    let mut greedy = Greedy::default();
    let mut sol = Solution::default();
    bencher.bench_local(move || {
        sol.clear();
        greedy.run(&env, &inst, &mults, &mut sol, E::INFINITY, usize::MAX);
        divan::black_box(sol.cost)
    });
}

#[divan::bench]
fn pricing(bencher: divan::Bencher) {
    let inst = synthetic_instance(1000, 5000, 10);
    let mults = vec![0.5; 1000];
    let mut pricer = Pricer::default();
    let mut core = setcov::CoreInstance::default();
    bencher.bench_local(move || {
        divan::black_box(pricer.price(&inst, &mults, &mut core))
    });
}
