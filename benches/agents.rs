//! Benchmark `BanditAgent::give_pull` for each strategy.
use banditry::agents::{
    AgentDef, EpsilonGreedyConfig, KlUcbConfig, ThompsonSamplingConfig, Ucb1Config,
};
use banditry::envs::BernoulliBandit;
use criterion::{criterion_group, criterion_main, measurement::Measurement, BenchmarkGroup, Criterion};

const PROBABILITIES: [f64; 4] = [0.23, 0.55, 0.76, 0.44];

// Far more steps than criterion will ever drive in one benchmark.
const BENCH_HORIZON: u64 = 1 << 40;

fn bench_give_pull<M: Measurement>(group: &mut BenchmarkGroup<M>, name: &str, def: &AgentDef) {
    let env = BernoulliBandit::new(PROBABILITIES.to_vec(), 0).unwrap();
    let mut agent = def.build(BENCH_HORIZON, env, 0).unwrap();
    group.bench_function(name, |b| b.iter(|| agent.give_pull().unwrap()));
}

fn bench_agents(c: &mut Criterion) {
    let mut group = c.benchmark_group("give_pull");
    bench_give_pull(
        &mut group,
        "epsilon_greedy",
        &AgentDef::EpsilonGreedy(EpsilonGreedyConfig::default()),
    );
    bench_give_pull(&mut group, "ucb1", &AgentDef::Ucb1(Ucb1Config::default()));
    bench_give_pull(&mut group, "klucb", &AgentDef::KlUcb(KlUcbConfig::default()));
    bench_give_pull(
        &mut group,
        "thompson_sampling",
        &AgentDef::ThompsonSampling(ThompsonSamplingConfig),
    );
    group.finish();
}

criterion_group!(benches, bench_agents);
criterion_main!(benches);
