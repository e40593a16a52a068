//! genimprove - 采样驱动入口
//!
//! 用法：`genimprove [config.toml]`。加载配置、构建问题，对清单中的每个方法采样并导出结果。
//! 执行环境错误（无法启动测试进程等）以非零退出码终止。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use genimprove::config::load_config;
use genimprove::edits::RandomLineEditGenerator;
use genimprove::observability;
use genimprove::operators::{RandomPatchMutation, UniformPatchCrossover};
use genimprove::problem::{ImprovementProblem, ProblemSettings};
use genimprove::sampler::Sampler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path).context("Failed to load config")?;
    let settings = ProblemSettings::from_config(&config).context("Invalid configuration")?;
    let edit_kinds = settings.edit_kinds.clone();

    let problem = ImprovementProblem::builder(settings)
        .build()
        .context("Failed to set up the improvement problem")?;

    let ops = &config.operators;
    let generator = Arc::new(RandomLineEditGenerator);
    let (crossover, mutation) = match ops.seed {
        Some(seed) => (
            UniformPatchCrossover::with_seed(ops.crossover_probability, seed),
            RandomPatchMutation::with_seed(ops.mutation_probability, edit_kinds, generator, seed.wrapping_add(1)),
        ),
        None => (
            UniformPatchCrossover::new(ops.crossover_probability),
            RandomPatchMutation::new(ops.mutation_probability, edit_kinds, generator),
        ),
    };

    let mut sampler = Sampler::new(
        problem,
        crossover,
        mutation,
        config.sampler.samples,
        config.sampler.output_dir.clone(),
    );
    let summaries = sampler.run().await.context("Sampling aborted")?;

    for s in &summaries {
        tracing::info!(
            method = %s.method,
            evaluated = s.evaluated,
            feasible = s.feasible,
            best_runtime_ms = ?s.best_runtime_ms,
            output = %s.output_dir.display(),
            "summary"
        );
    }
    Ok(())
}
