//! 采样驱动
//!
//! 不是进化引擎：没有选择、排序或种群管理。对每个目标方法：
//! 评估基线，创建并评估若干个各经过一次变异的候选，再把相邻两个候选交叉并评估子代，
//! 最后把本方法评估过的全部候选写到 `<output_dir>/<方法 id>/`。

use std::path::PathBuf;
use std::time::Instant;

use crate::core::Result;
use crate::model::TargetMethod;
use crate::operators::{CrossoverOperator, MutationOperator};
use crate::problem::{Problem, SENTINEL};
use crate::report::{default_patch_columns, ResultsPrinter};
use crate::solution::CandidateSolution;

/// 一个目标方法的采样摘要
#[derive(Debug, Clone)]
pub struct MethodSummary {
    pub method: TargetMethod,
    pub evaluated: usize,
    pub feasible: usize,
    /// 通过全部测试的候选中最短的运行时间（毫秒）
    pub best_runtime_ms: Option<f64>,
    pub output_dir: PathBuf,
}

pub struct Sampler<P, C, M> {
    problem: P,
    crossover: C,
    mutation: M,
    samples: usize,
    output_dir: PathBuf,
}

impl<P, C, M> Sampler<P, C, M>
where
    P: Problem,
    C: CrossoverOperator,
    M: MutationOperator,
{
    pub fn new(problem: P, crossover: C, mutation: M, samples: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            problem,
            crossover,
            mutation,
            samples,
            output_dir: output_dir.into(),
        }
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub async fn run(&mut self) -> Result<Vec<MethodSummary>> {
        let mut summaries = Vec::new();
        loop {
            let Some(method) = self.problem.advance()?.cloned() else {
                break;
            };
            summaries.push(self.sample_method(method).await?);
        }
        tracing::info!(methods = summaries.len(), "sampling finished");
        Ok(summaries)
    }

    async fn sample_method(&mut self, method: TargetMethod) -> Result<MethodSummary> {
        let mut evaluated = Vec::with_capacity(1 + self.samples * 2);
        let mut times_ms = Vec::with_capacity(1 + self.samples * 2);

        let baseline = self.problem.create_candidate()?;
        self.timed_evaluate(baseline, &mut evaluated, &mut times_ms).await?;

        let mut pool = Vec::with_capacity(self.samples);
        for _ in 0..self.samples {
            let mut candidate = self.problem.create_candidate()?;
            self.mutation.execute(&mut candidate)?;
            pool.push(candidate);
        }
        for candidate in &pool {
            self.timed_evaluate(candidate.clone(), &mut evaluated, &mut times_ms).await?;
        }

        for parents in pool.chunks_exact(self.crossover.required_parents()) {
            for child in self.crossover.execute(parents)? {
                self.timed_evaluate(child, &mut evaluated, &mut times_ms).await?;
            }
        }

        let output_dir = self.output_dir.join(method.id.to_string());
        ResultsPrinter::new(&output_dir)
            .with_patch_columns(default_patch_columns(self.problem.number_of_objectives()))
            .print(&evaluated, &times_ms)?;

        let feasible: Vec<&CandidateSolution> = evaluated.iter().filter(|c| c.is_feasible()).collect();
        let best_runtime_ms = evaluated
            .iter()
            .filter(|c| c.objective(1) < SENTINEL)
            .map(|c| c.objective(1))
            .min_by(|a, b| a.total_cmp(b));

        tracing::info!(
            method = %method,
            evaluated = evaluated.len(),
            feasible = feasible.len(),
            best_runtime_ms = ?best_runtime_ms,
            "method sampled"
        );
        Ok(MethodSummary {
            method,
            evaluated: evaluated.len(),
            feasible: feasible.len(),
            best_runtime_ms,
            output_dir,
        })
    }

    async fn timed_evaluate(
        &mut self,
        mut candidate: CandidateSolution,
        evaluated: &mut Vec<CandidateSolution>,
        times_ms: &mut Vec<u64>,
    ) -> Result<()> {
        let start = Instant::now();
        self.problem.evaluate(&mut candidate).await?;
        times_ms.push(start.elapsed().as_millis() as u64);
        evaluated.push(candidate);
        Ok(())
    }
}
