//! 变异 / 交叉算子
//!
//! 外部优化器通过这两个 trait 驱动算子；每个算子持有自己的可设种子随机流，与问题的随机流互不影响。

pub mod crossover;
pub mod mutation;

pub use crossover::UniformPatchCrossover;
pub use mutation::RandomPatchMutation;

use crate::core::Result;
use crate::solution::CandidateSolution;

pub trait CrossoverOperator: Send {
    fn probability(&self) -> f64;

    fn required_parents(&self) -> usize {
        2
    }

    fn generated_children(&self) -> usize {
        2
    }

    /// 父代不被修改，返回的子代是深拷贝
    fn execute(&mut self, parents: &[CandidateSolution]) -> Result<Vec<CandidateSolution>>;
}

pub trait MutationOperator: Send {
    fn probability(&self) -> f64;

    /// 原地变异并返回同一个候选解
    fn execute<'a>(&mut self, candidate: &'a mut CandidateSolution) -> Result<&'a mut CandidateSolution>;
}
