//! 均匀补丁交叉
//!
//! 以概率 p 进行交叉：在两个父代长度的公共前缀上逐位以 0.5 的概率交换编辑，
//! 超出较短父代长度的尾部原样保留；否则子代就是父代的克隆。长度不同的父代是正常输入。

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::CrossoverOperator;
use crate::core::{GiError, Result};
use crate::solution::CandidateSolution;

pub struct UniformPatchCrossover<R: RngCore = StdRng> {
    probability: f64,
    rng: R,
}

impl UniformPatchCrossover<StdRng> {
    pub fn new(probability: f64) -> Self {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    pub fn with_seed(probability: f64, seed: u64) -> Self {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: RngCore> UniformPatchCrossover<R> {
    pub fn with_rng(probability: f64, rng: R) -> Self {
        Self { probability, rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn crossover(
        &mut self,
        first: &CandidateSolution,
        second: &CandidateSolution,
    ) -> Result<[CandidateSolution; 2]> {
        let mut offspring = [first.clone(), second.clone()];

        if self.rng.gen::<f64>() < self.probability {
            let overlap = first.number_of_variables().min(second.number_of_variables());
            for index in 0..overlap {
                if self.rng.gen::<f64>() < 0.5 {
                    offspring[0].set_variable(index, second.variable(index)?.clone())?;
                    offspring[1].set_variable(index, first.variable(index)?.clone())?;
                }
            }
        }
        Ok(offspring)
    }
}

impl<R: RngCore + Send> CrossoverOperator for UniformPatchCrossover<R> {
    fn probability(&self) -> f64 {
        self.probability
    }

    fn execute(&mut self, parents: &[CandidateSolution]) -> Result<Vec<CandidateSolution>> {
        let [first, second] = parents else {
            return Err(GiError::ParentCount(parents.len()));
        };
        Ok(self.crossover(first, second)?.into())
    }
}
