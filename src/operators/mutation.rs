//! 随机补丁变异：以概率 p 追加一个随机编辑，从不删除或重排已有编辑

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::MutationOperator;
use crate::core::Result;
use crate::edits::{EditGenerator, EditKind};
use crate::solution::CandidateSolution;

pub struct RandomPatchMutation<R: RngCore = StdRng> {
    probability: f64,
    edit_kinds: Vec<EditKind>,
    generator: Arc<dyn EditGenerator>,
    rng: R,
}

impl RandomPatchMutation<StdRng> {
    pub fn new(probability: f64, edit_kinds: Vec<EditKind>, generator: Arc<dyn EditGenerator>) -> Self {
        Self::with_rng(probability, edit_kinds, generator, StdRng::from_entropy())
    }

    pub fn with_seed(
        probability: f64,
        edit_kinds: Vec<EditKind>,
        generator: Arc<dyn EditGenerator>,
        seed: u64,
    ) -> Self {
        Self::with_rng(probability, edit_kinds, generator, StdRng::seed_from_u64(seed))
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: RngCore> RandomPatchMutation<R> {
    pub fn with_rng(
        probability: f64,
        edit_kinds: Vec<EditKind>,
        generator: Arc<dyn EditGenerator>,
        rng: R,
    ) -> Self {
        Self {
            probability,
            edit_kinds,
            generator,
            rng,
        }
    }

    pub fn edit_kinds(&self) -> &[EditKind] {
        &self.edit_kinds
    }

    pub fn set_edit_kinds(&mut self, edit_kinds: Vec<EditKind>) {
        self.edit_kinds = edit_kinds;
    }

    pub fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
    }
}

impl<R: RngCore + Send> MutationOperator for RandomPatchMutation<R> {
    fn probability(&self) -> f64 {
        self.probability
    }

    fn execute<'a>(&mut self, candidate: &'a mut CandidateSolution) -> Result<&'a mut CandidateSolution> {
        if self.rng.gen::<f64>() < self.probability {
            candidate
                .patch_mut()
                .add_random_edit(&mut self.rng, &self.edit_kinds, self.generator.as_ref())?;
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::{Edit, RandomLineEditGenerator};
    use crate::testing::sample_source;

    fn seeded(probability: f64, seed: u64) -> RandomPatchMutation {
        RandomPatchMutation::with_seed(probability, EditKind::ALL.to_vec(), Arc::new(RandomLineEditGenerator), seed)
    }

    fn candidate() -> CandidateSolution {
        let mut c = CandidateSolution::new(2, 1, sample_source(&EditKind::ALL));
        c.patch_mut().push(Edit::DeleteLine { line: 5 });
        c.patch_mut().push(Edit::SwapLine { first: 6, second: 7 });
        c
    }

    #[test]
    fn test_zero_probability_never_changes() {
        let mut op = seeded(0.0, 3);
        let mut c = candidate();
        let before = c.clone();
        for _ in 0..50 {
            op.execute(&mut c).unwrap();
        }
        assert_eq!(c, before);
    }

    #[test]
    fn test_full_probability_appends_exactly_one() {
        let mut op = seeded(1.0, 3);
        let mut c = candidate();
        for round in 0..20 {
            let prefix = c.variables().to_vec();
            let n = op.execute(&mut c).unwrap().number_of_variables();
            assert_eq!(n, 2 + round + 1);
            // 已有编辑不被删除或重排
            assert_eq!(&c.variables()[..prefix.len()], prefix.as_slice());
        }
    }

    #[test]
    fn test_appended_edits_use_allowed_kinds() {
        let mut op = RandomPatchMutation::with_seed(
            1.0,
            vec![EditKind::LineDeletion],
            Arc::new(RandomLineEditGenerator),
            11,
        );
        let mut c = candidate();
        op.execute(&mut c).unwrap();
        assert_eq!(c.variables().last().unwrap().kind(), EditKind::LineDeletion);
    }
}
