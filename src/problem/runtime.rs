//! 运行时间问题变体的适应度
//!
//! - 目标 0：补丁大小（编辑数）
//! - 目标 1：编译成功且全部测试通过时为总执行时间（毫秒），否则为哨兵最大值
//! - 约束 0：全部通过为 0；否则编译成功时为失败测试数，未编译时为测试总数

use crate::model::TestResultSet;

/// 失败候选的目标 1
pub const SENTINEL: f64 = f64::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub objectives: Vec<f64>,
    pub constraints: Vec<f64>,
}

/// 适应度：由补丁大小与测试结果计算目标与约束，不产生副作用
pub trait Fitness: Send + Sync {
    fn name(&self) -> &str;
    fn number_of_objectives(&self) -> usize;
    fn number_of_constraints(&self) -> usize;
    fn assess(&self, patch_size: usize, results: &TestResultSet) -> Assessment;
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeFitness {
    constraints: usize,
}

impl RuntimeFitness {
    /// constraints 取 0（无约束变体）或 1
    pub fn new(constraints: usize) -> Self {
        Self {
            constraints: constraints.min(1),
        }
    }
}

impl Default for RuntimeFitness {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Fitness for RuntimeFitness {
    fn name(&self) -> &str {
        "Runtime Genetic Improvement Problem"
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_constraints(&self) -> usize {
        self.constraints
    }

    fn assess(&self, patch_size: usize, results: &TestResultSet) -> Assessment {
        let success = results.compiled && results.all_tests_passed();
        let runtime = if success {
            results.total_execution_time().as_nanos() as f64 / 1_000_000.0
        } else {
            SENTINEL
        };
        let violation = if success {
            0.0
        } else if results.compiled {
            results.failing_tests() as f64
        } else {
            results.test_count as f64
        };

        Assessment {
            objectives: vec![patch_size as f64, runtime],
            constraints: vec![violation; self.constraints],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::TestResult;
    use crate::testing::test_case;

    #[test]
    fn test_successful_run() {
        let set = TestResultSet::new(
            true,
            2,
            vec![
                TestResult::passed(test_case("a"), 0, Duration::from_millis(3)),
                TestResult::passed(test_case("b"), 0, Duration::from_micros(1500)),
            ],
        );
        let a = RuntimeFitness::default().assess(0, &set);
        assert_eq!(a.objectives, vec![0.0, 4.5]);
        assert_eq!(a.constraints, vec![0.0]);
    }

    #[test]
    fn test_failing_and_uncompiled_runs() {
        let failing = TestResultSet::new(
            true,
            3,
            vec![
                TestResult::failed(test_case("a"), 0, Duration::from_millis(3), "x"),
                TestResult::passed(test_case("b"), 0, Duration::from_millis(3)),
                TestResult::timed_out(test_case("c"), 0, Duration::from_millis(3)),
            ],
        );
        let a = RuntimeFitness::default().assess(2, &failing);
        assert_eq!(a.objectives, vec![2.0, SENTINEL]);
        assert_eq!(a.constraints, vec![2.0]);

        let broken = TestResultSet::not_compiled(&[test_case("a"), test_case("b"), test_case("c")]);
        let a = RuntimeFitness::default().assess(1, &broken);
        assert_eq!(a.objectives[1], SENTINEL);
        assert_eq!(a.constraints, vec![3.0]);
    }

    #[test]
    fn test_constraint_free_variant() {
        let broken = TestResultSet::not_compiled(&[test_case("a")]);
        let a = RuntimeFitness::new(0).assess(1, &broken);
        assert!(a.constraints.is_empty());
        assert_eq!(a.objectives.len(), 2);
    }
}
