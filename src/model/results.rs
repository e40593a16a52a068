//! 测试结果集：一次评估的编译结论、逐测试结果与总耗时；返回后不可变

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use super::TestCase;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test: TestCase,
    /// 第几次重复（0 起）
    pub repetition: u32,
    pub passed: bool,
    pub timed_out: bool,
    pub execution_time: Duration,
    pub message: Option<String>,
}

impl TestResult {
    pub fn passed(test: TestCase, repetition: u32, execution_time: Duration) -> Self {
        Self {
            test,
            repetition,
            passed: true,
            timed_out: false,
            execution_time,
            message: None,
        }
    }

    pub fn failed(test: TestCase, repetition: u32, execution_time: Duration, message: impl Into<String>) -> Self {
        Self {
            test,
            repetition,
            passed: false,
            timed_out: false,
            execution_time,
            message: Some(message.into()),
        }
    }

    pub fn timed_out(test: TestCase, repetition: u32, execution_time: Duration) -> Self {
        Self {
            timed_out: true,
            ..Self::failed(test, repetition, execution_time, "timed out")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResultSet {
    pub compiled: bool,
    /// 请求中的测试用例数（不含重复）
    pub test_count: usize,
    pub results: Vec<TestResult>,
}

impl TestResultSet {
    pub fn new(compiled: bool, test_count: usize, results: Vec<TestResult>) -> Self {
        Self {
            compiled,
            test_count,
            results,
        }
    }

    /// 未编译：每个测试记一条失败结果
    pub fn not_compiled(tests: &[TestCase]) -> Self {
        let results = tests
            .iter()
            .map(|t| TestResult::failed(t.clone(), 0, Duration::ZERO, "compilation failed"))
            .collect();
        Self::new(false, tests.len(), results)
    }

    pub fn all_tests_passed(&self) -> bool {
        self.compiled && self.results.iter().all(|r| r.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    /// 至少在一次重复中失败的不同测试用例数
    pub fn failing_tests(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| &r.test)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn total_execution_time(&self) -> Duration {
        self.results.iter().map(|r| r.execution_time).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
