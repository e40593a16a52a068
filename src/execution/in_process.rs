//! 进程内执行策略
//!
//! 编译与单个测试都在阻塞线程池上运行；测试超过自身超时即记为超时失败。
//! 超时的测试线程无法被强制终止，只是不再等待它的结果。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{TestExecutor, TestRequest};
use crate::core::ExecutionError;
use crate::model::{TestCase, TestResult, TestResultSet};

/// 单个测试的结论（超时由执行器判定，不在这里）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(String),
}

/// 嵌入程序提供的编译 / 测试后端。
/// 返回 Err 表示基础设施失败（整个运行终止），测试失败用 TestOutcome::Failed 表示。
pub trait TestHarness: Send + Sync + 'static {
    /// 编译修改后的类源码，返回是否编译成功
    fn compile(&self, class_name: &str, classpath: &str, source: &str) -> Result<bool, ExecutionError>;

    /// 在最近一次编译结果上运行一个测试
    fn run_test(&self, test: &TestCase) -> Result<TestOutcome, ExecutionError>;
}

pub struct InProcessExecutor {
    harness: Arc<dyn TestHarness>,
    fail_fast: bool,
}

impl InProcessExecutor {
    pub fn new(harness: Arc<dyn TestHarness>, fail_fast: bool) -> Self {
        Self { harness, fail_fast }
    }

    async fn run_one(&self, test: &TestCase, repetition: u32) -> Result<TestResult, ExecutionError> {
        let harness = self.harness.clone();
        let owned = test.clone();
        let start = Instant::now();
        let handle = tokio::task::spawn_blocking(move || harness.run_test(&owned));

        let result = match tokio::time::timeout(test.timeout, handle).await {
            Err(_) => {
                tracing::debug!(test = %test.reference(), repetition, "test timed out");
                TestResult::timed_out(test.clone(), repetition, start.elapsed())
            }
            Ok(Err(join)) => TestResult::failed(
                test.clone(),
                repetition,
                start.elapsed(),
                format!("harness panicked: {}", join),
            ),
            Ok(Ok(outcome)) => match outcome? {
                TestOutcome::Passed => TestResult::passed(test.clone(), repetition, start.elapsed()),
                TestOutcome::Failed(message) => {
                    TestResult::failed(test.clone(), repetition, start.elapsed(), message)
                }
            },
        };
        Ok(result)
    }
}

#[async_trait]
impl TestExecutor for InProcessExecutor {
    fn strategy(&self) -> &'static str {
        "in_process"
    }

    async fn execute(&self, request: TestRequest<'_>) -> Result<TestResultSet, ExecutionError> {
        let text = request.patch.apply();
        let harness = self.harness.clone();
        let class_name = request.target_class.to_string();
        let classpath = request.classpath.to_string();
        let compiled = tokio::task::spawn_blocking(move || harness.compile(&class_name, &classpath, &text))
            .await
            .map_err(|e| ExecutionError::Interrupted(format!("compiler panicked: {}", e)))??;

        if !compiled {
            return Ok(TestResultSet::not_compiled(request.tests));
        }

        let mut results = Vec::with_capacity(request.tests.len() * request.reps as usize);
        for repetition in 0..request.reps {
            for (idx, test) in request.tests.iter().enumerate() {
                let result = self.run_one(test, repetition).await?;
                let failed = !result.passed;
                results.push(result);
                if failed && self.fail_fast {
                    for rest in &request.tests[idx + 1..] {
                        results.push(TestResult::failed(
                            rest.clone(),
                            repetition,
                            Duration::ZERO,
                            "skipped after failure",
                        ));
                    }
                    break;
                }
            }
        }
        Ok(TestResultSet::new(true, request.tests.len(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::{Edit, EditKind};
    use crate::model::Patch;
    use crate::testing::{sample_source, test_case, ScriptedHarness};

    fn request<'a>(tests: &'a [TestCase], patch: &'a Patch, reps: u32) -> TestRequest<'a> {
        TestRequest {
            target_class: "example.Small",
            classpath: "",
            tests,
            patch,
            reps,
        }
    }

    #[tokio::test]
    async fn test_runs_every_test_each_repetition() {
        let harness = Arc::new(ScriptedHarness::passing());
        let exec = InProcessExecutor::new(harness.clone(), false);
        let tests = vec![test_case("a"), test_case("b")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 3)).await.unwrap();
        assert!(set.compiled);
        assert!(set.all_tests_passed());
        assert_eq!(set.results.len(), 6);
        assert_eq!(harness.run_count(), 6);
    }

    #[tokio::test]
    async fn test_patched_text_reaches_compiler() {
        let harness = Arc::new(ScriptedHarness::passing());
        let exec = InProcessExecutor::new(harness.clone(), false);
        let tests = vec![test_case("a")];
        let mut patch = Patch::new(sample_source(&EditKind::ALL));
        patch.push(Edit::DeleteLine { line: 7 });

        exec.execute(request(&tests, &patch, 1)).await.unwrap();
        let texts = harness.compiled_texts.lock().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(!texts[0].contains("total += v;"));
    }

    #[tokio::test]
    async fn test_not_compiled_skips_tests() {
        let harness = Arc::new(ScriptedHarness::default());
        let exec = InProcessExecutor::new(harness.clone(), false);
        let tests = vec![test_case("a"), test_case("b")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 2)).await.unwrap();
        assert!(!set.compiled);
        assert_eq!(set.failing_tests(), 2);
        assert_eq!(harness.run_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failing_test() {
        let harness = Arc::new(ScriptedHarness::passing().with_sleep("slow", Duration::from_millis(300)));
        let exec = InProcessExecutor::new(harness, false);
        let mut slow = test_case("slow");
        slow.timeout = Duration::from_millis(20);
        let tests = vec![slow, test_case("fast")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 1)).await.unwrap();
        assert!(set.compiled);
        assert_eq!(set.failing_tests(), 1);
        assert!(set.results[0].timed_out);
        assert!(set.results[1].passed);
    }

    #[tokio::test]
    async fn test_fail_fast_skips_rest_of_repetition() {
        let harness = Arc::new(ScriptedHarness::passing().with_outcome("a", TestOutcome::Failed("boom".into())));
        let exec = InProcessExecutor::new(harness.clone(), true);
        let tests = vec![test_case("a"), test_case("b"), test_case("c")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 2)).await.unwrap();
        assert_eq!(harness.run_count(), 2);
        assert_eq!(set.results.len(), 6);
        assert_eq!(set.failing_tests(), 3);
        assert_eq!(set.results[1].message.as_deref(), Some("skipped after failure"));
    }
}
