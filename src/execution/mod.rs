//! 测试执行服务
//!
//! 把补丁应用到目标类上，编译并运行该方法的测试，返回 TestResultSet。
//! 两种策略可互换：进程内（由嵌入程序提供 TestHarness）与子进程隔离（外部命令模板）。
//! 超时与崩溃由策略自己处理；基础设施失败以 ExecutionError 返回，调用方不重试。

pub mod in_process;
pub mod subprocess;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

pub use in_process::{InProcessExecutor, TestHarness, TestOutcome};
pub use subprocess::{Granularity, SubprocessExecutor};

use crate::core::{ExecutionError, GiError, Result};
use crate::model::{Patch, TestCase, TestResultSet};

/// 一次执行请求
#[derive(Debug, Clone, Copy)]
pub struct TestRequest<'a> {
    pub target_class: &'a str,
    pub classpath: &'a str,
    pub tests: &'a [TestCase],
    pub patch: &'a Patch,
    pub reps: u32,
}

#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// 策略名，写入审计记录
    fn strategy(&self) -> &'static str;

    async fn execute(&self, request: TestRequest<'_>) -> std::result::Result<TestResultSet, ExecutionError>;
}

/// 执行并写一条审计记录（JSON），出错时同样记录
pub async fn run_audited(
    executor: &dyn TestExecutor,
    request: TestRequest<'_>,
) -> std::result::Result<TestResultSet, ExecutionError> {
    let start = Instant::now();
    let result = executor.execute(request).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let audit = match &result {
        Ok(set) => serde_json::json!({
            "event": "test_audit",
            "strategy": executor.strategy(),
            "class": request.target_class,
            "tests": request.tests.len(),
            "reps": request.reps,
            "patch_size": request.patch.len(),
            "ok": true,
            "compiled": set.compiled,
            "passed": set.passed_count(),
            "failed": set.failed_count(),
            "duration_ms": duration_ms,
        }),
        Err(e) => serde_json::json!({
            "event": "test_audit",
            "strategy": executor.strategy(),
            "class": request.target_class,
            "tests": request.tests.len(),
            "reps": request.reps,
            "patch_size": request.patch.len(),
            "ok": false,
            "error": e.to_string(),
            "duration_ms": duration_ms,
        }),
    };
    tracing::info!(audit = %audit.to_string(), "test run");
    result
}

/// 构造执行策略所需的设置（来自 [problem] 与 [executor] 段）
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// None 表示进程内执行
    pub granularity: Option<Granularity>,
    pub fail_fast: bool,
    pub compile_command: Vec<String>,
    pub test_command: Vec<String>,
    pub compile_timeout: Duration,
    pub scratch_root: PathBuf,
    /// 外部命令的工作目录（项目目录）
    pub working_dir: PathBuf,
}

/// 任一子进程开关打开即用子进程策略；否则用进程内策略，此时必须提供 harness
pub fn executor_from_settings(
    settings: &ExecutionSettings,
    harness: Option<Arc<dyn TestHarness>>,
) -> Result<Arc<dyn TestExecutor>> {
    match (settings.granularity, harness) {
        (Some(granularity), _) => {
            if settings.test_command.is_empty() {
                return Err(GiError::Config(
                    "executor.test_command is required when tests run in a subprocess".to_string(),
                ));
            }
            Ok(Arc::new(SubprocessExecutor::new(granularity, settings)))
        }
        (None, Some(harness)) => Ok(Arc::new(InProcessExecutor::new(harness, settings.fail_fast))),
        (None, None) => Err(GiError::Config(
            "in-process execution needs a test harness; enable one of the subprocess flags instead".to_string(),
        )),
    }
}
