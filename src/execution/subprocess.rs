//! 子进程隔离执行策略
//!
//! 补丁后的源码写入一次性的临时目录，编译与测试都通过外部命令模板执行。
//! 命令模板中的占位符：`{source}` `{scratch}` `{classpath}` `{class}` `{test}` `{tests}` `{reps}`。
//!
//! 粒度：
//! - PerTest：每个（重复, 测试）一个进程，退出码 0 即通过，超过该测试的超时即被杀掉；
//! - PerRepetition：每次重复一个进程，运行全部测试；
//! - PerRun：一个进程跑完全部重复。
//!
//! 批量进程逐行汇报结果：`<rep>\t<test ref>\t<PASS|FAIL>\t<nanos>`，其它行忽略。
//! 没有汇报的测试记为失败；批量进程超时被杀时保留已汇报的结果，其余记为超时。
//! 批量进程非零退出（且未超时）视为执行中断。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{ExecutionSettings, TestExecutor, TestRequest};
use crate::core::ExecutionError;
use crate::model::{TestCase, TestResult, TestResultSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    PerRun,
    PerRepetition,
    PerTest,
}

impl Granularity {
    /// 三个开关独立；更细的粒度优先
    pub fn from_flags(in_subprocess: bool, each_repetition: bool, each_test: bool) -> Option<Self> {
        if each_test {
            Some(Granularity::PerTest)
        } else if each_repetition {
            Some(Granularity::PerRepetition)
        } else if in_subprocess {
            Some(Granularity::PerRun)
        } else {
            None
        }
    }
}

/// 进程结束方式
#[derive(Debug)]
enum ProcessOutcome {
    Exited {
        success: bool,
        code: Option<i32>,
        stdout: String,
        stderr: String,
        elapsed: Duration,
    },
    /// stdout 为被杀掉之前已经写出的部分
    TimedOut {
        stdout: String,
        elapsed: Duration,
    },
}

/// 进程退出（或被杀）后等待管道读完的上限；孙进程可能一直占着管道
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

pub struct SubprocessExecutor {
    granularity: Granularity,
    fail_fast: bool,
    compile_command: Vec<String>,
    test_command: Vec<String>,
    compile_timeout: Duration,
    scratch_root: PathBuf,
    working_dir: PathBuf,
}

impl SubprocessExecutor {
    pub fn new(granularity: Granularity, settings: &ExecutionSettings) -> Self {
        Self {
            granularity,
            fail_fast: settings.fail_fast,
            compile_command: settings.compile_command.clone(),
            test_command: settings.test_command.clone(),
            compile_timeout: settings.compile_timeout,
            scratch_root: settings.scratch_root.clone(),
            working_dir: settings.working_dir.clone(),
        }
    }

    /// 补丁源码的落盘位置：<scratch>/<包路径>/<类名>.<扩展名>
    fn patched_source_path(scratch: &Path, target_class: &str, original: &Path) -> PathBuf {
        let outer = target_class.split('$').next().unwrap_or(target_class);
        let mut path = scratch.to_path_buf();
        path.extend(outer.split('.'));
        match original.extension() {
            Some(ext) => path.set_extension(ext),
            None => path.set_extension("java"),
        };
        path
    }

    async fn run_in(&self, scratch: &Path, request: &TestRequest<'_>) -> Result<TestResultSet, ExecutionError> {
        let source_path =
            Self::patched_source_path(scratch, request.target_class, request.patch.source().path());
        if let Some(parent) = source_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&source_path, request.patch.apply()).await?;

        let vars = Placeholders {
            source: source_path.display().to_string(),
            scratch: scratch.display().to_string(),
            classpath: request.classpath.to_string(),
            class: request.target_class.to_string(),
            test: String::new(),
            tests: request.tests.iter().map(TestCase::reference).collect::<Vec<_>>().join(","),
            reps: request.reps.to_string(),
        };

        if !self.compile(&vars).await? {
            return Ok(TestResultSet::not_compiled(request.tests));
        }

        let results = match self.granularity {
            Granularity::PerTest => self.run_per_test(&vars, request).await?,
            Granularity::PerRepetition => {
                let mut results = Vec::new();
                for repetition in 0..request.reps {
                    let vars = Placeholders {
                        reps: "1".to_string(),
                        ..vars.clone()
                    };
                    results.extend(self.run_batch(&vars, request.tests, repetition, 1).await?);
                }
                results
            }
            Granularity::PerRun => self.run_batch(&vars, request.tests, 0, request.reps).await?,
        };
        Ok(TestResultSet::new(true, request.tests.len(), results))
    }

    async fn compile(&self, vars: &Placeholders) -> Result<bool, ExecutionError> {
        if self.compile_command.is_empty() {
            return Ok(true);
        }
        let argv = vars.expand(&self.compile_command);
        match run_process(&argv, &self.working_dir, self.compile_timeout).await? {
            ProcessOutcome::Exited { success, code, stderr, .. } => {
                if !success {
                    tracing::debug!(code = ?code, stderr = %stderr.trim(), "compilation failed");
                }
                Ok(success)
            }
            ProcessOutcome::TimedOut { elapsed, .. } => {
                tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "compilation timed out, treated as not compiled");
                Ok(false)
            }
        }
    }

    async fn run_per_test(
        &self,
        vars: &Placeholders,
        request: &TestRequest<'_>,
    ) -> Result<Vec<TestResult>, ExecutionError> {
        let mut results = Vec::new();
        for repetition in 0..request.reps {
            for (idx, test) in request.tests.iter().enumerate() {
                let vars = Placeholders {
                    test: test.reference(),
                    tests: test.reference(),
                    reps: "1".to_string(),
                    ..vars.clone()
                };
                let argv = vars.expand(&self.test_command);
                let result = match run_process(&argv, &self.working_dir, test.timeout).await? {
                    ProcessOutcome::Exited { success: true, elapsed, .. } => {
                        TestResult::passed(test.clone(), repetition, elapsed)
                    }
                    ProcessOutcome::Exited { code, stdout, elapsed, .. } => TestResult::failed(
                        test.clone(),
                        repetition,
                        elapsed,
                        format!("exit {:?}: {}", code, last_line(&stdout)),
                    ),
                    ProcessOutcome::TimedOut { elapsed, .. } => {
                        TestResult::timed_out(test.clone(), repetition, elapsed)
                    }
                };
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
        Ok(results)
    }

    /// 一个进程跑 reps 次全部测试；first_rep 是报告中 rep 0 对应的重复序号
    async fn run_batch(
        &self,
        vars: &Placeholders,
        tests: &[TestCase],
        first_rep: u32,
        reps: u32,
    ) -> Result<Vec<TestResult>, ExecutionError> {
        let timeout = batch_timeout(tests, reps);
        let argv = vars.expand(&self.test_command);

        let (stdout, timed_out, elapsed) = match run_process(&argv, &self.working_dir, timeout).await? {
            ProcessOutcome::Exited { success: true, stdout, elapsed, .. } => (stdout, false, elapsed),
            ProcessOutcome::Exited { code, stderr, .. } => {
                return Err(ExecutionError::Interrupted(format!(
                    "test process `{}` exited with {:?}: {}",
                    argv.join(" "),
                    code,
                    stderr.trim()
                )));
            }
            ProcessOutcome::TimedOut { stdout, elapsed } => {
                tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "test process timed out, keeping results reported so far"
                );
                (stdout, true, elapsed)
            }
        };

        let by_ref: HashMap<String, &TestCase> = tests.iter().map(|t| (t.reference(), t)).collect();
        let mut reported: HashMap<(u32, String), TestResult> = HashMap::new();
        for line in stdout.lines() {
            let Some(record) = parse_report_line(line)? else {
                continue;
            };
            if record.rep >= reps {
                return Err(ExecutionError::Protocol(format!(
                    "repetition {} out of range in line '{}'",
                    record.rep, line
                )));
            }
            let Some(test) = by_ref.get(&record.reference) else {
                tracing::debug!(reference = %record.reference, "unrequested test in report, ignored");
                continue;
            };
            let repetition = first_rep + record.rep;
            let result = if record.passed {
                TestResult::passed((*test).clone(), repetition, record.elapsed)
            } else {
                TestResult::failed((*test).clone(), repetition, record.elapsed, "reported FAIL")
            };
            reported.insert((record.rep, record.reference), result);
        }

        let mut results = Vec::with_capacity(tests.len() * reps as usize);
        for rep in 0..reps {
            for test in tests {
                let repetition = first_rep + rep;
                let result = match reported.remove(&(rep, test.reference())) {
                    Some(result) => result,
                    None if timed_out => TestResult::timed_out(test.clone(), repetition, elapsed),
                    None => TestResult::failed(test.clone(), repetition, Duration::ZERO, "no result reported"),
                };
                results.push(result);
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl TestExecutor for SubprocessExecutor {
    fn strategy(&self) -> &'static str {
        match self.granularity {
            Granularity::PerRun => "subprocess_per_run",
            Granularity::PerRepetition => "subprocess_per_repetition",
            Granularity::PerTest => "subprocess_per_test",
        }
    }

    async fn execute(&self, request: TestRequest<'_>) -> Result<TestResultSet, ExecutionError> {
        let scratch = self.scratch_root.join(format!("genimprove-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch).await?;

        let result = self.run_in(&scratch, &request).await;

        if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
            tracing::warn!(path = %scratch.display(), error = %e, "failed to remove scratch directory");
        }
        result
    }
}

#[derive(Debug, Clone)]
struct Placeholders {
    source: String,
    scratch: String,
    classpath: String,
    class: String,
    test: String,
    tests: String,
    reps: String,
}

impl Placeholders {
    fn expand(&self, template: &[String]) -> Vec<String> {
        template
            .iter()
            .map(|arg| {
                arg.replace("{source}", &self.source)
                    .replace("{scratch}", &self.scratch)
                    .replace("{classpath}", &self.classpath)
                    .replace("{class}", &self.class)
                    .replace("{tests}", &self.tests)
                    .replace("{test}", &self.test)
                    .replace("{reps}", &self.reps)
            })
            .collect()
    }
}

struct ReportLine {
    rep: u32,
    reference: String,
    passed: bool,
    elapsed: Duration,
}

/// 非四列制表符分隔的行不是报告行；四列但字段非法则为协议错误
fn parse_report_line(line: &str) -> Result<Option<ReportLine>, ExecutionError> {
    let fields: Vec<&str> = line.trim_end().split('\t').collect();
    let [rep, reference, status, nanos] = fields.as_slice() else {
        return Ok(None);
    };
    let bad = |what: &str| ExecutionError::Protocol(format!("bad {} in line '{}'", what, line));
    let rep = rep.trim().parse::<u32>().map_err(|_| bad("repetition"))?;
    let passed = match status.trim() {
        "PASS" => true,
        "FAIL" => false,
        _ => return Err(bad("status")),
    };
    let nanos = nanos.trim().parse::<u64>().map_err(|_| bad("duration"))?;
    Ok(Some(ReportLine {
        rep,
        reference: reference.trim().to_string(),
        passed,
        elapsed: Duration::from_nanos(nanos),
    }))
}

/// 批量进程的超时：全部测试超时之和乘以重复次数，溢出时取上限
fn batch_timeout(tests: &[TestCase], reps: u32) -> Duration {
    tests
        .iter()
        .fold(Duration::ZERO, |acc, t| acc.saturating_add(t.timeout))
        .checked_mul(reps)
        .unwrap_or(Duration::MAX)
}

fn last_line(text: &str) -> &str {
    text.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}

/// 后台持续读取一个管道，读到的内容随时可取
struct OutputCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl OutputCapture {
    fn start<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let reader = pipe.map(|mut pipe| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if let Ok(mut buf) = buffer.lock() {
                                buf.extend_from_slice(&chunk[..n]);
                            }
                        }
                    }
                }
            })
        });
        Self { buffer, reader }
    }

    /// 等读取结束（最多 OUTPUT_GRACE），返回已读到的内容
    async fn finish(mut self) -> String {
        if let Some(mut reader) = self.reader.take() {
            if tokio::time::timeout(OUTPUT_GRACE, &mut reader).await.is_err() {
                reader.abort();
            }
        }
        self.buffer
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).to_string())
            .unwrap_or_default()
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// 运行一个命令并边运行边收集输出；超时则杀掉进程，保留已经写出的 stdout
async fn run_process(argv: &[String], cwd: &Path, timeout: Duration) -> Result<ProcessOutcome, ExecutionError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ExecutionError::Launch {
            command: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(command = %argv.join(" "), "spawning");
    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|source| ExecutionError::Launch {
        command: argv.join(" "),
        source,
    })?;
    let stdout = OutputCapture::start(child.stdout.take());
    let stderr = OutputCapture::start(child.stderr.take());

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => Ok(ProcessOutcome::Exited {
            success: status.success(),
            code: status.code(),
            stdout: stdout.finish().await,
            stderr: stderr.finish().await,
            elapsed: start.elapsed(),
        }),
        Ok(Err(e)) => Err(ExecutionError::Io(e)),
        Err(_) => {
            let elapsed = start.elapsed();
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "kill after timeout failed");
            }
            Ok(ProcessOutcome::TimedOut {
                stdout: stdout.finish().await,
                elapsed,
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::edits::{Edit, EditKind};
    use crate::model::Patch;
    use crate::testing::{sample_source, test_case};

    fn executor(granularity: Granularity, compile: &[&str], test: &[&str], scratch: &Path) -> SubprocessExecutor {
        let settings = ExecutionSettings {
            granularity: Some(granularity),
            fail_fast: false,
            compile_command: compile.iter().map(|s| s.to_string()).collect(),
            test_command: test.iter().map(|s| s.to_string()).collect(),
            compile_timeout: Duration::from_secs(5),
            scratch_root: scratch.to_path_buf(),
            working_dir: scratch.to_path_buf(),
        };
        SubprocessExecutor::new(granularity, &settings)
    }

    fn request<'a>(tests: &'a [TestCase], patch: &'a Patch, reps: u32) -> TestRequest<'a> {
        TestRequest {
            target_class: "example.Small",
            classpath: "lib/a.jar",
            tests,
            patch,
            reps,
        }
    }

    #[test]
    fn test_granularity_flags() {
        assert_eq!(Granularity::from_flags(false, false, false), None);
        assert_eq!(Granularity::from_flags(true, false, false), Some(Granularity::PerRun));
        assert_eq!(Granularity::from_flags(true, true, false), Some(Granularity::PerRepetition));
        assert_eq!(Granularity::from_flags(false, true, true), Some(Granularity::PerTest));
    }

    #[test]
    fn test_patched_source_path() {
        let path = SubprocessExecutor::patched_source_path(
            Path::new("/tmp/s"),
            "example.Small$Inner",
            Path::new("src/example/Small.java"),
        );
        assert_eq!(path, PathBuf::from("/tmp/s/example/Small.java"));
    }

    #[test]
    fn test_report_line_parsing() {
        assert!(parse_report_line("some log output").unwrap().is_none());
        let line = parse_report_line("1\texample.SmallTest.a\tFAIL\t2000000").unwrap().unwrap();
        assert_eq!(line.rep, 1);
        assert_eq!(line.reference, "example.SmallTest.a");
        assert!(!line.passed);
        assert_eq!(line.elapsed, Duration::from_millis(2));
        assert!(matches!(
            parse_report_line("0\tx.Y.z\tMAYBE\t1"),
            Err(ExecutionError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_per_test_uses_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            Granularity::PerTest,
            &[],
            &["sh", "-c", "test \"$0\" = example.SmallTest.good", "{test}"],
            dir.path(),
        );
        let tests = vec![test_case("good"), test_case("bad")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 2)).await.unwrap();
        assert!(set.compiled);
        assert_eq!(set.results.len(), 4);
        assert_eq!(set.failing_tests(), 1);
        assert_eq!(set.passed_count(), 2);
    }

    #[tokio::test]
    async fn test_compile_sees_patched_source_and_scratch_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        // 删除了 `total += v;` 就让编译失败
        let exec = executor(
            Granularity::PerTest,
            &["sh", "-c", "grep -q 'total += v;' \"$0\"", "{source}"],
            &["true"],
            dir.path(),
        );
        let tests = vec![test_case("a"), test_case("b")];
        let mut patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 1)).await.unwrap();
        assert!(set.compiled);

        patch.push(Edit::DeleteLine { line: 7 });
        let set = exec.execute(request(&tests, &patch, 1)).await.unwrap();
        assert!(!set.compiled);
        assert_eq!(set.failing_tests(), 2);

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_per_test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(Granularity::PerTest, &[], &["sleep", "5"], dir.path());
        let mut slow = test_case("slow");
        slow.timeout = Duration::from_millis(100);
        let tests = vec![slow];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 1)).await.unwrap();
        assert!(set.results[0].timed_out);
        assert_eq!(set.failing_tests(), 1);
    }

    #[tokio::test]
    async fn test_batch_protocol_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let script = "for r in $(seq 0 $(($1 - 1))); do \
                      printf '%s\\texample.SmallTest.a\\tPASS\\t1000000\\n' $r; \
                      printf '%s\\texample.SmallTest.b\\tFAIL\\t1000000\\n' $r; \
                      done; echo done";
        let exec = executor(Granularity::PerRun, &[], &["sh", "-c", script, "sh", "{reps}"], dir.path());
        let tests = vec![test_case("a"), test_case("b"), test_case("silent")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 2)).await.unwrap();
        assert_eq!(set.results.len(), 6);
        // b 报告失败，silent 没有汇报
        assert_eq!(set.failing_tests(), 2);
        assert_eq!(set.passed_count(), 2);
        assert_eq!(set.results[3].repetition, 1);
    }

    #[tokio::test]
    async fn test_batch_per_repetition_numbers_repetitions() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            Granularity::PerRepetition,
            &[],
            &["sh", "-c", "printf '0\\texample.SmallTest.a\\tPASS\\t5\\n'"],
            dir.path(),
        );
        let tests = vec![test_case("a")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 3)).await.unwrap();
        let reps: Vec<u32> = set.results.iter().map(|r| r.repetition).collect();
        assert_eq!(reps, vec![0, 1, 2]);
        assert!(set.all_tests_passed());
    }

    #[tokio::test]
    async fn test_batch_nonzero_exit_is_interrupted() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(Granularity::PerRun, &[], &["sh", "-c", "exit 3"], dir.path());
        let tests = vec![test_case("a")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let err = exec.execute(request(&tests, &patch, 1)).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Interrupted(_)));
    }

    #[tokio::test]
    async fn test_batch_timeout_keeps_reported_results() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            Granularity::PerRun,
            &[],
            &["sh", "-c", "printf '0\\texample.SmallTest.a\\tPASS\\t1000\\n'; sleep 5"],
            dir.path(),
        );
        let mut tests = vec![test_case("a"), test_case("b")];
        for t in &mut tests {
            t.timeout = Duration::from_millis(200);
        }
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 1)).await.unwrap();
        assert_eq!(set.results.len(), 2);
        assert!(set.results[0].passed);
        assert!(!set.results[0].timed_out);
        assert!(set.results[1].timed_out);
        assert_eq!(set.failing_tests(), 1);
    }

    #[test]
    fn test_batch_timeout_saturates() {
        let mut huge = test_case("huge");
        huge.timeout = Duration::MAX;
        let tests = vec![huge, test_case("a")];
        assert_eq!(batch_timeout(&tests, 3), Duration::MAX);
        assert_eq!(batch_timeout(&[test_case("a")], 2), Duration::from_millis(1000));
        assert_eq!(batch_timeout(&[], 4), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_per_test_fail_fast_skips_rest_of_repetition() {
        let dir = tempfile::tempdir().unwrap();
        let mut exec = executor(
            Granularity::PerTest,
            &[],
            &["sh", "-c", "test \"$0\" = example.SmallTest.good", "{test}"],
            dir.path(),
        );
        exec.fail_fast = true;
        let tests = vec![test_case("bad"), test_case("good"), test_case("also_good")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let set = exec.execute(request(&tests, &patch, 2)).await.unwrap();
        assert_eq!(set.results.len(), 6);
        assert_eq!(set.passed_count(), 0);
        assert_eq!(set.failing_tests(), 3);
        assert_eq!(set.results[1].message.as_deref(), Some("skipped after failure"));
        assert_eq!(set.results[2].execution_time, Duration::ZERO);
        assert_eq!(set.results[3].repetition, 1);
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(Granularity::PerTest, &[], &["/definitely/not/a/binary"], dir.path());
        let tests = vec![test_case("a")];
        let patch = Patch::new(sample_source(&EditKind::ALL));

        let err = exec.execute(request(&tests, &patch, 1)).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Launch { .. }));
    }
}
