//! 单元测试公用夹具

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::RngCore;

use crate::edits::EditKind;
use crate::core::ExecutionError;
use crate::execution::{TestHarness, TestOutcome};
use crate::model::{SourceFile, TestCase};

pub const SAMPLE_METHOD: &str = "example.Small.sum(int[])";

pub const SAMPLE_JAVA: &str = "package example;

public class Small {

    public int sum(int[] values) {
        int total = 0;
        for (int v : values) {
            total += v;
        }
        return total;
    }

    public int twice(int x) {
        return sum(new int[] {x, x});
    }
}
";

pub fn sample_source(kinds: &[EditKind]) -> Arc<SourceFile> {
    Arc::new(
        SourceFile::from_text("Small.java", SAMPLE_JAVA, &[SAMPLE_METHOD.to_string()], kinds)
            .expect("sample source parses"),
    )
}

pub fn test_case(name: &str) -> TestCase {
    TestCase::parse(&format!("example.SmallTest.{}", name), Duration::from_millis(500)).expect("valid reference")
}

/// 依次返回 0、u64::MAX、0 ...：gen::<f64>() 交替得到 0.0 与接近 1.0 的值
#[derive(Debug, Default)]
pub struct AlternatingRng {
    count: u64,
}

impl RngCore for AlternatingRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = if self.count % 2 == 0 { 0 } else { u64::MAX };
        self.count += 1;
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// 脚本化测试桩：编译结论固定，按测试方法名给出结果，未登记的测试通过
#[derive(Debug, Default)]
pub struct ScriptedHarness {
    pub compiles: bool,
    pub outcomes: HashMap<String, TestOutcome>,
    pub sleep: HashMap<String, Duration>,
    pub compiled_texts: Mutex<Vec<String>>,
    pub runs: Mutex<Vec<String>>,
}

impl ScriptedHarness {
    pub fn passing() -> Self {
        Self {
            compiles: true,
            ..Default::default()
        }
    }

    pub fn with_outcome(mut self, method: &str, outcome: TestOutcome) -> Self {
        self.outcomes.insert(method.to_string(), outcome);
        self
    }

    pub fn with_sleep(mut self, method: &str, duration: Duration) -> Self {
        self.sleep.insert(method.to_string(), duration);
        self
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl TestHarness for ScriptedHarness {
    fn compile(&self, _class_name: &str, _classpath: &str, source: &str) -> Result<bool, ExecutionError> {
        if let Ok(mut texts) = self.compiled_texts.lock() {
            texts.push(source.to_string());
        }
        Ok(self.compiles)
    }

    fn run_test(&self, test: &TestCase) -> Result<TestOutcome, ExecutionError> {
        if let Ok(mut runs) = self.runs.lock() {
            runs.push(test.method_name.clone());
        }
        if let Some(duration) = self.sleep.get(&test.method_name) {
            std::thread::sleep(*duration);
        }
        Ok(self
            .outcomes
            .get(&test.method_name)
            .cloned()
            .unwrap_or(TestOutcome::Passed))
    }
}
