//! 目标方法与测试用例

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// 测试引用（类名 + 方法名）与超时预算
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TestCase {
    pub class_name: String,
    pub method_name: String,
    pub timeout: Duration,
}

impl TestCase {
    /// 解析 `com.ex.FooTest.testBar`，允许带 ` [..]` 参数后缀
    pub fn parse(reference: &str, timeout: Duration) -> Result<Self, String> {
        let reference = reference.trim();
        let head = match reference.find(" [") {
            Some(idx) => reference[..idx].trim(),
            None => reference,
        };
        match head.rsplit_once('.') {
            Some((class_name, method_name)) if !class_name.is_empty() && !method_name.is_empty() => Ok(Self {
                class_name: class_name.to_string(),
                method_name: method_name.to_string(),
                timeout,
            }),
            _ => Err(format!("Invalid test reference: '{}'", reference)),
        }
    }

    pub fn reference(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} [{}ms]", self.class_name, self.method_name, self.timeout.as_millis())
    }
}

/// 待改进的方法：源文件、类名、全限定签名、测试与运行内唯一的 id。
/// 由清单一次性构建，之后只读；相等性只看 id。
#[derive(Debug, Clone, Serialize)]
pub struct TargetMethod {
    pub id: u32,
    pub source: PathBuf,
    pub class_name: String,
    pub method_name: String,
    pub tests: Vec<TestCase>,
}

impl PartialEq for TargetMethod {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TargetMethod {}

impl Hash for TargetMethod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TargetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.method_name)
    }
}
