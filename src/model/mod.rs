//! 数据模型：源表示、补丁、目标方法、测试用例与测试结果

pub mod patch;
pub mod results;
pub mod source;
pub mod target;

pub use patch::Patch;
pub use results::{TestResult, TestResultSet};
pub use source::{LineSourceBuilder, SourceBuilder, SourceFile};
pub use target::{TargetMethod, TestCase};
