//! 错误类型
//!
//! 三类失败分开处理：
//! - 配置 / 解析错误（GiError::Config、Manifest、SourceNotFound ...）在构造期直接返回给调用方，搜索不会开始；
//! - 执行环境错误（ExecutionError）表示基础设施失败，由入口程序终止整个进程；
//! - 候选补丁自身的失败（编译失败、测试失败、超时）不是错误，编码为哨兵目标值与非零约束。

use std::path::PathBuf;

use thiserror::Error;

/// 引擎层错误
#[derive(Error, Debug)]
pub enum GiError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Manifest error in {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("Cannot find source for class: {0}")]
    SourceNotFound(String),

    #[error("Cannot parse source {path}: {message}")]
    SourceParse { path: PathBuf, message: String },

    #[error("Duplicate method IDs in the input file: {0}")]
    DuplicateMethodId(u32),

    /// 清单为空、忘记调用 advance()，或游标已越过最后一个方法
    #[error("There is no target method. Either the method file is empty, or advance() was not called")]
    NoTargetMethod,

    /// 计算改进量前必须先评估当前目标方法的空补丁
    #[error("Baseline of target method {0} has not been evaluated yet")]
    BaselineNotEvaluated(u32),

    /// 候选解属于另一个目标方法（候选解不跨方法共享）
    #[error("Candidate does not belong to the current target method {0}")]
    ForeignCandidate(u32),

    #[error("Variable index {index} out of range (patch has {len} edits)")]
    VariableIndexOutOfRange { index: usize, len: usize },

    #[error("Crossover requires exactly 2 parents, got {0}")]
    ParentCount(usize),

    /// 无法生成任何合法编辑：致命，不重试
    #[error("Edit generation failed: {0}")]
    EditGeneration(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Report error: {0}")]
    Report(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 测试执行基础设施错误：不可恢复，入口程序据此以非零码退出
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Scratch workspace IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Test execution interrupted: {0}")]
    Interrupted(String),

    #[error("Malformed harness output: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, GiError>;
