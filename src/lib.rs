//! genimprove - 多目标遗传改进引擎
//!
//! 以补丁（有序的源码编辑序列）为个体，编译并运行目标方法的测试来评估，
//! 在补丁大小、正确性与运行时间之间给出折中。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **edits**: 编辑类别、行级编辑与随机编辑生成器
//! - **model**: 源表示、补丁、目标方法、测试用例与测试结果
//! - **solution**: 候选解（补丁 + 目标 + 约束 + 属性）
//! - **operators**: 均匀补丁交叉、随机补丁变异
//! - **execution**: 测试执行服务（进程内 / 子进程）
//! - **problem**: 改进问题（目标方法游标、基线、评估）
//! - **report**: FUN / VAR / TIME / PATCH 结果导出
//! - **sampler**: 采样驱动

pub mod config;
pub mod core;
pub mod edits;
pub mod execution;
pub mod model;
pub mod observability;
pub mod operators;
pub mod problem;
pub mod report;
pub mod sampler;
pub mod solution;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::core::{ExecutionError, GiError, Result};
pub use problem::{ImprovementProblem, Problem};
pub use solution::CandidateSolution;
