//! 属性包：字符串键 -> 带标签的值，只供报告读取，优化器不读

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 属性键
pub mod keys {
    pub const METHOD_NAME: &str = "MethodName";
    pub const METHOD_INDEX: &str = "MethodIndex";
    pub const PATCH: &str = "Patch";
    pub const PATCH_SIZE: &str = "PatchSize";
    pub const COMPILED: &str = "Compiled";
    pub const ALL_TESTS_PASSED: &str = "AllTestsPassed";
    pub const N_TESTS: &str = "NTests";
    pub const N_PASSED: &str = "NPassed";
    pub const N_FAILED: &str = "NFailed";
    pub const TOTAL_EXECUTION_TIME: &str = "TotalExecutionTime(ms)";
    pub const TIMESTAMP: &str = "TimeStamp";

    /// 第 i 个目标的原始适应度
    pub fn fitness(index: usize) -> String {
        format!("Fitness{}", index)
    }

    /// 第 i 个目标相对基线的改进量（基线 - 候选）
    pub fn fitness_improvement(index: usize) -> String {
        format!("FitnessImprovement{}", index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Flag(bool),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(v) => write!(f, "{}", v),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
            AttributeValue::Flag(v) => write!(f, "{}", v),
            AttributeValue::Timestamp(v) => f.write_str(&v.to_rfc3339()),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        AttributeValue::Integer(i64::from(v))
    }
}

impl From<usize> for AttributeValue {
    fn from(v: usize) -> Self {
        AttributeValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Flag(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(v: DateTime<Utc>) -> Self {
        AttributeValue::Timestamp(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }
}
