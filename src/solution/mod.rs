//! 候选解：补丁 + 目标向量 + 约束向量 + 属性包
//!
//! 优化器把候选解当作定长个体看待，这里用按下标读写的适配层包住可增长的编辑序列：
//! 变量个数每次查询都取当前编辑数，不缓存。目标越小越好；约束为 0 表示可行。

pub mod attributes;

use std::sync::Arc;

pub use attributes::{keys, AttributeValue, Attributes};

use crate::core::Result;
use crate::edits::Edit;
use crate::model::{Patch, SourceFile};

/// clone() 即复制：深拷贝补丁、目标、约束与属性，与源对象不共享任何可变状态
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSolution {
    patch: Patch,
    objectives: Vec<f64>,
    constraints: Vec<f64>,
    attributes: Attributes,
}

impl CandidateSolution {
    /// 空补丁候选解，目标与约束初始化为 0
    pub fn new(objectives: usize, constraints: usize, source: Arc<SourceFile>) -> Self {
        Self::from_patch(objectives, constraints, Patch::new(source))
    }

    pub fn from_patch(objectives: usize, constraints: usize, patch: Patch) -> Self {
        Self {
            patch,
            objectives: vec![0.0; objectives],
            constraints: vec![0.0; constraints],
            attributes: Attributes::new(),
        }
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn patch_mut(&mut self) -> &mut Patch {
        &mut self.patch
    }

    /// 变量个数 == 当前编辑数，可能在两次调用之间变化
    pub fn number_of_variables(&self) -> usize {
        self.patch.len()
    }

    pub fn variables(&self) -> &[Edit] {
        self.patch.edits()
    }

    pub fn variable(&self, index: usize) -> Result<&Edit> {
        self.patch.get(index)
    }

    pub fn set_variable(&mut self, index: usize, edit: Edit) -> Result<()> {
        self.patch.set(index, edit)
    }

    pub fn number_of_objectives(&self) -> usize {
        self.objectives.len()
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// # Panics
    /// 下标超出目标个数时 panic（目标个数由问题固定）
    pub fn objective(&self, index: usize) -> f64 {
        self.objectives[index]
    }

    /// # Panics
    /// 同 [`CandidateSolution::objective`]
    pub fn set_objective(&mut self, index: usize, value: f64) {
        self.objectives[index] = value;
    }

    pub fn number_of_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    pub fn constraint(&self, index: usize) -> Option<f64> {
        self.constraints.get(index).copied()
    }

    /// 无约束的问题变体上忽略写入
    pub fn set_constraint(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.constraints.get_mut(index) {
            *slot = value;
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|c| *c == 0.0)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.set(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::EditKind;
    use crate::testing::sample_source;

    fn candidate_with(edits: &[Edit]) -> CandidateSolution {
        let mut c = CandidateSolution::new(2, 1, sample_source(&EditKind::ALL));
        for e in edits {
            c.patch_mut().push(e.clone());
        }
        c
    }

    #[test]
    fn test_variable_count_tracks_patch() {
        let mut c = candidate_with(&[]);
        assert_eq!(c.number_of_variables(), 0);
        c.patch_mut().push(Edit::DeleteLine { line: 5 });
        c.patch_mut().push(Edit::DeleteLine { line: 6 });
        assert_eq!(c.number_of_variables(), c.patch().len());
        assert_eq!(c.number_of_variables(), 2);
    }

    #[test]
    fn test_get_set_delegate_to_patch() {
        let mut c = candidate_with(&[Edit::DeleteLine { line: 5 }]);
        c.set_variable(0, Edit::SwapLine { first: 5, second: 6 }).unwrap();
        assert_eq!(c.variable(0).unwrap(), &Edit::SwapLine { first: 5, second: 6 });
        assert!(c.variable(1).is_err());
        assert!(c.set_variable(1, Edit::DeleteLine { line: 5 }).is_err());
    }

    #[test]
    fn test_copy_shares_no_mutable_state() {
        let mut original = candidate_with(&[Edit::DeleteLine { line: 5 }]);
        original.set_objective(0, 1.0);
        original.set_objective(1, 42.0);
        original.set_constraint(0, 2.0);
        original.set_attribute(keys::PATCH, original.patch().to_string());

        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert_eq!(copy.variables(), original.variables());

        copy.patch_mut().push(Edit::DeleteLine { line: 6 });
        copy.set_variable(0, Edit::DeleteLine { line: 9 }).unwrap();
        copy.set_objective(1, 0.0);
        copy.set_attribute(keys::PATCH, "changed");

        assert_eq!(original.number_of_variables(), 1);
        assert_eq!(original.variable(0).unwrap(), &Edit::DeleteLine { line: 5 });
        assert_eq!(original.objective(1), 42.0);
        assert_eq!(original.attribute(keys::PATCH).unwrap().to_string(), "| DeleteLine L6 |");
    }

    #[test]
    fn test_constraint_free_variant_ignores_writes() {
        let mut c = CandidateSolution::new(2, 0, sample_source(&EditKind::ALL));
        c.set_constraint(0, 3.0);
        assert_eq!(c.constraint(0), None);
        assert!(c.is_feasible());
    }
}
