//! 补丁：绑定到一个源表示的有序、可变长编辑序列
//!
//! 克隆时深拷贝编辑序列，源表示通过 Arc 共享（只读）。空补丁即原始程序（基线）。

use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use crate::core::{GiError, Result};
use crate::edits::{Edit, EditGenerator, EditKind};
use crate::model::source::{join_lines, SourceFile};

#[derive(Debug, Clone)]
pub struct Patch {
    source: Arc<SourceFile>,
    edits: Vec<Edit>,
}

impl Patch {
    pub fn new(source: Arc<SourceFile>) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    pub fn source(&self) -> &Arc<SourceFile> {
        &self.source
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Edit> {
        let len = self.edits.len();
        self.edits
            .get(index)
            .ok_or(GiError::VariableIndexOutOfRange { index, len })
    }

    pub fn set(&mut self, index: usize, edit: Edit) -> Result<()> {
        let len = self.edits.len();
        let slot = self
            .edits
            .get_mut(index)
            .ok_or(GiError::VariableIndexOutOfRange { index, len })?;
        *slot = edit;
        Ok(())
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// 追加一个从 kinds 中随机抽取的编辑
    pub fn add_random_edit(
        &mut self,
        rng: &mut dyn RngCore,
        kinds: &[EditKind],
        generator: &dyn EditGenerator,
    ) -> Result<()> {
        let edit = generator.generate(rng, kinds, &self.source)?;
        self.edits.push(edit);
        Ok(())
    }

    /// 依次应用所有编辑，返回修改后的源文本
    pub fn apply(&self) -> String {
        let original = self.source.lines();
        let mut slots: Vec<Vec<String>> = original.iter().map(|l| vec![l.clone()]).collect();
        for edit in &self.edits {
            if !edit.apply(original, &mut slots) {
                tracing::debug!(edit = %edit, path = %self.source.path().display(), "edit out of range, skipped");
            }
        }
        join_lines(slots.iter().flatten())
    }
}

/// 两个补丁相等：同一源文件上的相同编辑序列
impl PartialEq for Patch {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.source, &other.source) || self.source.path() == other.source.path())
            && self.edits == other.edits
    }
}

/// 人类可读形式：`| DeleteLine L3 | SwapLine L4 <-> L6 |`，空补丁为 `|`
impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("|")?;
        for edit in &self.edits {
            write!(f, " {} |", edit)?;
        }
        Ok(())
    }
}
