//! 随机编辑生成器
//!
//! 问题在生成候选解、变异算子在追加编辑时都经由 EditGenerator 取得新编辑；
//! 随机流由调用方传入，生成器本身无状态。

use rand::{Rng, RngCore};

use crate::core::{GiError, Result};
use crate::edits::{Edit, EditKind};
use crate::model::SourceFile;

/// 编辑生成器：(随机流, 允许的类别, 可编辑源) -> 一个合法编辑。
/// 无法生成任何合法编辑时返回 GiError::EditGeneration，调用方不重试。
pub trait EditGenerator: Send + Sync {
    fn generate(&self, rng: &mut dyn RngCore, kinds: &[EditKind], source: &SourceFile) -> Result<Edit>;
}

/// 在目标方法的可编辑行内均匀选取类别与行号
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLineEditGenerator;

impl RandomLineEditGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl EditGenerator for RandomLineEditGenerator {
    fn generate(&self, rng: &mut dyn RngCore, kinds: &[EditKind], source: &SourceFile) -> Result<Edit> {
        if kinds.is_empty() {
            return Err(GiError::EditGeneration("no edit kinds allowed".to_string()));
        }
        let editable = source.editable_lines();
        if editable.is_empty() {
            return Err(GiError::EditGeneration(format!(
                "{} has no editable lines for {:?}",
                source.path().display(),
                source.methods()
            )));
        }

        let kind = kinds[rng.gen_range(0..kinds.len())];
        let edit = match kind {
            EditKind::LineDeletion => Edit::DeleteLine { line: pick_line(rng, editable) },
            EditKind::LineCopy => Edit::CopyLine {
                from: pick_line(rng, editable),
                to: pick_line(rng, editable),
            },
            EditKind::LineReplacement => Edit::ReplaceLine {
                from: pick_line(rng, editable),
                to: pick_line(rng, editable),
            },
            EditKind::LineSwap => Edit::SwapLine {
                first: pick_line(rng, editable),
                second: pick_line(rng, editable),
            },
        };
        Ok(edit)
    }
}

fn pick_line(rng: &mut dyn RngCore, editable: &[usize]) -> usize {
    editable[rng.gen_range(0..editable.len())]
}
