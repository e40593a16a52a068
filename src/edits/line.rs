//! 行级编辑
//!
//! 编辑只引用原始文件的行号（0 起），应用时作用在「行槽」上：每个原始行对应一个槽，
//! 槽内容可以被清空、替换、插入或与其他槽交换。因此任何编辑都不会因先前编辑而失效，
//! 应用顺序只决定槽的最终内容。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::EditKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edit {
    /// 清空该行
    DeleteLine { line: usize },
    /// 把 from 的原始文本插入到 to 之前
    CopyLine { from: usize, to: usize },
    /// 用 from 的原始文本替换 to
    ReplaceLine { from: usize, to: usize },
    /// 交换两个槽的内容
    SwapLine { first: usize, second: usize },
}

impl Edit {
    pub fn kind(&self) -> EditKind {
        match self {
            Edit::DeleteLine { .. } => EditKind::LineDeletion,
            Edit::CopyLine { .. } => EditKind::LineCopy,
            Edit::ReplaceLine { .. } => EditKind::LineReplacement,
            Edit::SwapLine { .. } => EditKind::LineSwap,
        }
    }

    /// 在行槽上应用；行号越界（不属于该源文件）时返回 false 且不做修改
    pub fn apply(&self, original: &[String], slots: &mut [Vec<String>]) -> bool {
        let in_range = |line: usize| line < original.len() && line < slots.len();
        match *self {
            Edit::DeleteLine { line } => {
                if !in_range(line) {
                    return false;
                }
                slots[line].clear();
            }
            Edit::CopyLine { from, to } => {
                if !in_range(from) || !in_range(to) {
                    return false;
                }
                slots[to].insert(0, original[from].clone());
            }
            Edit::ReplaceLine { from, to } => {
                if !in_range(from) || !in_range(to) {
                    return false;
                }
                slots[to] = vec![original[from].clone()];
            }
            Edit::SwapLine { first, second } => {
                if !in_range(first) || !in_range(second) {
                    return false;
                }
                slots.swap(first, second);
            }
        }
        true
    }
}

/// 行号按 1 起显示，便于与编辑器对照
impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::DeleteLine { line } => write!(f, "DeleteLine L{}", line + 1),
            Edit::CopyLine { from, to } => write!(f, "CopyLine L{} -> L{}", from + 1, to + 1),
            Edit::ReplaceLine { from, to } => {
                write!(f, "ReplaceLine L{} -> L{}", from + 1, to + 1)
            }
            Edit::SwapLine { first, second } => {
                write!(f, "SwapLine L{} <-> L{}", first + 1, second + 1)
            }
        }
    }
}
