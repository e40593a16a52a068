//! 编辑类别：配置中的 edit_types 名称解析为 EditKind 列表

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::GiError;

/// 原子编辑的类别（行级编辑目录）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EditKind {
    LineDeletion,
    LineCopy,
    LineReplacement,
    LineSwap,
}

impl EditKind {
    pub const ALL: [EditKind; 4] = [
        EditKind::LineDeletion,
        EditKind::LineCopy,
        EditKind::LineReplacement,
        EditKind::LineSwap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EditKind::LineDeletion => "LINE_DELETION",
            EditKind::LineCopy => "LINE_COPY",
            EditKind::LineReplacement => "LINE_REPLACEMENT",
            EditKind::LineSwap => "LINE_SWAP",
        }
    }

    /// 解析配置中的类别名列表：大小写不敏感，`-` 与 `_` 等价，组名 `LINE` 展开为全部行级编辑。
    /// 结果去重并保持首次出现的顺序；空列表或未知名称为配置错误。
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<EditKind>, GiError> {
        if names.is_empty() {
            return Err(GiError::Config("edit_types must name at least one edit kind".to_string()));
        }
        let mut kinds = Vec::new();
        for name in names {
            let normalized = normalize(name.as_ref());
            let expanded: Vec<EditKind> = if normalized == "LINE" {
                Self::ALL.to_vec()
            } else {
                vec![normalized.parse()?]
            };
            for kind in expanded {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        Ok(kinds)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase().replace('-', "_")
}

impl FromStr for EditKind {
    type Err = GiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| GiError::Config(format!("Invalid edit type: '{}'", s.trim())))
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
