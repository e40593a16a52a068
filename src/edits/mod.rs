//! 编辑目录：类别、行级编辑与随机生成器

pub mod generator;
pub mod kind;
pub mod line;

pub use generator::{EditGenerator, RandomLineEditGenerator};
pub use kind::EditKind;
pub use line::Edit;
