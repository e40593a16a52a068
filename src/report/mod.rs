//! 结果导出
//!
//! 在输出目录写四个 CSV：
//! - FUN.csv：每个解一行目标值（被标记为最大化的目标取反）
//! - VAR.csv：每个解一行编辑
//! - TIME.csv：各次评估耗时（毫秒），一行
//! - PATCH.csv：表头 + 每个解一行属性，缺失的属性留空

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{GiError, Result};
use crate::solution::{keys, CandidateSolution};

pub const FUN_FILE: &str = "FUN.csv";
pub const VAR_FILE: &str = "VAR.csv";
pub const TIME_FILE: &str = "TIME.csv";
pub const PATCH_FILE: &str = "PATCH.csv";

/// PATCH.csv 的默认列
pub fn default_patch_columns(objectives: usize) -> Vec<String> {
    let mut columns: Vec<String> = [
        keys::METHOD_NAME,
        keys::METHOD_INDEX,
        keys::PATCH,
        keys::PATCH_SIZE,
        keys::COMPILED,
        keys::ALL_TESTS_PASSED,
        keys::N_TESTS,
        keys::N_PASSED,
        keys::N_FAILED,
        keys::TOTAL_EXECUTION_TIME,
    ]
    .iter()
    .map(|k| k.to_string())
    .collect();
    columns.extend((0..objectives).map(keys::fitness));
    columns.extend((0..objectives).map(keys::fitness_improvement));
    columns.push(keys::TIMESTAMP.to_string());
    columns
}

#[derive(Debug, Clone)]
pub struct ResultsPrinter {
    output_dir: PathBuf,
    separator: u8,
    /// None 表示全部目标都是最小化
    minimize: Option<Vec<bool>>,
    patch_columns: Vec<String>,
}

impl ResultsPrinter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            separator: b',',
            minimize: None,
            patch_columns: default_patch_columns(2),
        }
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_minimize(mut self, minimize: Vec<bool>) -> Self {
        self.minimize = Some(minimize);
        self
    }

    pub fn with_patch_columns(mut self, columns: Vec<String>) -> Self {
        self.patch_columns = columns;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn print(&self, solutions: &[CandidateSolution], times_ms: &[u64]) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        self.write_objectives(solutions)?;
        self.write_variables(solutions)?;
        self.write_times(times_ms)?;
        self.write_patches(solutions)?;
        tracing::info!(
            dir = %self.output_dir.display(),
            solutions = solutions.len(),
            "results written"
        );
        Ok(())
    }

    fn writer(&self, name: &str) -> Result<csv::Writer<fs::File>> {
        Ok(csv::WriterBuilder::new()
            .delimiter(self.separator)
            .flexible(true)
            .has_headers(false)
            .from_path(self.output_dir.join(name))?)
    }

    fn write_objectives(&self, solutions: &[CandidateSolution]) -> Result<()> {
        let mut w = self.writer(FUN_FILE)?;
        for (i, solution) in solutions.iter().enumerate() {
            let count = solution.number_of_objectives();
            if let Some(minimize) = &self.minimize {
                if minimize.len() != count {
                    return Err(GiError::Report(format!(
                        "minimize flags cover {} objectives, solution {} has {}",
                        minimize.len(),
                        i,
                        count
                    )));
                }
            }
            let row: Vec<String> = solution
                .objectives()
                .iter()
                .enumerate()
                .map(|(j, v)| {
                    let minimized = self
                        .minimize
                        .as_ref()
                        .and_then(|m| m.get(j).copied())
                        .unwrap_or(true);
                    let value = if minimized { *v } else { -v };
                    value.to_string()
                })
                .collect();
            w.write_record(&row)?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_variables(&self, solutions: &[CandidateSolution]) -> Result<()> {
        let mut w = self.writer(VAR_FILE)?;
        for solution in solutions {
            w.write_record(solution.variables().iter().map(|e| e.to_string()))?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_times(&self, times_ms: &[u64]) -> Result<()> {
        let mut w = self.writer(TIME_FILE)?;
        w.write_record(times_ms.iter().map(|t| t.to_string()))?;
        w.flush()?;
        Ok(())
    }

    fn write_patches(&self, solutions: &[CandidateSolution]) -> Result<()> {
        if solutions.is_empty() || self.patch_columns.is_empty() {
            return Ok(());
        }
        let mut w = self.writer(PATCH_FILE)?;
        w.write_record(&self.patch_columns)?;
        for solution in solutions {
            w.write_record(self.patch_columns.iter().map(|column| {
                solution
                    .attribute(column)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }))?;
        }
        w.flush()?;
        Ok(())
    }
}
