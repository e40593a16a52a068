//! 方法清单读取与源文件定位
//!
//! 清单是带表头的 CSV：必需列 `Method`（全限定签名）与 `Tests`（逗号分隔的测试引用），
//! 可选列 `MethodIndex`（缺省为 1 起的行号）。重复的方法 id 是致命错误。

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use walkdir::WalkDir;

use crate::core::{GiError, Result};
use crate::model::{TargetMethod, TestCase};

const METHOD_COLUMN: &str = "Method";
const TESTS_COLUMN: &str = "Tests";
const INDEX_COLUMN: &str = "MethodIndex";
const TEST_SEPARATOR: char = ',';

#[derive(Debug, Clone)]
pub struct Manifest {
    /// 按清单顺序
    pub methods: Vec<TargetMethod>,
    /// 所有方法的测试去重后的集合
    pub tests: HashSet<TestCase>,
}

/// 由类名找源文件：先按源码根与包路径拼出路径，找不到再在项目目录下按文件名搜索
#[derive(Debug, Clone)]
pub struct SourceLocator {
    project_dir: PathBuf,
    roots: Vec<String>,
    extension: String,
}

impl SourceLocator {
    pub fn new(project_dir: impl Into<PathBuf>, roots: &[String], extension: &str) -> Self {
        Self {
            project_dir: project_dir.into(),
            roots: roots.to_vec(),
            extension: extension.to_string(),
        }
    }

    pub fn locate(&self, class_name: &str) -> Result<PathBuf> {
        let outer = class_name.split('$').next().unwrap_or(class_name);
        let relative: PathBuf = {
            let mut p: PathBuf = outer.split('.').collect();
            p.set_extension(&self.extension);
            p
        };

        for root in &self.roots {
            let candidate = self.project_dir.join(root).join(&relative);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        let Some(file_name) = relative.file_name() else {
            return Err(GiError::SourceNotFound(class_name.to_string()));
        };
        let found: Vec<PathBuf> = WalkDir::new(&self.project_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == file_name)
            .map(|e| e.into_path())
            .collect();

        let found = if found.len() > 1 {
            found.into_iter().filter(|p| p.ends_with(&relative)).collect()
        } else {
            found
        };
        match found.as_slice() {
            [only] => Ok(only.clone()),
            [] => Err(GiError::SourceNotFound(class_name.to_string())),
            many => {
                tracing::error!(class = %class_name, count = many.len(), "several source files match");
                Err(GiError::SourceNotFound(format!(
                    "{} (ambiguous: {} candidates under {})",
                    class_name,
                    many.len(),
                    self.project_dir.display()
                )))
            }
        }
    }
}

/// 从签名取类名：先截掉参数列表（参数类型里也有点号），再取最后一个 `.` 之前的部分
pub fn class_name_of(signature: &str) -> Option<&str> {
    let head = signature.split('(').next().unwrap_or(signature).trim();
    head.rsplit_once('.').map(|(class, _)| class).filter(|c| !c.is_empty())
}

pub fn read_manifest(path: &Path, timeout: Duration, locator: &SourceLocator) -> Result<Manifest> {
    let manifest_err = |message: String| GiError::Manifest {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| manifest_err(e.to_string()))?;

    let headers = reader.headers().map_err(|e| manifest_err(e.to_string()))?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(method_col), Some(tests_col)) = (column(METHOD_COLUMN), column(TESTS_COLUMN)) else {
        return Err(manifest_err(format!(
            "Both \"{}\" and \"{}\" fields are required in the method file",
            METHOD_COLUMN, TESTS_COLUMN
        )));
    };
    let index_col = column(INDEX_COLUMN);

    let mut methods = Vec::new();
    let mut seen: HashMap<u32, usize> = HashMap::new();
    let mut tests = HashSet::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| manifest_err(e.to_string()))?;
        let line = row + 2;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let signature = field(method_col);
        if signature.is_empty() {
            return Err(manifest_err(format!("line {}: empty Method", line)));
        }

        let mut method_tests = Vec::new();
        for reference in field(tests_col).split(TEST_SEPARATOR).filter(|r| !r.trim().is_empty()) {
            let test = TestCase::parse(reference, timeout).map_err(|e| manifest_err(format!("line {}: {}", line, e)))?;
            tests.insert(test.clone());
            method_tests.push(test);
        }
        if method_tests.is_empty() {
            return Err(manifest_err(format!("line {}: no tests for {}", line, signature)));
        }

        let class_name = class_name_of(signature)
            .ok_or_else(|| manifest_err(format!("line {}: cannot derive class from '{}'", line, signature)))?;
        let source = locator.locate(class_name)?;

        let id = match index_col.map(field).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| manifest_err(format!("line {}: invalid MethodIndex '{}'", line, raw)))?,
            None => (row + 1) as u32,
        };
        if seen.insert(id, line).is_some() {
            return Err(GiError::DuplicateMethodId(id));
        }

        methods.push(TargetMethod {
            id,
            source,
            class_name: class_name.to_string(),
            method_name: signature.to_string(),
            tests: method_tests,
        });
    }

    tracing::info!(
        path = %path.display(),
        methods = methods.len(),
        tests = tests.len(),
        "method file loaded"
    );
    Ok(Manifest { methods, tests })
}
