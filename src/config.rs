//! 应用配置：从 config/default.toml、显式文件与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `GI__*` 覆盖（双下划线表示嵌套，如 `GI__PROBLEM__REPS=5`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::{GiError, Result};
use crate::edits::EditKind;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub problem: ProblemSection,
    pub executor: ExecutorSection,
    pub operators: OperatorsSection,
    pub sampler: SamplerSection,
}

/// [problem] 段：项目、清单、测试执行方式与编辑类别
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemSection {
    /// 被改进项目的根目录
    pub project_dir: Option<PathBuf>,
    /// 方法清单 CSV（相对路径相对于当前目录）
    pub method_file: Option<PathBuf>,
    #[serde(default)]
    pub classpath: String,
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// 每个测试用例的超时（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_reps")]
    pub reps: u32,
    #[serde(default)]
    pub in_subprocess: bool,
    #[serde(default)]
    pub each_repetition_in_new_subprocess: bool,
    #[serde(default)]
    pub each_test_in_new_subprocess: bool,
    /// 某次重复中首个测试失败后跳过其余测试
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default = "default_edit_types")]
    pub edit_types: Vec<String>,
    /// 问题随机流种子；未设置时取熵
    pub seed: Option<u64>,
    /// 0 = 无约束变体，1 = 带失败测试数约束
    #[serde(default = "default_constraints")]
    pub constraints: usize,
}

impl Default for ProblemSection {
    fn default() -> Self {
        Self {
            project_dir: None,
            method_file: None,
            classpath: String::new(),
            source_roots: default_source_roots(),
            source_extension: default_source_extension(),
            timeout_ms: default_timeout_ms(),
            reps: default_reps(),
            in_subprocess: false,
            each_repetition_in_new_subprocess: false,
            each_test_in_new_subprocess: false,
            fail_fast: false,
            edit_types: default_edit_types(),
            seed: None,
            constraints: default_constraints(),
        }
    }
}

fn default_source_roots() -> Vec<String> {
    vec![".".to_string(), "src/main/java".to_string(), "src".to_string()]
}

fn default_source_extension() -> String {
    "java".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_reps() -> u32 {
    1
}

fn default_edit_types() -> Vec<String> {
    vec!["LINE".to_string()]
}

fn default_constraints() -> usize {
    1
}

/// [executor] 段：子进程策略的命令模板
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSection {
    /// 为空表示不单独编译（测试命令自己负责）
    #[serde(default)]
    pub compile_command: Vec<String>,
    #[serde(default)]
    pub test_command: Vec<String>,
    #[serde(default = "default_compile_timeout_ms")]
    pub compile_timeout_ms: u64,
    /// 临时目录根，未设置时用系统临时目录
    pub scratch_root: Option<PathBuf>,
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            compile_command: Vec::new(),
            test_command: Vec::new(),
            compile_timeout_ms: default_compile_timeout_ms(),
            scratch_root: None,
        }
    }
}

fn default_compile_timeout_ms() -> u64 {
    60_000
}

/// [operators] 段
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorsSection {
    #[serde(default = "default_crossover_probability")]
    pub crossover_probability: f64,
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: f64,
    /// 算子随机流种子（与问题的随机流独立）
    pub seed: Option<u64>,
}

impl Default for OperatorsSection {
    fn default() -> Self {
        Self {
            crossover_probability: default_crossover_probability(),
            mutation_probability: default_mutation_probability(),
            seed: None,
        }
    }
}

fn default_crossover_probability() -> f64 {
    1.0
}

fn default_mutation_probability() -> f64 {
    0.8
}

/// [sampler] 段：采样驱动
#[derive(Debug, Clone, Deserialize)]
pub struct SamplerSection {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_samples() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./results")
}

impl AppConfig {
    /// 启动前校验；任何一项不合法都不开始搜索
    pub fn validate(&self) -> Result<()> {
        let p = &self.problem;
        if p.timeout_ms == 0 {
            return Err(GiError::Config("problem.timeout_ms must be positive".to_string()));
        }
        if p.reps == 0 {
            return Err(GiError::Config("problem.reps must be positive".to_string()));
        }
        match &p.project_dir {
            None => return Err(GiError::Config("problem.project_dir is required".to_string())),
            Some(dir) if !dir.is_dir() => {
                return Err(GiError::Config(format!(
                    "problem.project_dir {} is not a directory",
                    dir.display()
                )))
            }
            _ => {}
        }
        match &p.method_file {
            None => return Err(GiError::Config("problem.method_file is required".to_string())),
            Some(file) if !file.is_file() => {
                return Err(GiError::Config(format!(
                    "problem.method_file {} does not exist",
                    file.display()
                )))
            }
            _ => {}
        }
        EditKind::parse_list(&p.edit_types)?;
        if p.constraints > 1 {
            return Err(GiError::Config(format!(
                "problem.constraints must be 0 or 1, got {}",
                p.constraints
            )));
        }
        for (name, value) in [
            ("operators.crossover_probability", self.operators.crossover_probability),
            ("operators.mutation_probability", self.operators.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GiError::Config(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if self.executor.compile_timeout_ms == 0 {
            return Err(GiError::Config("executor.compile_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// 从默认路径或指定路径加载配置，并合并环境变量
pub fn load_config(config_path: Option<PathBuf>) -> std::result::Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        builder = builder.add_source(config::File::from(path.clone()).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GI")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
