//! 问题设置：由 AppConfig 校验并换算而来

use std::path::PathBuf;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{GiError, Result};
use crate::edits::EditKind;
use crate::execution::{ExecutionSettings, Granularity};

#[derive(Debug, Clone)]
pub struct ProblemSettings {
    pub project_dir: PathBuf,
    pub method_file: PathBuf,
    pub classpath: String,
    /// 相对 project_dir 的源码根
    pub source_roots: Vec<String>,
    pub source_extension: String,
    /// 每个测试用例的超时
    pub timeout: Duration,
    pub reps: u32,
    pub edit_kinds: Vec<EditKind>,
    pub seed: Option<u64>,
    pub constraints: usize,
    pub execution: ExecutionSettings,
}

impl ProblemSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let p = &config.problem;
        let missing = |name: &str| GiError::Config(format!("problem.{} is required", name));
        let project_dir = p.project_dir.clone().ok_or_else(|| missing("project_dir"))?;
        let method_file = p.method_file.clone().ok_or_else(|| missing("method_file"))?;

        let execution = ExecutionSettings {
            granularity: Granularity::from_flags(
                p.in_subprocess,
                p.each_repetition_in_new_subprocess,
                p.each_test_in_new_subprocess,
            ),
            fail_fast: p.fail_fast,
            compile_command: config.executor.compile_command.clone(),
            test_command: config.executor.test_command.clone(),
            compile_timeout: Duration::from_millis(config.executor.compile_timeout_ms),
            scratch_root: config
                .executor
                .scratch_root
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            working_dir: project_dir.clone(),
        };

        Ok(Self {
            project_dir,
            method_file,
            classpath: p.classpath.clone(),
            source_roots: p.source_roots.clone(),
            source_extension: p.source_extension.trim_start_matches('.').to_string(),
            timeout: Duration::from_millis(p.timeout_ms),
            reps: p.reps,
            edit_kinds: EditKind::parse_list(&p.edit_types)?,
            seed: p.seed,
            constraints: p.constraints,
            execution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_derives_execution_settings() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("methods.csv");
        std::fs::write(&manifest, "Method,Tests\n").unwrap();

        let mut config = AppConfig::default();
        config.problem.project_dir = Some(dir.path().to_path_buf());
        config.problem.method_file = Some(manifest);
        config.problem.each_repetition_in_new_subprocess = true;
        config.problem.timeout_ms = 250;
        config.problem.edit_types = vec!["line-swap".to_string(), "LINE_DELETION".to_string()];
        config.problem.source_extension = ".java".to_string();

        let settings = ProblemSettings::from_config(&config).unwrap();
        assert_eq!(settings.execution.granularity, Some(Granularity::PerRepetition));
        assert_eq!(settings.execution.working_dir, dir.path());
        assert_eq!(settings.timeout, Duration::from_millis(250));
        assert_eq!(settings.edit_kinds, vec![EditKind::LineSwap, EditKind::LineDeletion]);
        assert_eq!(settings.source_extension, "java");
    }

    #[test]
    fn test_missing_paths_fail_fast() {
        let config = AppConfig::default();
        assert!(matches!(ProblemSettings::from_config(&config), Err(GiError::Config(_))));
    }
}
