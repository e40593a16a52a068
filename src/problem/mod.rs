//! 改进问题
//!
//! 外部优化器通过 `advance` / `create_candidate` / `evaluate` 驱动：
//! - advance() 把只进游标移到下一个目标方法，重建源表示并清空基线；
//! - advance 后第一次 create_candidate() 给出空补丁（基线），之后每次给出空补丁 + 一个随机编辑；
//! - evaluate() 经测试执行服务运行补丁，写入目标、约束与报告属性。
//!
//! 游标、基线与随机流都封装在一个会话里，只在单个评估线程上访问。

pub mod manifest;
pub mod runtime;
pub mod settings;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use manifest::{read_manifest, Manifest, SourceLocator};
pub use runtime::{Assessment, Fitness, RuntimeFitness, SENTINEL};
pub use settings::ProblemSettings;

use crate::core::{GiError, Result};
use crate::edits::{EditGenerator, EditKind, RandomLineEditGenerator};
use crate::execution::{executor_from_settings, run_audited, TestExecutor, TestHarness, TestRequest};
use crate::model::{LineSourceBuilder, SourceBuilder, SourceFile, TargetMethod, TestCase, TestResultSet};
use crate::solution::{keys, CandidateSolution};

/// 优化器看到的问题接口
#[async_trait]
pub trait Problem: Send {
    fn name(&self) -> &str;

    fn number_of_objectives(&self) -> usize;

    fn number_of_constraints(&self) -> usize;

    /// None 表示变量个数动态、无上界
    fn number_of_variables(&self) -> Option<usize> {
        None
    }

    /// 前进到下一个目标方法，耗尽后返回 None
    fn advance(&mut self) -> Result<Option<&TargetMethod>>;

    fn create_candidate(&mut self) -> Result<CandidateSolution>;

    async fn evaluate(&mut self, candidate: &mut CandidateSolution) -> Result<()>;
}

/// 当前目标方法的会话；advance 时整体替换
struct Session {
    target: TargetMethod,
    source: Arc<SourceFile>,
    /// 首次 create_candidate 给出的空补丁候选（评估后替换为已评估的副本）
    baseline: Option<CandidateSolution>,
    /// 空补丁的首次评估结果（原始程序结果）
    baseline_result: Option<TestResultSet>,
    baseline_objectives: Option<Vec<f64>>,
}

pub struct ImprovementProblem {
    methods: Vec<TargetMethod>,
    tests: HashSet<TestCase>,
    next: usize,
    session: Option<Session>,
    classpath: String,
    reps: u32,
    edit_kinds: Vec<EditKind>,
    executor: Arc<dyn TestExecutor>,
    source_builder: Arc<dyn SourceBuilder>,
    edit_generator: Arc<dyn EditGenerator>,
    fitness: Box<dyn Fitness>,
    rng: StdRng,
}

impl ImprovementProblem {
    pub fn builder(settings: ProblemSettings) -> ImprovementProblemBuilder {
        ImprovementProblemBuilder::new(settings)
    }

    /// 清单中的全部目标方法（按清单顺序）
    pub fn methods(&self) -> &[TargetMethod] {
        &self.methods
    }

    /// 所有目标方法的测试，去重
    pub fn tests(&self) -> &HashSet<TestCase> {
        &self.tests
    }

    pub fn edit_kinds(&self) -> &[EditKind] {
        &self.edit_kinds
    }

    pub fn current_target(&self) -> Option<&TargetMethod> {
        self.session.as_ref().map(|s| &s.target)
    }

    pub fn current_source(&self) -> Option<&Arc<SourceFile>> {
        self.session.as_ref().map(|s| &s.source)
    }

    pub fn baseline(&self) -> Option<&CandidateSolution> {
        self.session.as_ref().and_then(|s| s.baseline.as_ref())
    }

    /// 当前目标方法原始程序的测试结果
    pub fn baseline_result(&self) -> Option<&TestResultSet> {
        self.session.as_ref().and_then(|s| s.baseline_result.as_ref())
    }

    /// 前进到下一个目标方法；游标越过最后一个方法后返回 None，此后创建 / 评估都会失败
    pub fn advance(&mut self) -> Result<Option<&TargetMethod>> {
        self.session = None;

        let Some(target) = self.methods.get(self.next).cloned() else {
            tracing::info!(total = self.methods.len(), "all target methods processed");
            return Ok(None);
        };
        self.next += 1;

        let source = self.source_builder.build(
            &target.source,
            &self.edit_kinds,
            std::slice::from_ref(&target.method_name),
        )?;
        tracing::info!(
            method = %target,
            class = %target.class_name,
            tests = target.tests.len(),
            editable_lines = source.editable_lines().len(),
            "advanced to target method"
        );

        let session = self.session.insert(Session {
            target,
            source,
            baseline: None,
            baseline_result: None,
            baseline_objectives: None,
        });
        Ok(Some(&session.target))
    }

    pub fn create_candidate(&mut self) -> Result<CandidateSolution> {
        let session = self.session.as_mut().ok_or(GiError::NoTargetMethod)?;
        let mut candidate = CandidateSolution::new(
            self.fitness.number_of_objectives(),
            self.fitness.number_of_constraints(),
            session.source.clone(),
        );

        if session.baseline.is_none() {
            session.baseline = Some(candidate.clone());
            return Ok(candidate);
        }

        candidate
            .patch_mut()
            .add_random_edit(&mut self.rng, &self.edit_kinds, self.edit_generator.as_ref())?;
        Ok(candidate)
    }

    pub async fn evaluate(&mut self, candidate: &mut CandidateSolution) -> Result<()> {
        let session = self.session.as_mut().ok_or(GiError::NoTargetMethod)?;
        let target_id = session.target.id;

        let source = candidate.patch().source();
        if !Arc::ptr_eq(source, &session.source) && **source != *session.source {
            return Err(GiError::ForeignCandidate(target_id));
        }

        let is_empty = candidate.patch().is_empty();
        if !is_empty && session.baseline_objectives.is_none() {
            return Err(GiError::BaselineNotEvaluated(target_id));
        }

        tracing::debug!(method = %session.target, patch = %candidate.patch(), "evaluating patch");
        let request = TestRequest {
            target_class: &session.target.class_name,
            classpath: &self.classpath,
            tests: &session.target.tests,
            patch: candidate.patch(),
            reps: self.reps,
        };
        let results = run_audited(self.executor.as_ref(), request).await?;

        let assessment = self.fitness.assess(candidate.number_of_variables(), &results);
        for (index, value) in assessment.objectives.iter().enumerate() {
            candidate.set_objective(index, *value);
        }
        for (index, value) in assessment.constraints.iter().enumerate() {
            candidate.set_constraint(index, *value);
        }

        let first_baseline = is_empty && session.baseline_objectives.is_none();
        if first_baseline {
            report_original_program(&session.target, &results);
            session.baseline_objectives = Some(assessment.objectives.clone());
        }
        let baseline = session
            .baseline_objectives
            .as_ref()
            .ok_or(GiError::BaselineNotEvaluated(target_id))?;

        let target = &session.target;
        candidate.set_attribute(keys::METHOD_NAME, target.method_name.as_str());
        candidate.set_attribute(keys::METHOD_INDEX, target.id);
        candidate.set_attribute(keys::PATCH, candidate.patch().to_string());
        candidate.set_attribute(keys::PATCH_SIZE, candidate.number_of_variables());
        candidate.set_attribute(keys::COMPILED, results.compiled);
        candidate.set_attribute(keys::ALL_TESTS_PASSED, results.all_tests_passed());
        candidate.set_attribute(keys::N_TESTS, results.results.len());
        candidate.set_attribute(keys::N_PASSED, results.passed_count());
        candidate.set_attribute(keys::N_FAILED, results.failed_count());
        candidate.set_attribute(
            keys::TOTAL_EXECUTION_TIME,
            results.total_execution_time().as_nanos() as f64 / 1_000_000.0,
        );
        candidate.set_attribute(keys::TIMESTAMP, Utc::now());
        for (index, (fitness, reference)) in assessment.objectives.iter().zip(baseline).enumerate() {
            candidate.set_attribute(keys::fitness(index), *fitness);
            candidate.set_attribute(keys::fitness_improvement(index), improvement(*reference, *fitness));
        }

        if first_baseline {
            session.baseline_result = Some(results);
            session.baseline = Some(candidate.clone());
        }
        tracing::debug!(
            method = target_id,
            objectives = ?candidate.objectives(),
            constraints = ?candidate.constraints(),
            "patch evaluated"
        );
        Ok(())
    }
}

/// 基线 - 候选；两者都是哨兵值时记为 0
fn improvement(baseline: f64, candidate: f64) -> f64 {
    if baseline == candidate {
        0.0
    } else {
        baseline - candidate
    }
}

/// 原始程序未编译或未通过测试时打印诊断，搜索仍继续
fn report_original_program(target: &TargetMethod, results: &TestResultSet) {
    if results.all_tests_passed() {
        tracing::debug!(method = %target, "unmodified code passes all tests");
        return;
    }
    if !results.compiled {
        tracing::error!(method = %target, "original code failed to compile");
        return;
    }
    tracing::error!(
        method = %target,
        failed = results.failed_count(),
        "original code failed to pass unit tests"
    );
    for failure in results.failures() {
        tracing::error!(
            test = %failure.test,
            repetition = failure.repetition,
            timed_out = failure.timed_out,
            message = failure.message.as_deref().unwrap_or(""),
            "failed test"
        );
    }
}

#[async_trait]
impl Problem for ImprovementProblem {
    fn name(&self) -> &str {
        self.fitness.name()
    }

    fn number_of_objectives(&self) -> usize {
        self.fitness.number_of_objectives()
    }

    fn number_of_constraints(&self) -> usize {
        self.fitness.number_of_constraints()
    }

    fn advance(&mut self) -> Result<Option<&TargetMethod>> {
        ImprovementProblem::advance(self)
    }

    fn create_candidate(&mut self) -> Result<CandidateSolution> {
        ImprovementProblem::create_candidate(self)
    }

    async fn evaluate(&mut self, candidate: &mut CandidateSolution) -> Result<()> {
        ImprovementProblem::evaluate(self, candidate).await
    }
}

/// 问题构建器：读取清单、校验源文件、选择执行策略
pub struct ImprovementProblemBuilder {
    settings: ProblemSettings,
    harness: Option<Arc<dyn TestHarness>>,
    executor: Option<Arc<dyn TestExecutor>>,
    source_builder: Arc<dyn SourceBuilder>,
    edit_generator: Arc<dyn EditGenerator>,
    fitness: Option<Box<dyn Fitness>>,
}

impl ImprovementProblemBuilder {
    pub fn new(settings: ProblemSettings) -> Self {
        Self {
            settings,
            harness: None,
            executor: None,
            source_builder: Arc::new(LineSourceBuilder),
            edit_generator: Arc::new(RandomLineEditGenerator),
            fitness: None,
        }
    }

    /// 进程内执行所用的测试后端
    pub fn with_harness(mut self, harness: Arc<dyn TestHarness>) -> Self {
        self.harness = Some(harness);
        self
    }

    /// 直接指定执行策略（优先于 harness 与子进程设置）
    pub fn with_executor(mut self, executor: Arc<dyn TestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_source_builder(mut self, builder: Arc<dyn SourceBuilder>) -> Self {
        self.source_builder = builder;
        self
    }

    pub fn with_edit_generator(mut self, generator: Arc<dyn EditGenerator>) -> Self {
        self.edit_generator = generator;
        self
    }

    pub fn with_fitness(mut self, fitness: Box<dyn Fitness>) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub fn build(self) -> Result<ImprovementProblem> {
        let settings = self.settings;
        let locator = SourceLocator::new(&settings.project_dir, &settings.source_roots, &settings.source_extension);
        let manifest = read_manifest(&settings.method_file, settings.timeout, &locator)?;
        if manifest.methods.is_empty() {
            return Err(GiError::Config(format!(
                "No methods to process in {}",
                settings.method_file.display()
            )));
        }

        // 源文件缺失或无法解析在启动时就失败
        for method in &manifest.methods {
            self.source_builder.build(
                &method.source,
                &settings.edit_kinds,
                std::slice::from_ref(&method.method_name),
            )?;
        }

        let executor = match self.executor {
            Some(executor) => executor,
            None => executor_from_settings(&settings.execution, self.harness)?,
        };
        let fitness = self
            .fitness
            .unwrap_or_else(|| Box::new(RuntimeFitness::new(settings.constraints)));
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            problem = fitness.name(),
            methods = manifest.methods.len(),
            strategy = executor.strategy(),
            reps = settings.reps,
            "problem ready"
        );

        Ok(ImprovementProblem {
            methods: manifest.methods,
            tests: manifest.tests,
            next: 0,
            session: None,
            classpath: settings.classpath,
            reps: settings.reps,
            edit_kinds: settings.edit_kinds,
            executor,
            source_builder: self.source_builder,
            edit_generator: self.edit_generator,
            fitness,
            rng,
        })
    }
}
