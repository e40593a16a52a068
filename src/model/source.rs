//! 可编辑源表示
//!
//! SourceFile 是某个目标方法所在文件的只读快照：原始行、目标方法名、可编辑行（方法体）
//! 与允许的编辑类别。每次 advance() 重新构建，由该方法下所有补丁通过 Arc 共享。

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::core::{GiError, Result};
use crate::edits::EditKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    lines: Vec<String>,
    methods: Vec<String>,
    editable: Vec<usize>,
    edit_kinds: Vec<EditKind>,
}

impl SourceFile {
    /// 从文本构建；methods 为空时整个文件可编辑，否则只有这些方法的方法体可编辑
    pub fn from_text(
        path: impl Into<PathBuf>,
        text: &str,
        methods: &[String],
        edit_kinds: &[EditKind],
    ) -> Result<Self> {
        let path = path.into();
        let lines: Vec<String> = text.lines().map(str::to_string).collect();

        let editable = if methods.is_empty() {
            (0..lines.len()).collect()
        } else {
            let mut set = BTreeSet::new();
            for method in methods {
                set.extend(locate_method_body(&path, &lines, method)?);
            }
            set.into_iter().collect()
        };

        Ok(Self {
            path,
            lines,
            methods: methods.to_vec(),
            editable,
            edit_kinds: edit_kinds.to_vec(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// 可编辑行号（0 起、升序）
    pub fn editable_lines(&self) -> &[usize] {
        &self.editable
    }

    pub fn edit_kinds(&self) -> &[EditKind] {
        &self.edit_kinds
    }

    pub fn text(&self) -> String {
        join_lines(self.lines.iter())
    }
}

pub(crate) fn join_lines<'a>(lines: impl Iterator<Item = &'a String>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// 从全限定签名取简单方法名：`com.ex.Foo.bar(int, java.lang.String)` -> `bar`
pub fn simple_method_name(signature: &str) -> &str {
    let head = signature.split('(').next().unwrap_or(signature).trim();
    head.rsplit('.').next().unwrap_or(head)
}

/// 调用位置前面的关键字，出现在名字前说明不是声明
const NON_DECL_KEYWORDS: &[&str] = &["return", "new", "else", "throw", "case", "yield", "await"];

/// 一处方法声明：所在行与该行中参数列表的起点（`(` 之后）
#[derive(Debug, Clone, Copy)]
struct Declaration {
    line: usize,
    params_start: usize,
}

/// 声明行：名字前紧跟一个类型记号（`int`、`List<T>`、`byte[]`），而不是 `.`、`=`、`(` 或关键字
fn find_declaration(line: &str, pattern: &Regex) -> Option<usize> {
    let trimmed = line.trim();
    if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.ends_with(';') {
        return None;
    }
    pattern.find_iter(line).find_map(|m| {
        let prefix = line[..m.start()].trim_end();
        let token = prefix.split_whitespace().last()?;
        let ends_like_type = token
            .chars()
            .last()
            .map(|c| c.is_alphanumeric() || c == '_' || c == '>' || c == ']')
            .unwrap_or(false);
        (ends_like_type && !NON_DECL_KEYWORDS.contains(&token)).then_some(m.end())
    })
}

/// 签名中的参数类型；没有括号时返回 None（只按名字匹配）
fn signature_parameters(signature: &str) -> Option<Vec<String>> {
    let open = signature.find('(')?;
    let close = signature.rfind(')').filter(|&c| c > open)?;
    Some(
        split_top_level(&signature[open + 1..close])
            .into_iter()
            .map(normalize_type)
            .collect(),
    )
}

/// 声明处的参数类型；参数列表跨行时向下拼接，括号不闭合返回 None
fn declared_parameters(lines: &[String], decl: Declaration, annotation: &Regex) -> Option<Vec<String>> {
    let first = lines[decl.line].get(decl.params_start..)?;
    let rest = lines[decl.line + 1..].iter().map(String::as_str);

    let mut depth = 1usize;
    let mut text = String::new();
    'scan: for chunk in std::iter::once(first).chain(rest) {
        for ch in chunk.chars() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break 'scan;
                    }
                }
                _ => {}
            }
            text.push(ch);
        }
        text.push(' ');
    }
    if depth != 0 {
        return None;
    }

    let text = annotation.replace_all(&text, " ");
    let types: Option<Vec<String>> = split_top_level(&text).into_iter().map(parameter_type).collect();
    types
}

/// 按顶层逗号切分（忽略 `<>` 与 `()` 内的逗号），丢弃空段
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// 单个形参 `final Map<K, V> m`、`String... args`、`int xs[]` -> 类型部分
fn parameter_type(param: &str) -> Option<String> {
    let param = strip_generics(param).replace("...", "[] ");
    let mut rest = param.trim_end();
    let mut dims = String::new();
    while let Some(inner) = rest.strip_suffix(']') {
        let open = inner.rfind('[')?;
        dims.push_str("[]");
        rest = inner[..open].trim_end();
    }

    let tokens: Vec<&str> = rest.split_whitespace().filter(|t| *t != "final").collect();
    let (_, ty) = tokens.split_last()?;
    if ty.is_empty() {
        return None;
    }
    Some(normalize_type(&format!("{}{}", ty.concat(), dims)))
}

fn strip_generics(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// 可比较的类型记号：去泛型、去空白、去包名，可变参数按数组处理。
/// `java.util.List<String>` -> `List`，`int [ ]` -> `int[]`
fn normalize_type(raw: &str) -> String {
    let compact: String = strip_generics(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("...", "[]");
    let (base, dims) = compact.split_at(compact.find('[').unwrap_or(compact.len()));
    let simple = base.rsplit('.').next().unwrap_or(base);
    format!("{}{}", simple, dims)
}

/// 定位方法声明并按花括号配对取方法体（不含声明行与右括号所在行）。
/// 同名声明按参数类型匹配签名；只有一个同名声明时直接取它。
/// 行级启发式，不处理字符串 / 注释内的括号。
fn locate_method_body(path: &Path, lines: &[String], signature: &str) -> Result<Vec<usize>> {
    let name = simple_method_name(signature);
    let parse_err = |message: String| GiError::SourceParse {
        path: path.to_path_buf(),
        message,
    };
    let pattern = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name)))
        .map_err(|e| parse_err(format!("bad method name '{}': {}", name, e)))?;
    let annotation = Regex::new(r"@[\w.]+(\s*\([^)]*\))?").map_err(|e| parse_err(e.to_string()))?;

    let decls: Vec<Declaration> = lines
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            find_declaration(text, &pattern).map(|params_start| Declaration { line, params_start })
        })
        .collect();

    let wanted = signature_parameters(signature);
    let by_signature = wanted.as_ref().and_then(|types| {
        decls
            .iter()
            .find(|d| declared_parameters(lines, **d, &annotation).as_ref() == Some(types))
    });
    let decl = match (by_signature, decls.as_slice()) {
        (Some(decl), _) => decl.line,
        (None, [only]) => only.line,
        (None, []) => return Err(parse_err(format!("method '{}' not found", signature))),
        (None, _) => {
            return Err(parse_err(format!(
                "no overload of '{}' matches '{}' ({} declarations)",
                name,
                signature,
                decls.len()
            )))
        }
    };

    let mut depth = 0usize;
    let mut open_line = None;
    for (idx, line) in lines.iter().enumerate().skip(decl) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    if open_line.is_none() {
                        open_line = Some(idx);
                    }
                    depth += 1;
                }
                '}' if open_line.is_some() => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let start = open_line.map(|l| l + 1).unwrap_or(idx);
                        return Ok((start..idx).collect());
                    }
                }
                _ => {}
            }
        }
    }
    Err(parse_err(format!("unbalanced braces in method '{}'", signature)))
}

/// 源表示构建器：(文件路径, 允许的编辑类别, 方法名) -> 限定在这些方法上的可编辑表示。
/// 文件缺失或无法解析时返回错误（启动期致命）。
pub trait SourceBuilder: Send + Sync {
    fn build(&self, path: &Path, edit_kinds: &[EditKind], methods: &[String]) -> Result<Arc<SourceFile>>;
}

/// 基于行的构建器
#[derive(Debug, Default, Clone, Copy)]
pub struct LineSourceBuilder;

impl SourceBuilder for LineSourceBuilder {
    fn build(&self, path: &Path, edit_kinds: &[EditKind], methods: &[String]) -> Result<Arc<SourceFile>> {
        if !path.is_file() {
            return Err(GiError::SourceNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let source = SourceFile::from_text(path, &text, methods, edit_kinds)?;
        tracing::debug!(
            path = %path.display(),
            editable = source.editable_lines().len(),
            "source representation built"
        );
        Ok(Arc::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SAMPLE_JAVA;

    #[test]
    fn test_simple_method_name() {
        assert_eq!(simple_method_name("com.ex.Foo.bar(int, java.lang.String)"), "bar");
        assert_eq!(simple_method_name("baz()"), "baz");
    }

    #[test]
    fn test_body_lines_of_named_method_only() {
        let source = SourceFile::from_text(
            "Small.java",
            SAMPLE_JAVA,
            &["example.Small.sum(int[])".to_string()],
            &EditKind::ALL,
        )
        .unwrap();
        let body: Vec<&str> = source
            .editable_lines()
            .iter()
            .map(|&l| source.lines()[l].trim())
            .collect();
        assert_eq!(body, vec!["int total = 0;", "for (int v : values) {", "total += v;", "}", "return total;"]);
    }

    #[test]
    fn test_call_sites_are_not_declarations() {
        let text = "class A {\n  int f() { return g(1); }\n  int g(int x) {\n    return x;\n  }\n}\n";
        let source = SourceFile::from_text("A.java", text, &["A.g(int)".to_string()], &EditKind::ALL).unwrap();
        assert_eq!(source.editable_lines(), &[3]);
    }

    #[test]
    fn test_missing_method_is_error() {
        let err = SourceFile::from_text("Small.java", SAMPLE_JAVA, &["nope()".to_string()], &EditKind::ALL)
            .unwrap_err();
        assert!(matches!(err, GiError::SourceParse { .. }));
    }

    #[test]
    fn test_no_methods_makes_whole_file_editable() {
        let source = SourceFile::from_text("Small.java", SAMPLE_JAVA, &[], &EditKind::ALL).unwrap();
        assert_eq!(source.editable_lines().len(), source.lines().len());
        assert_eq!(source.text(), SAMPLE_JAVA);
    }

    fn body_of(text: &str, signature: &str) -> Vec<String> {
        let source = SourceFile::from_text("A.java", text, &[signature.to_string()], &EditKind::ALL).unwrap();
        source
            .editable_lines()
            .iter()
            .map(|&l| source.lines()[l].trim().to_string())
            .collect()
    }

    const OVERLOADS: &str = "class A {
    long sum(long[] xs) {
        return 0L;
    }

    int sum(int[] xs) {
        int t = 0;
        return t;
    }

    int sum(java.util.List<Integer> xs,
            final int... extra) {
        return -1;
    }
}
";

    #[test]
    fn test_overload_chosen_by_parameter_types() {
        assert_eq!(body_of(OVERLOADS, "A.sum(int[])"), vec!["int t = 0;", "return t;"]);
        assert_eq!(body_of(OVERLOADS, "A.sum(long[])"), vec!["return 0L;"]);
        assert_eq!(body_of(OVERLOADS, "A.sum(java.util.List<java.lang.Integer>, int[])"), vec!["return -1;"]);
    }

    #[test]
    fn test_unmatched_overload_is_error() {
        let err = SourceFile::from_text("A.java", OVERLOADS, &["A.sum(double)".to_string()], &EditKind::ALL)
            .unwrap_err();
        assert!(matches!(err, GiError::SourceParse { .. }));
    }

    #[test]
    fn test_single_declaration_matches_by_name() {
        let text = "class A {\n  void run(@Deprecated String[] args) {\n    go();\n  }\n}\n";
        assert_eq!(body_of(text, "A.run(java.lang.String[])"), vec!["go();"]);
        // 参数写法不一致时唯一的同名声明仍被选中
        assert_eq!(body_of(text, "A.run(Object)"), vec!["go();"]);
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("java.util.Map<String, List<Integer>>"), "Map");
        assert_eq!(normalize_type("int [ ]"), "int[]");
        assert_eq!(normalize_type("String..."), "String[]");
        assert_eq!(parameter_type("final int xs[]").as_deref(), Some("int[]"));
        assert_eq!(parameter_type("Map<K, V> m").as_deref(), Some("Map"));
        assert_eq!(parameter_type("String ...args").as_deref(), Some("String[]"));
    }

    #[test]
    fn test_builder_rejects_missing_file() {
        let err = LineSourceBuilder
            .build(Path::new("definitely/not/here.java"), &EditKind::ALL, &[])
            .unwrap_err();
        assert!(matches!(err, GiError::SourceNotFound(_)));
    }
}
