//! Path-based file classification for the heuristic evaluator.
//!
//! Classification only looks at the path: extension, file name, and
//! directory segments. Nothing is read from disk.

use std::sync::OnceLock;

/// Extensions treated as source code.
const CODE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "go", "java", "kt", "kts", "scala",
    "swift", "c", "h", "cc", "cpp", "cxx", "hpp", "cs", "rb", "php", "vue", "svelte", "dart",
    "ex", "exs", "erl", "hs", "clj", "lua", "m", "mm", "sh", "bash", "zsh", "ps1", "sql", "r",
    "jl", "zig", "fs", "ml", "elm",
];

/// File-name conventions for tests.
const TEST_NAME_PATTERNS: &[&str] = &[
    "*.test.*",
    "*.spec.*",
    "*_test.*",
    "*_spec.*",
    "*Test.*",
    "*Tests.*",
    "test_*.py",
];

const TEST_DIRS: &[&str] = &["test", "tests", "__tests__"];

/// Manifests, lock files, and build descriptors.
const CONFIG_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "pnpm-workspace.yaml",
    "tsconfig.json",
    "Cargo.toml",
    "Cargo.lock",
    "go.mod",
    "go.sum",
    "pyproject.toml",
    "poetry.lock",
    "requirements.txt",
    "Pipfile",
    "Pipfile.lock",
    "setup.py",
    "setup.cfg",
    "Gemfile",
    "Gemfile.lock",
    "composer.json",
    "composer.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "Makefile",
    "CMakeLists.txt",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".gitlab-ci.yml",
    ".travis.yml",
];

const CONFIG_DIRS: &[&str] = &["config", "configs", "infrastructure", ".circleci"];

/// Classification flags for one path. Flags are independent except that a
/// test file is never also a code file.
///
/// # Examples
///
/// ```
/// use revu_difflens::classify::FileClass;
///
/// let class = FileClass::of("src/lib.rs");
/// assert!(class.is_code && !class.is_test);
///
/// let class = FileClass::of("src/lib.test.ts");
/// assert!(class.is_test && !class.is_code);
///
/// let class = FileClass::of("Cargo.toml");
/// assert!(class.is_config);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileClass {
    pub is_code: bool,
    pub is_test: bool,
    pub is_config: bool,
}

impl FileClass {
    /// Classify a slash-separated repository path.
    pub fn of(path: &str) -> Self {
        let is_test = is_test_file(path);
        Self {
            is_code: !is_test && has_code_extension(path),
            is_test,
            is_config: is_config_file(path),
        }
    }
}

fn split(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let file_name = segments.pop().unwrap_or("");
    (segments, file_name)
}

fn test_name_patterns() -> &'static [glob::Pattern] {
    static PATTERNS: OnceLock<Vec<glob::Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TEST_NAME_PATTERNS
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    })
}

/// Whether the file name carries a recognized source extension.
pub fn has_code_extension(path: &str) -> bool {
    let (_, file_name) = split(path);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            CODE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Whether the path lives under a test directory or follows a test naming
/// convention.
///
/// # Examples
///
/// ```
/// use revu_difflens::classify::is_test_file;
///
/// assert!(is_test_file("tests/integration.rs"));
/// assert!(is_test_file("src/__tests__/app.tsx"));
/// assert!(is_test_file("pkg/server_test.go"));
/// assert!(is_test_file("test_models.py"));
/// assert!(!is_test_file("src/testing.rs"));
/// ```
pub fn is_test_file(path: &str) -> bool {
    let (dirs, file_name) = split(path);
    if dirs
        .iter()
        .any(|d| TEST_DIRS.contains(&d.to_ascii_lowercase().as_str()))
    {
        return true;
    }
    test_name_patterns().iter().any(|p| p.matches(file_name))
}

/// Whether the path is a manifest, lock file, environment file, CI
/// definition, or lives in a configuration directory.
///
/// # Examples
///
/// ```
/// use revu_difflens::classify::is_config_file;
///
/// assert!(is_config_file("package.json"));
/// assert!(is_config_file(".env.production"));
/// assert!(is_config_file(".github/workflows/ci.yml"));
/// assert!(is_config_file("deploy/infrastructure/main.tf"));
/// assert!(!is_config_file("src/main.rs"));
/// ```
pub fn is_config_file(path: &str) -> bool {
    let (dirs, file_name) = split(path);

    if CONFIG_FILES.contains(&file_name) || is_env_file(file_name) {
        return true;
    }
    if dirs.iter().any(|d| CONFIG_DIRS.contains(d)) {
        return true;
    }
    dirs.windows(2)
        .any(|pair| pair[0] == ".github" && pair[1] == "workflows")
}

fn is_env_file(file_name: &str) -> bool {
    file_name == ".env" || file_name.starts_with(".env.") || file_name.ends_with(".env")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_extensions() {
        assert!(has_code_extension("src/a.ts"));
        assert!(has_code_extension("main.RS"));
        assert!(!has_code_extension("README.md"));
        assert!(!has_code_extension("img.png"));
        assert!(!has_code_extension("Makefile"));
        assert!(!has_code_extension(".rs"));
    }

    #[test]
    fn test_directory_segments() {
        assert!(is_test_file("test/helpers.js"));
        assert!(is_test_file("crates/x/tests/it.rs"));
        assert!(is_test_file("Tests/Foo.swift"));
        assert!(!is_test_file("tests"));
        assert!(!is_test_file("contest/a.rs"));
    }

    #[test]
    fn test_name_conventions() {
        assert!(is_test_file("src/app.spec.ts"));
        assert!(is_test_file("src/app.test.js"));
        assert!(is_test_file("lib/parser_spec.rb"));
        assert!(is_test_file("src/ParserTest.java"));
        assert!(is_test_file("src/ParserTests.cs"));
        assert!(!is_test_file("src/latest.rs"));
        assert!(!is_test_file("test_data.json"));
    }

    #[test]
    fn test_files_are_not_code() {
        let class = FileClass::of("tests/integration.rs");
        assert!(class.is_test);
        assert!(!class.is_code);
    }

    #[test]
    fn config_files_by_name() {
        assert!(is_config_file("Cargo.lock"));
        assert!(is_config_file("web/tsconfig.json"));
        assert!(is_config_file("Dockerfile"));
        assert!(is_config_file(".env"));
        assert!(is_config_file("deploy/staging.env"));
        assert!(!is_config_file("src/environment.rs"));
    }

    #[test]
    fn config_files_by_directory() {
        assert!(is_config_file("config/settings.yml"));
        assert!(is_config_file("app/configs/db.json"));
        assert!(is_config_file(".circleci/config.yml"));
        assert!(!is_config_file(".github/CODEOWNERS"));
        assert!(!is_config_file("config"));
    }

    #[test]
    fn classes_can_overlap() {
        let class = FileClass::of("config/loader.rs");
        assert!(class.is_code);
        assert!(class.is_config);
    }
}
