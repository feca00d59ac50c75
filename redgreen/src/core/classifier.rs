//! Deterministic classification of edited paths and executed commands.
//!
//! All matching is plain text matching over the given string. Paths are never
//! resolved against the filesystem and commands are never run.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder, RegexSet};
use tracing::debug;

/// Reserved control-plane directory. Paths under it are always editable.
pub const CONFIG_DIR: &str = ".claude";

/// Compiled size ceiling for caller-supplied patterns.
const CUSTOM_PATTERN_SIZE_LIMIT: usize = 1 << 20;

static TEST_PATH_RULES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        // foo.test.ts, foo.spec.js
        r"\.(test|spec)\.",
        // foo_test.go, foo_spec.rb
        r"_(test|spec)\.",
        // test_foo.py, pkg/test_foo.py
        r"(^|/)test_",
        // FooTest.java, FooTests.cs, FooSpec.scala
        r"[[:alnum:]](Test|Tests|Spec)\.[[:alnum:]]+$",
        // __tests__/, tests/, spec/, e2e/, ...
        r"(^|/)(__tests__|tests|test|spec|specs|e2e|cypress|playwright)/",
    ])
    .expect("built-in test path rules are valid")
});

static TEST_COMMAND_RULES: LazyLock<Regex> = LazyLock::new(|| {
    let catalog = TEST_COMMANDS.join("|");
    Regex::new(&format!(r"^(?:{catalog})(?:\s|$)")).expect("built-in test command catalog is valid")
});

/// Left-anchored test-runner invocations, as regex fragments.
const TEST_COMMANDS: &[&str] = &[
    // JavaScript / TypeScript
    r"npm\s+(?:run\s+)?test(?::\S*)?",
    r"npm\s+t",
    r"yarn\s+(?:run\s+)?test(?::\S*)?",
    r"pnpm\s+(?:run\s+)?test(?::\S*)?",
    r"bun\s+(?:run\s+)?test",
    r"deno\s+test",
    r"npx\s+(?:jest|vitest|mocha|ava|karma|jasmine)",
    r"npx\s+playwright\s+test",
    r"npx\s+cypress\s+run",
    r"pnpm\s+(?:exec\s+)?(?:jest|vitest)",
    r"yarn\s+(?:jest|vitest)",
    r"jest",
    r"vitest",
    r"mocha",
    r"playwright\s+test",
    r"cypress\s+run",
    // Python
    r"pytest",
    r"py\.test",
    r"python3?\s+-m\s+(?:pytest|unittest)",
    r"(?:uv|poetry|pipenv|pdm|hatch)\s+run\s+(?:pytest|python3?\s+-m\s+pytest)",
    r"tox",
    r"nox",
    // Rust
    r"cargo\s+(?:test|nextest)",
    // Go
    r"go\s+test",
    r"gotestsum",
    // JVM
    r"(?:mvn|\./mvnw)(?:\s+-\S+)*\s+(?:test|verify)",
    r"(?:gradle|\./gradlew)(?:\s+-\S+)*\s+(?:test|check)",
    r"sbt\s+test",
    r"lein\s+test",
    // .NET
    r"dotnet\s+test",
    // Ruby
    r"(?:bundle\s+exec\s+)?rspec",
    r"(?:bundle\s+exec\s+)?rake\s+test",
    r"rails\s+test",
    // PHP
    r"(?:\./)?(?:vendor/bin/)?phpunit",
    r"(?:\./)?(?:vendor/bin/)?pest",
    r"composer\s+test",
    // Elixir / Erlang
    r"mix\s+test",
    r"rebar3\s+eunit",
    // Swift / Dart / Flutter
    r"swift\s+test",
    r"dart\s+test",
    r"flutter\s+test",
    // Haskell / Zig / C / C++
    r"stack\s+test",
    r"cabal\s+test",
    r"zig\s+build\s+test",
    r"ctest",
    r"make\s+(?:test|check)",
    r"just\s+test",
];

/// Caller-supplied test-artifact patterns, compiled once per record.
///
/// Entries that are not valid regular expressions are matched as literal
/// substrings instead of being dropped.
#[derive(Debug, Default)]
pub struct CustomPatterns {
    regexes: Vec<Regex>,
    literals: Vec<String>,
}

impl CustomPatterns {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut compiled = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            match RegexBuilder::new(pattern)
                .size_limit(CUSTOM_PATTERN_SIZE_LIMIT)
                .build()
            {
                Ok(regex) => compiled.regexes.push(regex),
                Err(err) => {
                    debug!(pattern, error = %err, "custom pattern is not a regex; matching literally");
                    compiled.literals.push(pattern.to_string());
                }
            }
        }
        compiled
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty() && self.literals.is_empty()
    }

    fn matches(&self, path: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(path))
            || self.literals.iter().any(|literal| path.contains(literal.as_str()))
    }
}

/// True if `path` names a test artifact by built-in rule or custom pattern.
pub fn is_test_artifact(path: &str, custom: &CustomPatterns) -> bool {
    let normalized = normalize_path(path);
    let builtin = TEST_PATH_RULES.matches(&normalized);
    if builtin.matched_any() {
        debug!(path = %normalized, rules = ?builtin.iter().collect::<Vec<_>>(), "built-in test rule matched");
        return true;
    }
    if custom.matches(&normalized) {
        debug!(path = %normalized, "custom test pattern matched");
        return true;
    }
    false
}

/// True if `command` starts with a recognized test-runner invocation.
pub fn is_test_command(command: &str) -> bool {
    TEST_COMMAND_RULES.is_match(command.trim_start())
}

/// True if `path` is inside the reserved control-plane directory.
///
/// Matches when `.claude` is the leading component or any segment of the path.
pub fn is_config_path(path: &str) -> bool {
    normalize_path(path)
        .split('/')
        .any(|segment| segment == CONFIG_DIR)
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
