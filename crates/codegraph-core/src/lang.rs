//! # Language Detection
//!
//! Table-driven language detection by file name, with a shebang fallback for
//! extensionless scripts. Unknown files return `None`.
//!
//! Names follow the GitHub linguist spelling (`Go`, `C++`, `Shell`), which is
//! also what the AST parsing service expects as a language hint.

use std::path::Path;

/// Maps a file to a language name.
pub trait LanguageDetector {
    /// Detect the language of `filename` given its content.
    fn detect(&self, filename: &str, content: &[u8]) -> Option<&'static str>;
}

/// Extension and well-known file name table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionDetector;

impl ExtensionDetector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for ExtensionDetector {
    fn detect(&self, filename: &str, content: &[u8]) -> Option<&'static str> {
        let path = Path::new(filename);
        let name = path.file_name()?.to_str()?;

        if let Some(lang) = by_file_name(name) {
            return Some(lang);
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => by_extension(&ext.to_ascii_lowercase()),
            None => by_shebang(content),
        }
    }
}

fn by_file_name(name: &str) -> Option<&'static str> {
    let lang = match name {
        "Makefile" | "GNUmakefile" | "makefile" => "Makefile",
        "Dockerfile" => "Dockerfile",
        "Rakefile" | "Gemfile" => "Ruby",
        "CMakeLists.txt" => "CMake",
        "BUILD" | "BUILD.bazel" | "WORKSPACE" => "Starlark",
        "go.mod" => "Go Module",
        _ => return None,
    };
    Some(lang)
}

fn by_extension(ext: &str) -> Option<&'static str> {
    let lang = match ext {
        // Systems
        "go" => "Go",
        "rs" => "Rust",
        "c" | "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => "C++",
        "cs" => "C#",
        "swift" => "Swift",

        // JVM
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "scala" => "Scala",

        // Scripting
        "py" | "pyw" => "Python",
        "rb" => "Ruby",
        "php" => "PHP",
        "pl" | "pm" => "Perl",
        "lua" => "Lua",
        "sh" | "bash" | "zsh" => "Shell",

        // Web
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "html" | "htm" => "HTML",
        "css" => "CSS",

        // Data and docs
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "xml" => "XML",
        "md" | "markdown" => "Markdown",
        "sql" => "SQL",
        "proto" => "Protocol Buffer",
        _ => return None,
    };
    Some(lang)
}

fn by_shebang(content: &[u8]) -> Option<&'static str> {
    let first = content.split(|&b| b == b'\n').next()?;
    let line = std::str::from_utf8(first).ok()?.strip_prefix("#!")?;

    // "#!/usr/bin/env python3" -> "python3", "#!/bin/sh" -> "sh"
    let mut words = line.split_whitespace();
    let program = words.next()?;
    let program = if program.ends_with("/env") {
        words.next()?
    } else {
        program.rsplit('/').next()?
    };
    let program = program.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');

    let lang = match program {
        "python" => "Python",
        "ruby" => "Ruby",
        "perl" => "Perl",
        "node" => "JavaScript",
        "sh" | "bash" | "zsh" | "dash" => "Shell",
        _ => return None,
    };
    Some(lang)
}
