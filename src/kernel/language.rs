//! `lang:` support: language names to file name patterns.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LanguageId {
    Rust,
    Go,
    Python,
    JavaScript,
    TypeScript,
    C,
    Cpp,
    CSharp,
    Java,
    Kotlin,
    Swift,
    Ruby,
    Php,
    Shell,
    Markdown,
    Json,
    Yaml,
    Toml,
    Html,
    Css,
    Xml,
    Sql,
    Dockerfile,
    Makefile,
}

impl LanguageId {
    /// Resolves a `lang:` value. Matching is case-insensitive and accepts the
    /// common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let lang = match name.trim().to_ascii_lowercase().as_str() {
            "rust" | "rs" => Self::Rust,
            "go" | "golang" => Self::Go,
            "python" | "py" | "python3" => Self::Python,
            "javascript" | "js" | "node" | "jsx" => Self::JavaScript,
            "typescript" | "ts" | "tsx" => Self::TypeScript,
            "c" => Self::C,
            "c++" | "cpp" | "cxx" => Self::Cpp,
            "c#" | "csharp" | "cs" => Self::CSharp,
            "java" => Self::Java,
            "kotlin" | "kt" => Self::Kotlin,
            "swift" => Self::Swift,
            "ruby" | "rb" => Self::Ruby,
            "php" => Self::Php,
            "shell" | "bash" | "sh" | "zsh" => Self::Shell,
            "markdown" | "md" => Self::Markdown,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "xml" => Self::Xml,
            "sql" => Self::Sql,
            "dockerfile" | "docker" => Self::Dockerfile,
            "makefile" | "make" => Self::Makefile,
            _ => return None,
        };
        Some(lang)
    }

    /// File extensions, including the leading dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Rust => &[".rs", ".rs.in"],
            Self::Go => &[".go"],
            Self::Python => &[".py", ".pyi", ".pyw"],
            Self::JavaScript => &[".js", ".mjs", ".cjs", ".jsx"],
            Self::TypeScript => &[".ts", ".mts", ".cts", ".tsx"],
            Self::C => &[".c", ".h"],
            Self::Cpp => &[".cpp", ".cc", ".cxx", ".c++", ".hpp", ".hh", ".hxx", ".h++"],
            Self::CSharp => &[".cs", ".csx"],
            Self::Java => &[".java"],
            Self::Kotlin => &[".kt", ".kts"],
            Self::Swift => &[".swift"],
            Self::Ruby => &[".rb", ".rake", ".gemspec"],
            Self::Php => &[".php", ".phtml"],
            Self::Shell => &[".sh", ".bash", ".zsh"],
            Self::Markdown => &[".md", ".markdown"],
            Self::Json => &[".json"],
            Self::Yaml => &[".yaml", ".yml"],
            Self::Toml => &[".toml"],
            Self::Html => &[".html", ".htm"],
            Self::Css => &[".css"],
            Self::Xml => &[".xml", ".xsl", ".svg"],
            Self::Sql => &[".sql"],
            Self::Dockerfile => &[".dockerfile"],
            Self::Makefile => &[".mk", ".mak"],
        }
    }

    /// Exact file names that belong to the language regardless of extension.
    pub fn filenames(self) -> &'static [&'static str] {
        match self {
            Self::Ruby => &["Gemfile", "Rakefile"],
            Self::Shell => &[".bashrc", ".zshrc"],
            Self::Dockerfile => &["Dockerfile"],
            Self::Makefile => &["Makefile", "GNUmakefile", "makefile"],
            _ => &[],
        }
    }

    /// Union of one alternative per extension and per exact file name,
    /// e.g. `(?:\.go$)` for Go.
    pub fn file_regex(self) -> String {
        let by_ext = self
            .extensions()
            .iter()
            .map(|ext| format!("(?:{}$)", regex::escape(ext)));
        let by_name = self
            .filenames()
            .iter()
            .map(|name| format!("(?:(?:^|/){}$)", regex::escape(name)));
        by_ext.chain(by_name).collect::<Vec<_>>().join("|")
    }
}

/// Filename pattern for a `lang:` value, `None` for unknown languages.
pub fn lang_to_file_regex(name: &str) -> Option<String> {
    LanguageId::from_name(name).map(LanguageId::file_regex)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
