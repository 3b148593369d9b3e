use serde::{Deserialize, Serialize};
use std::fmt;

/// Source language of a compiler invocation, derived from the compiler path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "Visual Basic")]
    VisualBasic,
    TypeScript,
}

impl Language {
    /// Classify a compiler executable path.
    ///
    /// Case-insensitive substring test: "vbc" wins over "tsc.exe", anything
    /// else is C#.
    pub fn from_compiler_path(compiler_path: &str) -> Self {
        let lower = compiler_path.to_ascii_lowercase();
        if lower.contains("vbc") {
            Language::VisualBasic
        } else if lower.contains("tsc.exe") {
            Language::TypeScript
        } else {
            Language::CSharp
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::VisualBasic => "Visual Basic",
            Language::TypeScript => "TypeScript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
