use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::language::Language;

/// Rendered in place of a project path or command line that does not exist.
pub const DETACHED_MARKER: &str = "-";

/// Assembly name shared by every TypeScript invocation.
pub const TYPESCRIPT_ASSEMBLY_NAME: &str = "TypeScriptFiles";

/// One compiler command recognised in a build log.
///
/// Created once per log line, shortened by the noise-stripping pipeline and
/// finalized with an absolute output path during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInvocation {
    pub compiler_path: String,
    /// Retained, noise-stripped command text (everything after the compiler path).
    pub command_line: String,
    pub assembly_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_assembly_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_assembly_path: Option<String>,
    /// Reference paths verified to exist at resolution time, in command line order.
    #[serde(default)]
    pub referenced_binaries: Vec<String>,
    /// Display form of the retained arguments: quotes and a leading `@` removed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    /// TypeScript inputs, including the implicit `lib.d.ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_files: Vec<String>,
    pub language: Language,
    #[serde(default)]
    pub unknown_intermediate_path: bool,
}

impl CompilerInvocation {
    pub fn is_typescript(&self) -> bool {
        self.language == Language::TypeScript
    }
}

/// Deduplication identity of an invocation.
///
/// Keys are lowercased so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum InvocationKey {
    Project(String),
    Assembly(String),
}

/// A canonical invocation after reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Invocation {
    /// Compiled and attributed to a project file.
    Linked {
        project_file_path: String,
        compilation: CompilerInvocation,
    },
    /// Compiled, but no project file is known for it.
    Detached { compilation: CompilerInvocation },
    /// Placeholder for a referenced binary that was never compiled.
    Synthetic {
        assembly_name: String,
        output_assembly_path: String,
    },
}

impl Invocation {
    pub fn detached(compilation: CompilerInvocation) -> Self {
        Invocation::Detached { compilation }
    }

    pub fn linked(project_file_path: impl Into<String>, compilation: CompilerInvocation) -> Self {
        Invocation::Linked {
            project_file_path: project_file_path.into(),
            compilation,
        }
    }

    pub fn synthetic(
        assembly_name: impl Into<String>,
        output_assembly_path: impl Into<String>,
    ) -> Self {
        Invocation::Synthetic {
            assembly_name: assembly_name.into(),
            output_assembly_path: output_assembly_path.into(),
        }
    }

    pub fn key(&self) -> InvocationKey {
        match self {
            Invocation::Linked {
                project_file_path, ..
            } => InvocationKey::Project(project_file_path.to_lowercase()),
            Invocation::Detached { compilation } => {
                InvocationKey::Assembly(compilation.assembly_name.to_lowercase())
            }
            Invocation::Synthetic { assembly_name, .. } => {
                InvocationKey::Assembly(assembly_name.to_lowercase())
            }
        }
    }

    /// Project path, or `-` when the invocation is not tied to a project.
    pub fn project_file_path(&self) -> &str {
        match self {
            Invocation::Linked {
                project_file_path, ..
            } => project_file_path,
            Invocation::Detached { .. } | Invocation::Synthetic { .. } => DETACHED_MARKER,
        }
    }

    pub fn assembly_name(&self) -> &str {
        match self {
            Invocation::Linked { compilation, .. } | Invocation::Detached { compilation } => {
                &compilation.assembly_name
            }
            Invocation::Synthetic { assembly_name, .. } => assembly_name,
        }
    }

    pub fn output_assembly_path(&self) -> Option<&str> {
        match self {
            Invocation::Linked { compilation, .. } | Invocation::Detached { compilation } => {
                compilation.output_assembly_path.as_deref()
            }
            Invocation::Synthetic {
                output_assembly_path,
                ..
            } => Some(output_assembly_path),
        }
    }

    /// Retained command line, or `-` for synthetic invocations.
    pub fn command_line(&self) -> &str {
        match self.compilation() {
            Some(compilation) => &compilation.command_line,
            None => DETACHED_MARKER,
        }
    }

    pub fn compilation(&self) -> Option<&CompilerInvocation> {
        match self {
            Invocation::Linked { compilation, .. } | Invocation::Detached { compilation } => {
                Some(compilation)
            }
            Invocation::Synthetic { .. } => None,
        }
    }

    pub fn compilation_mut(&mut self) -> Option<&mut CompilerInvocation> {
        match self {
            Invocation::Linked { compilation, .. } | Invocation::Detached { compilation } => {
                Some(compilation)
            }
            Invocation::Synthetic { .. } => None,
        }
    }

    pub fn referenced_binaries(&self) -> &[String] {
        match self.compilation() {
            Some(compilation) => &compilation.referenced_binaries,
            None => &[],
        }
    }

    pub fn language(&self) -> Option<Language> {
        self.compilation().map(|c| c.language)
    }

    pub fn is_typescript(&self) -> bool {
        self.compilation().is_some_and(CompilerInvocation::is_typescript)
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Invocation::Synthetic { .. })
    }
}

impl PartialEq for Invocation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Invocation {}

impl Hash for Invocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn compilation(name: &str, command_line: &str) -> CompilerInvocation {
        CompilerInvocation {
            compiler_path: r"C:\tools\csc.exe".to_string(),
            command_line: command_line.to_string(),
            assembly_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_project_is_same_identity_regardless_of_command_line() {
        let a = Invocation::linked(r"C:\src\Foo\Foo.csproj", compilation("Foo", "/a"));
        let b = Invocation::linked(r"c:\SRC\foo\foo.CSPROJ", compilation("Bar", "/b /c"));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        assert!(set.insert(a));
        assert!(!set.insert(b));
    }

    #[test]
    fn test_detached_and_synthetic_compare_by_assembly_name() {
        let detached = Invocation::detached(compilation("Utils", "/x"));
        let synthetic = Invocation::synthetic("UTILS", "/bin/Utils.dll");
        assert_eq!(detached, synthetic);
        assert_ne!(
            detached,
            Invocation::linked("/src/Utils.csproj", compilation("Utils", "/x"))
        );
    }

    #[test]
    fn test_rendering_of_missing_fields() {
        let synthetic = Invocation::synthetic("Extra", "Extra.dll");
        assert_eq!(synthetic.project_file_path(), "-");
        assert_eq!(synthetic.command_line(), "-");
        assert_eq!(synthetic.output_assembly_path(), Some("Extra.dll"));
        assert!(synthetic.referenced_binaries().is_empty());
        assert_eq!(synthetic.language(), None);

        let detached = Invocation::detached(compilation("Foo", "/out:Foo.dll"));
        assert_eq!(detached.project_file_path(), "-");
        assert_eq!(detached.command_line(), "/out:Foo.dll");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_value(Invocation::synthetic("Extra", "Extra.dll")).unwrap();
        assert_eq!(json["kind"], "synthetic");
        assert_eq!(json["assembly_name"], "Extra");
    }
}
