//! Build log and project file generation.

use anyhow::Result;
use std::path::Path;

/// Compiler path used by generated `csc` lines.
pub const CSC_PATH: &str = r"C:\Windows\Microsoft.NET\Framework\v4.0.30319\csc.exe";

/// Compiler path used by generated `tsc` lines.
pub const TSC_PATH: &str = r"C:\Program Files\Microsoft SDKs\TypeScript\1.0\tsc.exe";

/// Line-by-line builder for a synthetic MSBuild log.
///
/// # Example
/// ```
/// use buildscan_testing::LogBuilder;
///
/// let log = LogBuilder::new()
///     .csc(r"/noconfig /out:obj\App.dll Program.cs")
///     .copy(r"obj\App.dll", r"bin\App.dll")
///     .build();
/// assert_eq!(log.lines().count(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct LogBuilder {
    lines: Vec<String>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented managed compiler invocation, as MSBuild prints it.
    pub fn csc(mut self, arguments: &str) -> Self {
        self.lines.push(format!("         {} {}", CSC_PATH, arguments));
        self
    }

    pub fn tsc(mut self, arguments: &str) -> Self {
        self.lines.push(format!("         {} {}", TSC_PATH, arguments));
        self
    }

    pub fn copy(mut self, from: &str, to: &str) -> Self {
        self.lines
            .push(format!("  Copying file from \"{}\" to \"{}\".", from, to));
        self
    }

    pub fn done_building(mut self, project_file: &Path) -> Self {
        self.lines.push(format!(
            "Done Building Project \"{}\" (default targets).",
            project_file.display()
        ));
        self
    }

    /// Arbitrary text, e.g. noise the scanner should ignore.
    pub fn line(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Minimal project file declaring `assembly_name`.
pub fn project_xml(assembly_name: &str) -> String {
    format!(
        "<Project>\n  <PropertyGroup>\n    <AssemblyName>{}</AssemblyName>\n  </PropertyGroup>\n</Project>\n",
        assembly_name
    )
}

/// Write a placeholder PE file, creating parent directories.
pub fn write_binary(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, b"MZ")?;
    Ok(())
}
