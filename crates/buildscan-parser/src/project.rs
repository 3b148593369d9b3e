//! Declared assembly name lookup for MSBuild project files.
//!
//! Resolution order: a fast textual scan for `<AssemblyName>`, then an
//! element-aware scan that skips comments and tolerates attributes, then the
//! project file's base name. Properties other than `$(RootNamespace)` would
//! need a full MSBuild evaluation, which this reader does not attempt.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use buildscan_core::file_stem;

use crate::traits::ProjectMetadataReader;

const ROOT_NAMESPACE_PROPERTY: &str = "$(RootNamespace)";

static COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static ASSEMBLY_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<AssemblyName(?:\s[^>]*)?>\s*(.*?)\s*</AssemblyName\s*>").unwrap()
});
static ROOT_NAMESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<RootNamespace(?:\s[^>]*)?>\s*(.*?)\s*</RootNamespace\s*>").unwrap()
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MsBuildProjectReader;

impl ProjectMetadataReader for MsBuildProjectReader {
    fn assembly_name(&self, project_file_path: &Path) -> Option<String> {
        let text = std::fs::read_to_string(project_file_path).ok()?;
        fast_scan(&text)
            .or_else(|| structured_scan(&text))
            .or_else(|| {
                let name = project_file_path.to_string_lossy();
                Some(file_stem(&name).to_string()).filter(|stem| !stem.is_empty())
            })
    }
}

fn element_text<'a>(text: &'a str, element: &str) -> Option<&'a str> {
    let open = format!("<{}>", element);
    let close = format!("</{}>", element);
    let start = text.find(&open)? + open.len();
    let end = start + text[start..].find(&close)?;
    Some(text[start..end].trim())
}

fn resolve_property(value: &str, root_namespace: Option<&str>) -> Option<String> {
    let resolved = if value.contains(ROOT_NAMESPACE_PROPERTY) {
        value.replace(ROOT_NAMESPACE_PROPERTY, root_namespace?)
    } else {
        value.to_string()
    };
    if resolved.is_empty() || resolved.contains("$(") {
        return None;
    }
    Some(resolved)
}

fn fast_scan(text: &str) -> Option<String> {
    let value = element_text(text, "AssemblyName")?;
    resolve_property(value, element_text(text, "RootNamespace"))
}

fn structured_scan(text: &str) -> Option<String> {
    let text = COMMENT_REGEX.replace_all(text, "");
    let root_namespace = ROOT_NAMESPACE_REGEX
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()))
        .find(|value| !value.is_empty() && !value.contains("$("));

    ASSEMBLY_NAME_REGEX
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| resolve_property(&decode_entities(m.as_str()), root_namespace.as_deref()))
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_fast_scan_reads_assembly_name() {
        let text = "<Project><PropertyGroup><AssemblyName>Foo.Core</AssemblyName></PropertyGroup></Project>";
        assert_eq!(fast_scan(text).as_deref(), Some("Foo.Core"));
    }

    #[test]
    fn test_root_namespace_indirection() {
        let text = "<RootNamespace>Acme.Utils</RootNamespace>\n<AssemblyName>$(RootNamespace)</AssemblyName>";
        assert_eq!(fast_scan(text).as_deref(), Some("Acme.Utils"));

        let text = "<AssemblyName>$(RootNamespace).Tests</AssemblyName>";
        assert_eq!(fast_scan(text), None);
    }

    #[test]
    fn test_structured_scan_skips_comments_and_attributes() {
        let text = r#"<Project>
  <!-- <AssemblyName>Old</AssemblyName> -->
  <PropertyGroup>
    <AssemblyName Condition="'$(Configuration)' == ''">
      Fancy &amp; Name
    </AssemblyName>
  </PropertyGroup>
</Project>"#;
        assert_eq!(structured_scan(text).as_deref(), Some("Fancy & Name"));
    }

    #[test]
    fn test_reader_falls_back_to_base_name() {
        let dir = TempDir::new().unwrap();
        let path = write_project(&dir, "Widgets.csproj", "<Project />");
        assert_eq!(
            MsBuildProjectReader.assembly_name(&path).as_deref(),
            Some("Widgets")
        );

        let path = write_project(&dir, "Other.vbproj", "<AssemblyName>$(Unknown)</AssemblyName>");
        assert_eq!(MsBuildProjectReader.assembly_name(&path).as_deref(), Some("Other"));
    }

    #[test]
    fn test_unreadable_project_is_unresolvable() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            MsBuildProjectReader.assembly_name(&dir.path().join("missing.csproj")),
            None
        );
    }
}
