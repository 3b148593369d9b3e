use std::path::Path;

/// Supplies the declared assembly name of a project file.
///
/// Implementations must tolerate being called from several scanner threads
/// at once. Callers cache results by path, so an implementation may be slow.
pub trait ProjectMetadataReader: Send + Sync {
    /// Declared assembly name, or `None` when it cannot be determined.
    fn assembly_name(&self, project_file_path: &Path) -> Option<String>;
}
