use std::path::Path;

use buildscan_types::Invocation;

use crate::error::{Error, Result};

/// Check that every compiled output exists on disk.
///
/// Stops at the first missing output. TypeScript invocations produce no
/// binary and are skipped.
pub fn validate_outputs(invocations: &[Invocation]) -> Result<()> {
    for invocation in invocations.iter().filter(|i| !i.is_typescript()) {
        let exists = invocation
            .output_assembly_path()
            .is_some_and(|path| Path::new(path).exists());
        if !exists {
            return Err(Error::MissingOutput {
                assembly_name: invocation.assembly_name().to_string(),
                path: invocation.output_assembly_path().map(str::to_string),
            });
        }
    }
    Ok(())
}
