//! Reconciliation orchestrator.
//!
//! Log files are scanned concurrently on a dedicated rayon pool. Once every
//! scan has finished, results are folded single-threaded in file-name order:
//! copy and project events first, then invocations.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::path::PathBuf;

use buildscan_core::{file_name, file_stem, join, parent};
use buildscan_parser::{LogScan, LogScanner, ParserOptions, ProjectMetadataReader};
use buildscan_types::{CompilerInvocation, DiagnosticSink, Invocation};

use crate::context::AnalysisContext;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub parser: ParserOptions,
    /// Scanner threads; `0` uses the number of available processors.
    pub max_parallelism: usize,
    /// Anchor for relative outputs of invocations without a project.
    /// Defaults to the current directory.
    pub base_directory: Option<String>,
}

/// Result of one analysis run.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub context: AnalysisContext,
    pub invocations: Vec<Invocation>,
    pub log_files: usize,
}

pub struct Analyzer<'a> {
    options: &'a AnalysisOptions,
    reader: &'a dyn ProjectMetadataReader,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        options: &'a AnalysisOptions,
        reader: &'a dyn ProjectMetadataReader,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            options,
            reader,
            sink,
        }
    }

    pub fn analyze(&self, log_files: &[PathBuf]) -> Result<AnalysisOutcome> {
        let base_directory = self.base_directory()?;
        let context = AnalysisContext::new();

        let scans = self.scan_all(&context, log_files)?;
        self.fold(&context, scans, &base_directory);

        let pruned = context.prune_harmless_ambiguities();
        if pruned > 0 {
            log::debug!("Pruned {} harmless duplicate invocation buckets", pruned);
        }

        let invocations = context.final_invocations();
        log::info!(
            "Reconciled {} invocations from {} log files",
            invocations.len(),
            log_files.len()
        );
        Ok(AnalysisOutcome {
            context,
            invocations,
            log_files: log_files.len(),
        })
    }

    /// Scan every log concurrently. The first unreadable log aborts the run.
    pub fn scan_all(&self, context: &AnalysisContext, log_files: &[PathBuf]) -> Result<Vec<LogScan>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.max_parallelism)
            .thread_name(|i| format!("buildscan-scan-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let scanner = LogScanner::new(&self.options.parser, context.caches(), self.reader, self.sink);
        let scans = pool.install(|| {
            log_files
                .par_iter()
                .map(|path| scanner.scan_file(path))
                .collect::<buildscan_parser::Result<Vec<_>>>()
        })?;
        Ok(scans)
    }

    /// Apply scan results in deterministic order.
    pub fn fold(&self, context: &AnalysisContext, mut scans: Vec<LogScan>, base_directory: &str) {
        scans.sort_by_cached_key(|scan| {
            let path = scan.log_file.to_string_lossy().into_owned();
            (file_name(&path).to_lowercase(), path)
        });

        for scan in &scans {
            for copy in &scan.copies {
                if context.record_copy(copy) {
                    self.sink.exception(&format!(
                        "Conflicting destinations for {}: kept {}",
                        copy.intermediate,
                        context
                            .destination_for(&copy.intermediate)
                            .unwrap_or_default()
                    ));
                }
            }
            for project in &scan.projects {
                context.record_project(project);
            }
        }

        for scan in scans {
            for compilation in scan.invocations {
                let invocation = if compilation.is_typescript() {
                    Invocation::detached(compilation)
                } else {
                    self.reconcile(context, compilation, base_directory)
                };
                context.insert_final(invocation);
            }
        }
    }

    fn reconcile(
        &self,
        context: &AnalysisContext,
        mut compilation: CompilerInvocation,
        base_directory: &str,
    ) -> Invocation {
        let project = context.project_for(&compilation.assembly_name);

        let destination = compilation
            .intermediate_assembly_path
            .as_deref()
            .and_then(|intermediate| context.destination_for(intermediate));
        match destination {
            Some(destination) => {
                let resolved_name = file_stem(&destination).to_string();
                if resolved_name != compilation.assembly_name {
                    log::debug!(
                        "Assembly {} renamed to {} by its copy destination",
                        compilation.assembly_name,
                        resolved_name
                    );
                    compilation.assembly_name = resolved_name;
                }
                compilation.output_assembly_path = Some(destination);
            }
            None => {
                compilation.unknown_intermediate_path = true;
                self.sink.message(&format!(
                    "No copy event for the intermediate assembly of {}: {}",
                    compilation.assembly_name,
                    compilation
                        .intermediate_assembly_path
                        .as_deref()
                        .unwrap_or("-")
                ));
            }
        }

        let anchor = match project.as_deref() {
            Some(project) => join(base_directory, parent(project)),
            None => base_directory.to_string(),
        };
        compilation.output_assembly_path = compilation
            .output_assembly_path
            .as_deref()
            .map(|output| join(&anchor, output));

        match project {
            Some(project) => Invocation::linked(project, compilation),
            None => Invocation::detached(compilation),
        }
    }

    fn base_directory(&self) -> Result<String> {
        let cwd = std::env::current_dir()?;
        let cwd = cwd.to_string_lossy();
        Ok(match &self.options.base_directory {
            Some(base) => join(&cwd, base),
            None => join(&cwd, "."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildscan_parser::{CopyEvent, ProjectEvent};
    use buildscan_types::MemorySink;
    use std::path::Path;

    struct NoProjects;

    impl ProjectMetadataReader for NoProjects {
        fn assembly_name(&self, _project_file_path: &Path) -> Option<String> {
            None
        }
    }

    fn managed(name: &str, out: &str) -> CompilerInvocation {
        CompilerInvocation {
            compiler_path: r"C:\csc.exe".to_string(),
            assembly_name: name.to_string(),
            output_assembly_path: Some(out.to_string()),
            intermediate_assembly_path: Some(out.to_string()),
            ..Default::default()
        }
    }

    fn scan(log: &str) -> LogScan {
        LogScan {
            log_file: PathBuf::from(log),
            ..Default::default()
        }
    }

    #[test]
    fn test_fold_applies_events_before_invocations() {
        let options = AnalysisOptions::default();
        let sink = MemorySink::new();
        let analyzer = Analyzer::new(&options, &NoProjects, &sink);
        let context = AnalysisContext::new();

        let mut early = scan("/logs/a.log");
        early.invocations.push(managed("App", r"obj\Debug\App.exe"));
        let mut late = scan("/logs/b.log");
        late.copies.push(CopyEvent {
            intermediate: r"obj\Debug\App.exe".to_string(),
            destination: r"bin\Debug\App.exe".to_string(),
        });
        late.projects.push(ProjectEvent {
            project_file_path: r"C:\src\App\App.csproj".to_string(),
            assembly_name: "App".to_string(),
        });

        analyzer.fold(&context, vec![late, early], r"C:\work");

        let finals = context.final_invocations();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].project_file_path(), r"C:\src\App\App.csproj");
        assert_eq!(
            finals[0].output_assembly_path(),
            Some(r"C:\src\App\bin\Debug\App.exe")
        );
        assert!(!finals[0].compilation().unwrap().unknown_intermediate_path);
    }

    #[test]
    fn test_unmapped_intermediate_is_flagged_and_anchored() {
        let options = AnalysisOptions::default();
        let sink = MemorySink::new();
        let analyzer = Analyzer::new(&options, &NoProjects, &sink);
        let context = AnalysisContext::new();

        let mut only = scan("/logs/a.log");
        only.invocations.push(managed("Tool", r"obj\Tool.exe"));
        analyzer.fold(&context, vec![only], "/work");

        let finals = context.final_invocations();
        assert_eq!(finals[0].project_file_path(), "-");
        assert_eq!(finals[0].output_assembly_path(), Some("/work/obj/Tool.exe"));
        assert!(finals[0].compilation().unwrap().unknown_intermediate_path);
        assert!(sink.contains("Tool"));
    }

    #[test]
    fn test_relative_project_path_still_yields_absolute_output() {
        let options = AnalysisOptions::default();
        let sink = MemorySink::new();
        let analyzer = Analyzer::new(&options, &NoProjects, &sink);
        let context = AnalysisContext::new();

        let mut only = scan("/logs/a.log");
        only.projects.push(ProjectEvent {
            project_file_path: "App/App.csproj".to_string(),
            assembly_name: "App".to_string(),
        });
        only.copies.push(CopyEvent {
            intermediate: "obj/App.dll".to_string(),
            destination: "bin/App.dll".to_string(),
        });
        only.invocations.push(managed("App", "obj/App.dll"));
        analyzer.fold(&context, vec![only], "/work");

        let finals = context.final_invocations();
        assert_eq!(finals[0].output_assembly_path(), Some("/work/App/bin/App.dll"));
    }

    #[test]
    fn test_copy_destination_renames_assembly() {
        let options = AnalysisOptions::default();
        let sink = MemorySink::new();
        let analyzer = Analyzer::new(&options, &NoProjects, &sink);
        let context = AnalysisContext::new();

        let mut only = scan("/logs/a.log");
        only.copies.push(CopyEvent {
            intermediate: r"C:\obj\Foo.dll".to_string(),
            destination: r"C:\bin\Foo.Core.dll".to_string(),
        });
        only.invocations.push(managed("Foo", r"C:\obj\Foo.dll"));
        analyzer.fold(&context, vec![only], r"C:\work");

        let finals = context.final_invocations();
        assert_eq!(finals[0].assembly_name(), "Foo.Core");
        assert_eq!(finals[0].output_assembly_path(), Some(r"C:\bin\Foo.Core.dll"));
    }

    #[test]
    fn test_conflicts_resolve_in_file_name_order() {
        let options = AnalysisOptions::default();
        let sink = MemorySink::new();
        let analyzer = Analyzer::new(&options, &NoProjects, &sink);
        let context = AnalysisContext::new();

        let mut second = scan("/logs/z/B.log");
        second.copies.push(CopyEvent {
            intermediate: r"obj\A.dll".to_string(),
            destination: r"C:\b2\A.dll".to_string(),
        });
        let mut first = scan("/logs/y/a.log");
        first.copies.push(CopyEvent {
            intermediate: r"obj\A.dll".to_string(),
            destination: r"C:\b1\A.dll".to_string(),
        });

        analyzer.fold(&context, vec![second, first], r"C:\work");
        assert_eq!(context.destination_for(r"obj\A.dll").as_deref(), Some(r"C:\b1\A.dll"));
        assert_eq!(sink.exceptions().len(), 1);
    }
}
