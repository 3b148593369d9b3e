//! Post-reconciliation sanity checks.
//!
//! Every finding is reported to the sink as an exception and collected into a
//! [`SanityReport`]. Nothing here changes the final invocations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use buildscan_core::{eq_ignore_case, file_name};
use buildscan_types::{DiagnosticSink, Invocation};

use crate::context::{AnalysisContext, NameGroup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityOptions {
    pub enabled: bool,
    pub duplicate_assembly_names: bool,
    pub multiple_projects: bool,
    pub intermediate_collisions: bool,
    pub ambiguous_destinations: bool,
    pub ambiguous_invocations: bool,
    pub unresolved_references: bool,
}

impl Default for SanityOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            duplicate_assembly_names: true,
            multiple_projects: true,
            intermediate_collisions: true,
            ambiguous_destinations: true,
            ambiguous_invocations: true,
            unresolved_references: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityReport {
    /// Assembly name -> project paths of its final invocations.
    pub duplicate_assembly_names: Vec<NameGroup>,
    /// Assembly name -> declaring projects.
    pub multiple_projects: Vec<NameGroup>,
    /// File name -> distinct intermediate paths.
    pub intermediate_collisions: Vec<NameGroup>,
    /// Assembly name -> conflicting copy destinations.
    pub ambiguous_destinations: Vec<NameGroup>,
    /// Assembly name -> output paths of the ambiguous invocations.
    pub ambiguous_invocations: Vec<NameGroup>,
    /// Missing reference path -> referencing assemblies.
    pub unresolved_references: Vec<NameGroup>,
}

impl SanityReport {
    pub fn finding_count(&self) -> usize {
        self.duplicate_assembly_names.len()
            + self.multiple_projects.len()
            + self.intermediate_collisions.len()
            + self.ambiguous_destinations.len()
            + self.ambiguous_invocations.len()
            + self.unresolved_references.len()
    }

    pub fn is_clean(&self) -> bool {
        self.finding_count() == 0
    }
}

pub fn check(
    context: &AnalysisContext,
    invocations: &[Invocation],
    options: &SanityOptions,
    sink: &dyn DiagnosticSink,
) -> SanityReport {
    let mut report = SanityReport::default();
    if !options.enabled {
        return report;
    }

    if options.duplicate_assembly_names {
        report.duplicate_assembly_names = duplicate_assembly_names(invocations);
        emit(sink, "Duplicate assembly name", &report.duplicate_assembly_names);
    }
    if options.multiple_projects {
        report.multiple_projects = context
            .assembly_projects()
            .into_iter()
            .filter(|group| group.members.len() > 1)
            .collect();
        emit(sink, "Assembly built by several projects", &report.multiple_projects);
    }
    if options.intermediate_collisions {
        report.intermediate_collisions = intermediate_collisions(context);
        emit(
            sink,
            "Intermediate assemblies sharing a file name",
            &report.intermediate_collisions,
        );
    }
    if options.ambiguous_destinations {
        report.ambiguous_destinations = context.ambiguous_destinations();
        emit(sink, "Ambiguous final destination", &report.ambiguous_destinations);
    }
    if options.ambiguous_invocations {
        report.ambiguous_invocations = context
            .ambiguous_invocations()
            .into_iter()
            .map(|(name, members)| NameGroup {
                name,
                members: members
                    .iter()
                    .map(|m| m.output_assembly_path().unwrap_or("-").to_string())
                    .collect(),
            })
            .collect();
        emit(sink, "Ambiguous invocations", &report.ambiguous_invocations);
    }
    if options.unresolved_references {
        report.unresolved_references = context
            .caches()
            .missing_references()
            .into_iter()
            .map(|(name, members)| NameGroup { name, members })
            .collect();
        emit(sink, "Unresolved reference", &report.unresolved_references);
    }

    report
}

fn emit(sink: &dyn DiagnosticSink, title: &str, groups: &[NameGroup]) {
    for group in groups {
        sink.exception(&format!(
            "{} {}: {}",
            title,
            group.name,
            group.members.join(", ")
        ));
    }
}

fn duplicate_assembly_names(invocations: &[Invocation]) -> Vec<NameGroup> {
    let mut by_name: BTreeMap<String, NameGroup> = BTreeMap::new();
    for invocation in invocations {
        by_name
            .entry(invocation.assembly_name().to_lowercase())
            .or_insert_with(|| NameGroup {
                name: invocation.assembly_name().to_string(),
                members: Vec::new(),
            })
            .members
            .push(invocation.project_file_path().to_string());
    }
    by_name
        .into_values()
        .filter(|group| group.members.len() > 1)
        .collect()
}

fn intermediate_collisions(context: &AnalysisContext) -> Vec<NameGroup> {
    let mut by_file: BTreeMap<String, NameGroup> = BTreeMap::new();
    for (intermediate, _) in context.intermediate_outputs() {
        let name = file_name(&intermediate).to_string();
        let group = by_file
            .entry(name.clone())
            .or_insert_with(|| NameGroup {
                name,
                members: Vec::new(),
            });
        if !group.members.iter().any(|m| eq_ignore_case(m, &intermediate)) {
            group.members.push(intermediate);
        }
    }
    by_file
        .into_values()
        .filter(|group| group.members.len() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildscan_parser::{CopyEvent, ProjectEvent};
    use buildscan_types::{CompilerInvocation, MemorySink};

    fn linked(project: &str, name: &str, output: &str) -> Invocation {
        Invocation::linked(
            project,
            CompilerInvocation {
                assembly_name: name.to_string(),
                output_assembly_path: Some(output.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_disabled_checks_report_nothing() {
        let context = AnalysisContext::new();
        context.caches().record_missing_reference(r"C:\refs\Gone.dll", "App");
        let sink = MemorySink::new();

        let options = SanityOptions {
            enabled: false,
            ..Default::default()
        };
        assert!(check(&context, &[], &options, &sink).is_clean());

        let report = check(&context, &[], &SanityOptions::default(), &sink);
        assert!(report.unresolved_references.is_empty());
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn test_findings_are_collected_and_emitted() {
        let context = AnalysisContext::new();
        for (intermediate, destination) in [
            (r"C:\a\obj\Lib.dll", r"C:\a\bin\Lib.dll"),
            (r"C:\b\obj\Lib.dll", r"C:\b\bin\Lib.dll"),
            (r"C:\b\obj\Lib.dll", r"C:\b\bin\x\Lib.dll"),
        ] {
            context.record_copy(&CopyEvent {
                intermediate: intermediate.to_string(),
                destination: destination.to_string(),
            });
        }
        for project in [r"C:\a\Lib.csproj", r"C:\b\Lib.csproj"] {
            context.record_project(&ProjectEvent {
                project_file_path: project.to_string(),
                assembly_name: "Lib".to_string(),
            });
        }
        context.caches().record_missing_reference(r"C:\refs\Gone.dll", "App");

        let invocations = vec![
            linked(r"C:\a\Lib.csproj", "Lib", r"C:\a\bin\Lib.dll"),
            linked(r"C:\b\Lib.csproj", "lib", r"C:\b\bin\Lib.dll"),
        ];
        let options = SanityOptions {
            unresolved_references: true,
            ..Default::default()
        };
        let sink = MemorySink::new();
        let report = check(&context, &invocations, &options, &sink);

        assert_eq!(report.duplicate_assembly_names.len(), 1);
        assert_eq!(report.multiple_projects[0].members.len(), 2);
        assert_eq!(
            report.intermediate_collisions,
            vec![NameGroup {
                name: "lib.dll".to_string(),
                members: vec![r"\a\obj\lib.dll".to_string(), r"\b\obj\lib.dll".to_string()],
            }]
        );
        assert_eq!(report.ambiguous_destinations[0].members.len(), 2);
        assert!(report.ambiguous_invocations.is_empty());
        assert_eq!(report.unresolved_references[0].members, vec!["App"]);
        assert_eq!(sink.exceptions().len(), report.finding_count());
    }
}
