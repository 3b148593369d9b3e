// Integration tests for the full flow: build logs on disk -> reconciled invocations
use buildscan_engine::{AnalysisOptions, Analyzer, Error, metadata_as_source, validate_outputs};
use buildscan_parser::MsBuildProjectReader;
use buildscan_types::MemorySink;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CSC: &str = r"C:\Program Files (x86)\MSBuild\14.0\bin\csc.exe";

fn write_project(dir: &Path, name: &str, assembly: &str) -> String {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}.csproj", name));
    fs::write(
        &path,
        format!("<Project><PropertyGroup><AssemblyName>{}</AssemblyName></PropertyGroup></Project>", assembly),
    )
    .unwrap();
    path.display().to_string()
}

fn write_log(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"MZ").unwrap();
}

#[test]
fn test_same_assembly_from_two_projects_is_ambiguous() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    let one = write_project(&root.join("one"), "Utils", "Utils");
    let two = write_project(&root.join("two"), "Utils", "Utils");

    let mut lines = Vec::new();
    for dir in ["one", "two"] {
        let obj = root.join(dir).join("obj").join("Utils.dll");
        let bin = root.join(dir).join("bin").join("Utils.dll");
        lines.push(format!("{} /noconfig /out:{} Utils.cs", CSC, obj.display()));
        lines.push(format!(
            "  Copying file from \"{}\" to \"{}\".",
            obj.display(),
            bin.display()
        ));
    }
    lines.push(format!("Done Building Project \"{}\" (default targets).", one));
    lines.push(format!("Done Building Project \"{}\" (default targets).", two));
    let log = write_log(root, "build.log", &lines);

    let options = AnalysisOptions::default();
    let sink = MemorySink::new();
    let outcome = Analyzer::new(&options, &MsBuildProjectReader, &sink).analyze(&[log])?;

    let ambiguous = outcome.context.ambiguous_invocations();
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].0, "Utils");
    assert_eq!(ambiguous[0].1.len(), 2);

    let mut outputs: Vec<_> = outcome
        .invocations
        .iter()
        .filter_map(|i| i.output_assembly_path())
        .collect();
    outputs.sort();
    assert_eq!(
        outputs,
        vec![
            root.join("one/bin/Utils.dll").display().to_string(),
            root.join("two/bin/Utils.dll").display().to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_referenced_binary_is_synthesized_once() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    let extra = root.join("lib").join("Extra.dll");
    touch(&extra);

    let logs: Vec<PathBuf> = ["A", "B", "C"]
        .iter()
        .map(|name| {
            let out = root.join("bin").join(format!("{}.dll", name));
            touch(&out);
            write_log(
                root,
                &format!("{}.log", name),
                &[format!(
                    "{} /out:{} /r:{} {}.cs",
                    CSC,
                    out.display(),
                    extra.display(),
                    name
                )],
            )
        })
        .collect();

    let options = AnalysisOptions {
        max_parallelism: 2,
        ..Default::default()
    };
    let sink = MemorySink::new();
    let outcome = Analyzer::new(&options, &MsBuildProjectReader, &sink).analyze(&logs)?;
    assert_eq!(outcome.invocations.len(), 3);
    assert_eq!(outcome.log_files, 3);

    let synthesized = metadata_as_source(&outcome.invocations, &sink);
    assert_eq!(synthesized.len(), 1);
    assert_eq!(synthesized[0].project_file_path(), "-");
    assert_eq!(synthesized[0].command_line(), "-");
    assert_eq!(synthesized[0].assembly_name(), "Extra");
    assert_eq!(
        synthesized[0].output_assembly_path(),
        Some(extra.display().to_string().as_str())
    );

    let mut all = outcome.invocations.clone();
    all.extend(synthesized);
    validate_outputs(&all)?;
    Ok(())
}

#[test]
fn test_outputs_are_absolute() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    let project = write_project(&root.join("App"), "App", "App");
    let log = write_log(
        root,
        "app.log",
        &[
            format!("{} /out:obj\\Debug\\App.exe Program.cs", CSC),
            "Copying file from \"obj\\Debug\\App.exe\" to \"bin\\Debug\\App.exe\".".to_string(),
            format!("Done Building Project \"{}\".", project),
            format!("{} /out:tools\\Gen.exe Gen.cs", CSC),
        ],
    );

    let options = AnalysisOptions {
        base_directory: Some(root.join("detached").display().to_string()),
        ..Default::default()
    };
    let sink = MemorySink::new();
    let outcome = Analyzer::new(&options, &MsBuildProjectReader, &sink).analyze(&[log])?;

    let outputs: Vec<_> = outcome
        .invocations
        .iter()
        .map(|i| i.output_assembly_path().unwrap().to_string())
        .collect();
    assert_eq!(
        outputs,
        vec![
            root.join("App/bin/Debug/App.exe").display().to_string(),
            root.join("detached/tools/Gen.exe").display().to_string(),
        ]
    );
    assert!(outputs.iter().all(|o| Path::new(o).is_absolute()));
    Ok(())
}

#[test]
fn test_unreadable_log_aborts_the_run() {
    let options = AnalysisOptions::default();
    let sink = MemorySink::new();
    let result = Analyzer::new(&options, &MsBuildProjectReader, &sink)
        .analyze(&[PathBuf::from("/nonexistent/missing.log")]);
    assert!(matches!(result, Err(Error::Parser(_))));
}
