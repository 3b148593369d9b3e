use buildscan_testing::assertions::{assert_count, assert_lines_end_with, assert_list_eq};
use buildscan_testing::{LogBuilder, TestWorld};

/// One project compiled to `obj\App.dll` and copied to `bin\App.dll`.
fn single_project_world() -> anyhow::Result<TestWorld> {
    let world = TestWorld::new();
    let project = world.write_project("src/App", "App")?;
    world.write_binary("src/App/bin/App.dll")?;

    let log = LogBuilder::new()
        .line("Build started 10/17/2026 09:12:44.")
        .csc(r"/noconfig /nowarn:1701 /out:obj\App.dll Program.cs")
        .copy(r"obj\App.dll", r"bin\App.dll")
        .done_building(&project)
        .line("Build succeeded.");
    world.write_log("build.log", &log)?;
    Ok(world)
}

#[test]
fn test_analyze_writes_lists() -> anyhow::Result<()> {
    let world = single_project_world()?;

    let result = world.analyze(&[])?;
    assert!(
        result.success(),
        "analyze failed\nstdout: {}\nstderr: {}",
        result.stdout(),
        result.stderr()
    );
    assert!(result.stdout().contains("Scanning 1 build logs"));
    assert!(result.stdout().contains("Analysis complete"));

    let out = world.out_dir();
    assert_list_eq(&out.join("assemblies.txt"), &["App"])?;
    assert_lines_end_with(&out.join("projects.txt"), &["src/App/App.csproj"])?;
    assert_lines_end_with(
        &out.join("invocations.txt"),
        &["src/App/App.csproj", "src/App/bin/App.dll", "Program.cs"],
    )?;
    assert!(!out.join("report.json").exists());
    Ok(())
}

#[test]
fn test_analyze_json_summary_and_report() -> anyhow::Result<()> {
    let world = single_project_world()?;

    let result = world.analyze(&["--report", "--format", "json"])?;
    assert!(result.success(), "stderr: {}", result.stderr());

    let summary = result.json()?;
    assert_count(&summary, "log_files", 1)?;
    assert_count(&summary, "invocations", 1)?;
    assert_count(&summary, "findings", 0)?;
    assert!(summary["report"].as_str().is_some());

    let report: serde_json::Value =
        serde_json::from_str(&world.read_output("report.json")?)?;
    assert_eq!(report["summary"]["invocations"], 1);
    Ok(())
}

#[test]
fn test_analyze_validate_fails_on_missing_output() -> anyhow::Result<()> {
    let world = single_project_world()?;
    std::fs::remove_file(world.path("src/App/bin/App.dll"))?;

    let result = world.analyze(&["--validate"])?;
    assert_eq!(result.exit_code(), Some(1));
    assert!(result.stderr().contains("Error:"));
    assert!(result.stderr().contains("App.dll"));
    assert!(!world.out_dir().join("invocations.txt").exists());
    Ok(())
}

#[test]
fn test_validation_enabled_from_config_file() -> anyhow::Result<()> {
    let world = single_project_world()?;
    std::fs::remove_file(world.path("src/App/bin/App.dll"))?;
    std::fs::write(
        world.data_dir().join("config.toml"),
        "[output]\nvalidate_outputs = true\n",
    )?;

    let result = world.analyze(&[])?;
    assert!(!result.success());
    assert!(result.stderr().contains("App.dll"));
    Ok(())
}

#[test]
fn test_analyze_missing_input_is_an_error() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let missing = world.path("nowhere.log");
    let out = world.out_dir().to_string_lossy().to_string();

    let result = world.run(&["analyze", &missing.to_string_lossy(), "--out", &out])?;
    assert_eq!(result.exit_code(), Some(1));
    assert!(result.stderr().contains("nowhere.log"));
    Ok(())
}

#[test]
fn test_reference_only_assembly_is_synthesized() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let project = world.write_project("src/App", "App")?;
    world.write_binary("src/App/bin/App.dll")?;
    let extra = world.write_binary("lib/Extra.dll")?;

    let log = LogBuilder::new()
        .csc(&format!(
            r"/noconfig /out:obj\App.dll /r:{} Program.cs",
            extra.display()
        ))
        .copy(r"obj\App.dll", r"bin\App.dll")
        .done_building(&project);
    world.write_log("build.log", &log)?;

    let result = world.analyze(&["--format", "json"])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    assert_count(&result.json()?, "synthesized", 1)?;
    assert_list_eq(&world.out_dir().join("assemblies.txt"), &["App", "Extra"])?;

    let without = world.analyze(&["--format", "json", "--no-augment"])?;
    assert_count(&without.json()?, "synthesized", 0)?;
    assert_list_eq(&world.out_dir().join("assemblies.txt"), &["App"])?;
    Ok(())
}

#[test]
fn test_rust_log_overrides_log_level() -> anyhow::Result<()> {
    let world = single_project_world()?;

    let quiet = world.analyze(&[])?;
    assert!(quiet.success(), "stderr: {}", quiet.stderr());
    assert!(!quiet.stderr().contains("Effective configuration"));

    let world = world.with_env("RUST_LOG", "debug");
    let verbose = world.analyze(&[])?;
    assert!(verbose.success(), "stderr: {}", verbose.stderr());
    assert!(verbose.stderr().contains("Effective configuration"));
    Ok(())
}
