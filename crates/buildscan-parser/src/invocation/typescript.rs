//! TypeScript compiler command lines.
//!
//! These skip the managed noise-stripping pipeline. The interesting part is the
//! list of input files, which may live in `@response` files.

use std::fs;

use buildscan_core::{file_name, join, parent};
use buildscan_types::{CompilerInvocation, DiagnosticSink, Language, TYPESCRIPT_ASSEMBLY_NAME};

use super::tokenize::{tokenize, unquote};

/// Flags whose following token is a value, not an input file.
const VALUE_FLAGS: &[&str] = &["--module", "--target", "--out", "--outfile", "--outdir"];

const MAX_RESPONSE_DEPTH: usize = 8;

const DEFAULT_LIBRARY: &str = "lib.d.ts";

pub fn parse_typescript(
    compiler_path: &str,
    arguments: &str,
    sink: &dyn DiagnosticSink,
) -> CompilerInvocation {
    let mut input_files = Vec::new();
    collect_inputs(arguments, 0, &mut input_files, sink);

    let has_library = input_files
        .iter()
        .any(|input| file_name(input).eq_ignore_ascii_case(DEFAULT_LIBRARY));
    if !has_library {
        input_files.push(join(parent(compiler_path), DEFAULT_LIBRARY));
    }

    CompilerInvocation {
        compiler_path: compiler_path.to_string(),
        command_line: arguments.trim().to_string(),
        assembly_name: TYPESCRIPT_ASSEMBLY_NAME.to_string(),
        input_files,
        language: Language::TypeScript,
        ..Default::default()
    }
}

fn collect_inputs(text: &str, depth: usize, inputs: &mut Vec<String>, sink: &dyn DiagnosticSink) {
    let mut skip_value = false;

    for token in tokenize(text) {
        let token = unquote(token);
        if token.is_empty() {
            continue;
        }
        if skip_value {
            skip_value = false;
            continue;
        }

        if let Some(response_file) = token.strip_prefix('@') {
            expand_response_file(unquote(response_file), depth, inputs, sink);
        } else if token.starts_with('-') {
            skip_value = VALUE_FLAGS.iter().any(|flag| token.eq_ignore_ascii_case(flag));
        } else {
            inputs.push(token.to_string());
        }
    }
}

fn expand_response_file(
    path: &str,
    depth: usize,
    inputs: &mut Vec<String>,
    sink: &dyn DiagnosticSink,
) {
    if depth >= MAX_RESPONSE_DEPTH {
        sink.exception(&format!("Response file nesting too deep at {}", path));
        return;
    }
    match fs::read_to_string(path) {
        Ok(contents) => {
            for line in contents.lines() {
                collect_inputs(line, depth + 1, inputs, sink);
            }
        }
        Err(err) => {
            sink.exception(&format!("Unable to read response file {}: {}", path, err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildscan_types::MemorySink;

    #[test]
    fn test_inputs_skip_flag_values() {
        let sink = MemorySink::new();
        let invocation = parse_typescript(
            r"C:\tools\tsc\tsc.exe",
            r#"--target ES5 --module amd --removeComments "C:\src\a b.ts" C:\src\c.ts --outDir C:\out"#,
            &sink,
        );

        assert_eq!(invocation.assembly_name, TYPESCRIPT_ASSEMBLY_NAME);
        assert_eq!(invocation.language, Language::TypeScript);
        assert_eq!(
            invocation.input_files,
            vec![r"C:\src\a b.ts", r"C:\src\c.ts", r"C:\tools\tsc\lib.d.ts"]
        );
        assert!(invocation.output_assembly_path.is_none());
    }

    #[test]
    fn test_explicit_lib_is_not_duplicated() {
        let sink = MemorySink::new();
        let invocation = parse_typescript(r"C:\tsc\tsc.exe", r"C:\typings\LIB.D.TS app.ts", &sink);
        assert_eq!(invocation.input_files, vec![r"C:\typings\LIB.D.TS", "app.ts"]);
    }

    #[test]
    fn test_response_files_expand_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner.rsp");
        let outer = dir.path().join("outer.rsp");
        std::fs::write(&inner, "--module commonjs\nb.ts\n").unwrap();
        std::fs::write(&outer, format!("a.ts\n@\"{}\"\n", inner.display())).unwrap();

        let sink = MemorySink::new();
        let invocation = parse_typescript(
            "/opt/tsc/tsc.exe",
            &format!("@{} c.ts", outer.display()),
            &sink,
        );

        assert_eq!(
            invocation.input_files,
            vec!["a.ts", "b.ts", "c.ts", "/opt/tsc/lib.d.ts"]
        );
        assert!(sink.exceptions().is_empty());
    }

    #[test]
    fn test_unreadable_response_file_is_reported() {
        let sink = MemorySink::new();
        let invocation = parse_typescript("/opt/tsc/tsc.exe", "@/nonexistent/x.rsp a.ts", &sink);
        assert_eq!(invocation.input_files, vec!["a.ts", "/opt/tsc/lib.d.ts"]);
        assert_eq!(sink.exceptions().len(), 1);
    }

    #[test]
    fn test_self_referencing_response_file_stops() {
        let dir = tempfile::tempdir().unwrap();
        let rsp = dir.path().join("loop.rsp");
        std::fs::write(&rsp, format!("x.ts @{}\n", rsp.display())).unwrap();

        let sink = MemorySink::new();
        let invocation = parse_typescript("/opt/tsc/tsc.exe", &format!("@{}", rsp.display()), &sink);
        assert_eq!(invocation.input_files.len(), MAX_RESPONSE_DEPTH + 1);
        assert_eq!(sink.exceptions().len(), 1);
    }
}
