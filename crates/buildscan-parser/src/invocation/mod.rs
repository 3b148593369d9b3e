//! Compiler command line parsing.
//!
//! A managed (C# / VB) line goes through the noise-stripping pipeline:
//! temp fragment, resources, `/out:`, `/doc:`, whitespace, then reference
//! resolution. TypeScript lines take their own path in [`typescript`].

mod noise;
mod references;
mod tokenize;
mod typescript;

pub use noise::{ShortenedSwitch, shorten_switch};
pub use references::{ResolvedReferences, reference_paths, resolve_references};
pub use tokenize::{arguments, tokenize};
pub use typescript::parse_typescript;

use std::path::Path;

use buildscan_types::{CompilerInvocation, DiagnosticSink, Language};

use crate::caches::ScanCaches;

pub const DEFAULT_TEMP_DIRECTORY_MARKER: &str = r"\AppData\Local\Temp\";

const MANAGED_SUFFIXES: &[&str] = &[
    r"\csc.exe ",
    r"\csc2.exe ",
    r"\rcsc.exe ",
    r"\rcsc2.exe ",
    r"\vbc.exe ",
    r"\vbc2.exe ",
    r"\rvbc.exe ",
    r"\rvbc2.exe ",
];

/// MSBuild indents the TypeScript task output with a tab, which swallows the
/// `t` of `tsc.exe`.
const TAB_TYPESCRIPT_SUFFIX: &str = "\tsc.exe ";
const TYPESCRIPT_SUFFIX: &str = r"\tsc.exe ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub temp_directory_marker: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            temp_directory_marker: DEFAULT_TEMP_DIRECTORY_MARKER.to_string(),
        }
    }
}

/// A line recognised as a compiler command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerMatch<'a> {
    /// Executable path, up to and including `.exe`.
    pub compiler_path: String,
    pub arguments: &'a str,
    pub typescript: bool,
}

/// Recognise a compiler command by its executable suffix.
///
/// The earliest suffix occurrence in the line wins.
pub fn match_compiler(line: &str) -> Option<CompilerMatch<'_>> {
    let lower = line.to_ascii_lowercase();

    let managed = MANAGED_SUFFIXES
        .iter()
        .filter_map(|suffix| lower.find(suffix).map(|idx| (idx, *suffix, false)));
    let typescript = [TAB_TYPESCRIPT_SUFFIX, TYPESCRIPT_SUFFIX]
        .into_iter()
        .filter_map(|suffix| lower.find(suffix).map(|idx| (idx, suffix, true)));

    let (idx, suffix, is_typescript) = managed.chain(typescript).min_by_key(|(idx, ..)| *idx)?;
    let path_end = idx + suffix.len() - 1;

    let compiler_path = if suffix == TAB_TYPESCRIPT_SUFFIX {
        format!(r"{}\tsc.exe", line[..idx].trim_start())
    } else {
        line[..path_end].trim_start().to_string()
    };

    Some(CompilerMatch {
        compiler_path,
        arguments: &line[path_end..],
        typescript: is_typescript,
    })
}

/// Command line after steps 1 to 5 of the noise-stripping pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedCommand {
    pub text: String,
    /// The shortened `/out:` switch, when present.
    pub output: Option<ShortenedSwitch>,
}

/// Steps 1 to 5: temp fragment, resources, `/out:`, `/doc:`, whitespace.
pub fn strip_noise(arguments: &str, temp_directory_marker: &str) -> StrippedCommand {
    let mut text = noise::remove_temp_fragment(arguments, temp_directory_marker);
    text = noise::remove_resources(&text);

    let output = shorten_switch(&text, "/out:");
    if let Some(out) = &output {
        text = out.text.clone();
    }
    if let Some(doc) = shorten_switch(&text, "/doc:") {
        text = doc.text;
    }

    StrippedCommand {
        text: noise::normalize_whitespace(&text),
        output,
    }
}

/// Turns one log line into a [`CompilerInvocation`].
///
/// Never fails: problems are reported to the sink and the line is either
/// parsed partially or skipped.
pub struct InvocationParser<'a> {
    options: &'a ParserOptions,
    caches: &'a ScanCaches,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> InvocationParser<'a> {
    pub fn new(
        options: &'a ParserOptions,
        caches: &'a ScanCaches,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            options,
            caches,
            sink,
        }
    }

    pub fn parse(&self, line: &str) -> Option<CompilerInvocation> {
        let matched = match_compiler(line.trim())?;
        if matched.typescript {
            return Some(parse_typescript(
                &matched.compiler_path,
                matched.arguments,
                self.sink,
            ));
        }
        self.parse_managed(matched.compiler_path, matched.arguments)
    }

    fn parse_managed(&self, compiler_path: String, arguments: &str) -> Option<CompilerInvocation> {
        let stripped = strip_noise(arguments, &self.options.temp_directory_marker);

        let Some(output) = stripped.output else {
            self.sink.exception(&format!(
                "Compiler invocation without /out: skipped: {}",
                truncate(arguments)
            ));
            return None;
        };
        if output.malformed {
            self.sink.exception(&format!(
                "Unterminated /out: value, using {}",
                output.path
            ));
        }
        let assembly_name = output.assembly_name().to_string();

        let resolved = resolve_references(&stripped.text, |path| {
            self.caches.is_known_binary(path) || Path::new(path).exists()
        });
        for missing in &resolved.missing {
            self.caches.record_missing_reference(missing, &assembly_name);
            self.sink.message(&format!(
                "{}: dropped reference to missing {}",
                assembly_name, missing
            ));
        }

        let language = Language::from_compiler_path(&compiler_path);
        let command_line = resolved.text.trim().to_string();
        Some(CompilerInvocation {
            compiler_path,
            arguments: tokenize::arguments(&command_line).into_iter().map(str::to_string).collect(),
            command_line,
            assembly_name,
            output_assembly_path: Some(output.path.clone()),
            intermediate_assembly_path: Some(output.path),
            referenced_binaries: resolved.binaries,
            language,
            ..Default::default()
        })
    }
}

fn truncate(text: &str) -> &str {
    const LIMIT: usize = 120;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
