//! `typeweave generate`: compile a metadata document and write, or check,
//! the client files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use similar::{ChangeTag, TextDiff};
use tracing::{debug, info};
use typeweave_core::{
    ApiMetadata, DocMap, GenerationOutput, Generator, GeneratorConfig, NoDocs, OutputFlavor,
    RenderedFile, render_all,
};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Metadata document (JSON) exported by the host framework
    #[arg(long, value_name = "FILE")]
    pub metadata: PathBuf,

    /// Generator configuration (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Documentation map (JSON object of symbol key → text)
    #[arg(long, value_name = "FILE")]
    pub docs: Option<PathBuf>,

    /// Directory the client files are written to
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Output flavors; overrides `output-flavors` from the configuration
    #[arg(long, value_enum)]
    pub flavor: Vec<FlavorArg>,

    /// Compare against the files on disk instead of writing them; exits 1
    /// when they differ
    #[arg(long)]
    pub check: bool,

    /// Print a JSON run summary on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum FlavorArg {
    /// Classes calling `fetch`
    Fetch,
    /// Classes calling an axios instance
    Axios,
}

impl From<FlavorArg> for OutputFlavor {
    fn from(value: FlavorArg) -> Self {
        match value {
            FlavorArg::Fetch => OutputFlavor::Fetch,
            FlavorArg::Axios => OutputFlavor::Axios,
        }
    }
}

pub fn run(args: &GenerateArgs) -> i32 {
    match run_inner(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            1
        }
    }
}

fn run_inner(args: &GenerateArgs) -> Result<i32, String> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path).map_err(|e| e.to_string())?,
        None => GeneratorConfig::default(),
    };
    if !args.flavor.is_empty() {
        config.output_flavors = args.flavor.iter().copied().map(OutputFlavor::from).collect();
    }

    let metadata = ApiMetadata::load(&args.metadata).map_err(|e| e.to_string())?;
    let generator = Generator::new(config);
    let output = match &args.docs {
        Some(path) => {
            let docs = DocMap::load(path).map_err(|e| e.to_string())?;
            debug!(entries = docs.len(), "loaded documentation");
            generator.run(&metadata, &docs)
        }
        None => generator.run(&metadata, &NoDocs),
    }
    .map_err(|e| e.to_string())?;

    let files = render_all(&output.groups, generator.config());
    let drifted = if args.check {
        check_files(&files, &args.out_dir)?
    } else {
        write_files(&files, &args.out_dir)?;
        Vec::new()
    };

    if args.json {
        println!("{}", summary(&output, &files, &drifted));
    } else {
        eprintln!(
            "{} {} declarations, {} functions, {} warnings",
            style("typeweave").cyan().bold(),
            output.declaration_count(),
            output.function_count(),
            output.diagnostics.len()
        );
    }
    Ok(i32::from(!drifted.is_empty()))
}

fn write_files(files: &[RenderedFile], out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|e| format!("Failed to create {}: {e}", out_dir.display()))?;
    for file in files {
        let path = out_dir.join(&file.path);
        fs::write(&path, &file.contents)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        info!(path = %path.display(), "wrote client");
    }
    Ok(())
}

/// Returns the paths whose contents differ from the rendered output.
fn check_files(files: &[RenderedFile], out_dir: &Path) -> Result<Vec<String>, String> {
    let mut drifted = Vec::new();
    for file in files {
        let path = out_dir.join(&file.path);
        let existing = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(format!("Failed to read {}: {e}", path.display())),
        };
        if existing == file.contents {
            debug!(path = %path.display(), "up to date");
            continue;
        }
        eprint!("{}", render_diff(&file.path, &existing, &file.contents));
        drifted.push(file.path.clone());
    }
    Ok(drifted)
}

/// Unified diff of the file on disk against the freshly rendered one.
fn render_diff(rel_path: &str, existing: &str, rendered: &str) -> String {
    let diff = TextDiff::from_lines(existing, rendered);
    let mut output = String::new();

    output.push_str(&format!("{}\n", style(format!("--- {rel_path} (on disk)")).bold()));
    output.push_str(&format!("{}\n", style(format!("+++ {rel_path} (generated)")).bold()));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let mut line = change.value().to_string();
                if change.missing_newline() {
                    line.push('\n');
                }
                let line = match change.tag() {
                    ChangeTag::Delete => style(format!("-{line}")).red().to_string(),
                    ChangeTag::Insert => style(format!("+{line}")).green().to_string(),
                    ChangeTag::Equal => format!(" {line}"),
                };
                output.push_str(&line);
            }
        }
    }
    output
}

fn summary(output: &GenerationOutput, files: &[RenderedFile], drifted: &[String]) -> String {
    let value = serde_json::json!({
        "namespaces": output.groups.iter().map(|g| g.namespace.as_str()).collect::<Vec<_>>(),
        "declarations": output.declaration_count(),
        "functions": output.function_count(),
        "warnings": output.diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "files": files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>(),
        "drifted": drifted,
    });
    value.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_diff_marks_changes() {
        let diff = render_diff("fetch-client.ts", "a\nb\nc\n", "a\nB\nc\n");
        assert!(diff.contains("--- fetch-client.ts (on disk)"));
        assert!(diff.contains("+++ fetch-client.ts (generated)"));
        assert!(diff.contains("-b"));
        assert!(diff.contains("+B"));
        assert!(diff.contains(" a\n"));
        assert!(!diff.contains("-a"));
    }

    #[test]
    fn test_check_reports_missing_file_as_drift() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![RenderedFile {
            path: "fetch-client.ts".into(),
            contents: "export {};\n".into(),
        }];
        let drifted = check_files(&files, dir.path()).unwrap();
        assert_eq!(drifted, vec!["fetch-client.ts".to_string()]);

        write_files(&files, dir.path()).unwrap();
        assert!(check_files(&files, dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_summary_is_json() {
        let output = GenerationOutput {
            groups: vec![],
            diagnostics: vec![],
        };
        let value: serde_json::Value =
            serde_json::from_str(&summary(&output, &[], &["a.ts".to_string()])).unwrap();
        assert_eq!(value["functions"], 0);
        assert_eq!(value["drifted"][0], "a.ts");
    }
}
