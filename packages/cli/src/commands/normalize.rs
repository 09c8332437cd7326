use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use graft_normalizer::{
    ContextFiles, NormalizationPipeline, NormalizationReport, NormalizerOptions, TokenTable,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// File or directory to normalize (defaults to the configured srcDir)
    pub path: Option<PathBuf>,

    /// Write changes back instead of just reporting them
    #[arg(short, long)]
    pub write: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Show clean files too
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    #[serde(flatten)]
    report: NormalizationReport,
}

pub fn normalize(args: NormalizeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let root = match &args.path {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.get_src_dir(cwd),
    };
    if !root.exists() {
        return Err(anyhow!("Path does not exist: {}", root.display()));
    }

    let pipeline = NormalizationPipeline::new(
        TokenTable::default(),
        NormalizerOptions::from(&config.engine),
    );

    let files = find_source_files(&root, &pipeline);
    if files.is_empty() {
        println!("{}", "⚠️  No source files found".yellow());
        return Ok(());
    }

    // Directory runs gate component promotion on modules that actually
    // exist among the scanned files; a single file runs ungated
    let context = if root.is_dir() {
        ContextFiles::new(files.iter().map(|f| f.to_string_lossy().to_string()))
    } else {
        ContextFiles::empty()
    };

    let text_output = args.format != "json";
    if text_output {
        println!("{}", "🧹 Normalizing source files...".bright_blue().bold());
        println!("Found {} files", files.len());
        println!();
    }

    let mut drifted = 0;
    let mut total_rewrites = 0;
    let mut collected: Vec<FileReport> = Vec::new();

    for file in &files {
        let source = fs::read_to_string(file)?;
        let path_str = file.to_string_lossy().to_string();
        let outcome = pipeline.run(&source, &path_str, &context);

        let display = if root.is_dir() {
            file.strip_prefix(&root).unwrap_or(file).display().to_string()
        } else {
            file.display().to_string()
        };

        if !outcome.report.had_changes {
            if args.verbose && text_output {
                println!("  {} {}", "✓".green(), display);
            }
            continue;
        }

        drifted += 1;
        total_rewrites += outcome.report.total_violations();

        if text_output {
            println!("{}", display.bright_white());
            for pass in &outcome.report.passes {
                for violation in &pass.violations {
                    println!(
                        "  {} [{}] {} {} {}",
                        "drift".yellow().bold(),
                        pass.pass,
                        violation.original,
                        "→".dimmed(),
                        violation.replacement.bright_white(),
                    );
                    println!("    {} {}", "💡".dimmed(), violation.reason.dimmed());
                }
            }
            println!();
        }

        if args.write {
            fs::write(file, &outcome.code)?;
        }

        collected.push(FileReport {
            file: display,
            report: outcome.report,
        });
    }

    if text_output {
        println!(
            "✨ {} Normalization complete!",
            if drifted > 0 && !args.write {
                "Done".yellow().bold()
            } else {
                "Done".green().bold()
            }
        );
        println!("   Files checked: {}", files.len());
        if drifted > 0 {
            println!("   Files with drift: {}", drifted);
            println!("   Rewrites: {}", total_rewrites);
            if args.write {
                println!("   {} Changes written", "✓".green());
            }
        } else {
            println!("   {} No drift found!", "✓".green());
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&collected)?);
    }

    // Check mode reports drift through the exit code
    if !args.write && drifted > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn find_source_files(root: &Path, pipeline: &NormalizationPipeline) -> Vec<PathBuf> {
    if root.is_file() {
        if pipeline.supports(&root.to_string_lossy()) {
            return vec![root.to_path_buf()];
        }
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && pipeline.supports(&path.to_string_lossy()) {
            files.push(path.to_path_buf());
        }
    }
    files
}
