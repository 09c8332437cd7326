use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use graft_editor::{apply_edit_intent, ClassMatchOptions, EditError, EditIntent, MatchStage};
use graft_parser::error::format_error;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// File to edit
    pub file: PathBuf,

    /// Edit intent as JSON (reads stdin when omitted)
    #[arg(short, long)]
    pub intent: Option<String>,

    /// Write the result back instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

pub fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = PathBuf::from(cwd).join(&args.file);
    let source = fs::read_to_string(&path)?;

    let json = match args.intent {
        Some(json) => json,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let intent: EditIntent = serde_json::from_str(&json)?;

    let file_name = args.file.to_string_lossy();
    let options = ClassMatchOptions::from(&config.engine);
    let applied =
        apply_edit_intent(&source, &file_name, &intent, &options).map_err(|err| match err {
            EditError::Parse(parse) => anyhow!("\n{}", format_error(&source, &file_name, &parse)),
            other => anyhow!(other),
        })?;

    if args.write {
        fs::write(&path, &applied.new_text)?;
        println!(
            "{} {} ({} match)",
            "✓".green(),
            args.file.display(),
            stage_name(applied.stage).cyan()
        );
    } else {
        print!("{}", applied.new_text);
    }

    Ok(())
}

fn stage_name(stage: MatchStage) -> &'static str {
    match stage {
        MatchStage::Ast => "ast",
        MatchStage::Pattern => "pattern",
    }
}
