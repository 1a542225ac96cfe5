use clap::Subcommand;
use paretojournal_core::ExportDocument;
use serde_json::json;
use std::path::PathBuf;

use super::{finish, open_engine, print_json, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write every stored blob to a JSON file
    Export {
        /// Output file
        path: PathBuf,
    },
    /// Restore blobs from an export file
    Import {
        /// Export file to read
        path: PathBuf,
    },
    /// Delete all journal data
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        DataAction::Export { path } => {
            let doc = engine.export()?;
            std::fs::write(&path, doc.to_json()?)?;
            print_json(&json!({
                "path": path,
                "version": doc.version,
                "exportedAt": doc.exported_at,
            }))?;
        }
        DataAction::Import { path } => {
            let raw = std::fs::read_to_string(&path)?;
            let doc = ExportDocument::from_json(&raw)?;
            let written = engine.import(&doc)?;
            print_json(&json!({ "keysImported": written, "pages": engine.pages().len() }))?;
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err("refusing to delete all data without --yes".into());
            }
            engine.reset_all()?;
            print_json(&json!({ "reset": true }))?;
        }
    }

    finish(&mut engine);
    Ok(())
}
