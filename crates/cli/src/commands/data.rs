//! Structured-data subcommand: decode a JSON document through the
//! builder protocol and re-emit the normalized wire form.

use std::io::Read;
use std::path::Path;

use arbor_interchange::{data_from_json, data_to_json};

pub(crate) fn cmd_data(file: Option<&Path>) -> Result<String, String> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("reading '{}': {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("reading stdin: {}", e))?;
            buf
        }
    };

    let raw: serde_json::Value =
        serde_json::from_str(&input).map_err(|e| format!("parsing JSON: {}", e))?;
    let data = data_from_json(&raw).map_err(|e| e.to_string())?;
    Ok(data_to_json(&data).to_string())
}
