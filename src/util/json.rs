use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// JSON output style
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JsonStyle {
    /// Compact one-line JSON
    Compact,
    /// Pretty printed (indented) JSON
    Pretty,
}

/// Serialize `data` in the given style.
pub fn to_json_string<T: Serialize>(data: &T, style: JsonStyle) -> Result<String> {
    let json = match style {
        JsonStyle::Compact => serde_json::to_string(data)?,
        JsonStyle::Pretty => serde_json::to_string_pretty(data)?,
    };
    Ok(json)
}

/// Save any serializable data to a JSON file.
pub fn save_json_output<T: Serialize>(data: &T, out_path: &Path, style: JsonStyle) -> Result<()> {
    let json = to_json_string(data, style)?;

    // create or truncate
    let mut file = File::create(out_path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn saved_file_parses_back() {
        let path = std::env::temp_dir().join(format!("siip-json-{}.json", std::process::id()));
        let data = json!([{"domain": "example.com", "version": 1}]);
        save_json_output(&data, &path, JsonStyle::Compact).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, r#"[{"domain":"example.com","version":1}]"#);
    }
}
