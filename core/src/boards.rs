//! Board list loading
//!
//! The board set is a static JSON object mapping board id to display
//! name. A missing or unparsable file just means there is nothing to
//! check in to.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

/// Load the configured boards, or an empty set if the file is unusable
pub fn load_boards(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "board list unavailable, check-in will be skipped");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str::<BTreeMap<String, String>>(&content) {
        Ok(boards) => {
            info!(count = boards.len(), "loaded board list");
            boards
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "board list is not valid JSON, check-in will be skipped");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_id_to_name_map() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"101": "Chat", "102": "News"}}"#).unwrap();

        let boards = load_boards(file.path());
        assert_eq!(boards.len(), 2);
        assert_eq!(boards.get("101").map(String::as_str), Some("Chat"));
    }

    #[test]
    fn missing_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let boards = load_boards(&dir.path().join("cat_id.json"));
        assert!(boards.is_empty());
    }

    #[test]
    fn corrupt_file_yields_empty_set() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3").unwrap();

        let boards = load_boards(file.path());
        assert!(boards.is_empty());
    }
}
