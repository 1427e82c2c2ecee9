// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Card reader to door connection table
//!
//! Lines of the form `DOOR <door_id> <reader_id>`. Other line kinds are
//! layout entries for other tools and are skipped.

use std::collections::HashMap;
use std::path::Path;

use crate::{read_table, table_lines, StorageError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionTable {
    door_by_reader: HashMap<String, String>,
}

impl ConnectionTable {
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = read_table(path)?;
        Self::parse(path, &content)
    }

    /// Parse table content; `path` is only used in error messages
    pub fn parse(path: &Path, content: &str) -> Result<Self, StorageError> {
        let mut door_by_reader = HashMap::new();

        for (line_no, line) in table_lines(content) {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let (door, reader) = match tokens.as_slice() {
                ["DOOR", door, reader] => (*door, *reader),
                ["DOOR", ..] => {
                    return Err(StorageError::Parse {
                        path: path.to_path_buf(),
                        line: line_no,
                        reason: "expected DOOR <door_id> <reader_id>".to_string(),
                    })
                }
                _ => continue,
            };

            if let Some(existing) = door_by_reader.insert(reader.to_string(), door.to_string()) {
                if existing != door {
                    return Err(StorageError::Parse {
                        path: path.to_path_buf(),
                        line: line_no,
                        reason: format!(
                            "reader {} already controls door {}, not {}",
                            reader, existing, door
                        ),
                    });
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            readers = door_by_reader.len(),
            "loaded connection table"
        );
        Ok(Self { door_by_reader })
    }

    /// Door controlled by the card reader
    pub fn door_for_reader(&self, reader: &str) -> Option<&str> {
        self.door_by_reader.get(reader).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.door_by_reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.door_by_reader.is_empty()
    }
}

#[cfg(test)]
#[path = "connections_tests.rs"]
mod tests;
