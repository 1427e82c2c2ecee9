// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential to door authorization table
//!
//! One credential per line: `<code> DOOR:<id> DOOR:<id> ...`

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::{read_table, table_lines, StorageError};

const DOOR_PREFIX: &str = "DOOR:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationTable {
    grants: HashMap<String, BTreeSet<String>>,
}

impl AuthorizationTable {
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = read_table(path)?;
        Self::parse(path, &content)
    }

    /// Parse table content; `path` is only used in error messages
    pub fn parse(path: &Path, content: &str) -> Result<Self, StorageError> {
        let mut grants: HashMap<String, BTreeSet<String>> = HashMap::new();

        for (line_no, line) in table_lines(content) {
            let mut tokens = line.split_whitespace();
            let Some(code) = tokens.next() else {
                continue;
            };
            let doors = grants.entry(code.to_string()).or_default();
            for token in tokens {
                match token.strip_prefix(DOOR_PREFIX) {
                    Some(door) if !door.is_empty() => {
                        doors.insert(door.to_string());
                    }
                    _ => {
                        return Err(StorageError::Parse {
                            path: path.to_path_buf(),
                            line: line_no,
                            reason: format!("expected DOOR:<id>, found {:?}", token),
                        })
                    }
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            credentials = grants.len(),
            "loaded authorization table"
        );
        Ok(Self { grants })
    }

    /// Doors the credential opens; exact match on the code
    pub fn doors_for(&self, code: &str) -> Option<&BTreeSet<String>> {
        self.grants.get(code)
    }

    pub fn is_authorized(&self, code: &str, door: &str) -> bool {
        self.doors_for(code).is_some_and(|doors| doors.contains(door))
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod tests;
