//! Subreddit watchlists.
//!
//! Two plain text files, one subreddit per line, `#`-prefixed lines and
//! blank lines ignored: `subreddits.txt` is the allow-list, `blacklist.txt`
//! the deny-list. They combine into Reddit's multi syntax (`a+b-x-y`).

use std::collections::HashSet;
use std::path::Path;

use super::ConfigError;

pub const ALLOW_FILE: &str = "subreddits.txt";
pub const DENY_FILE: &str = "blacklist.txt";

#[derive(Debug, Clone, Default)]
pub struct Watchlists {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

fn read_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

impl Watchlists {
    /// Load both lists from `dir`. Either file missing is an error; the
    /// caller logs it and skips the scan cycle.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            allow: read_list(&dir.join(ALLOW_FILE))?,
            deny: read_list(&dir.join(DENY_FILE))?,
        })
    }

    /// Reddit multi expression: allow entries joined with `+`, deny entries
    /// appended with `-`. Empty when nothing is allowed.
    pub fn multi(&self) -> String {
        let mut multi = self.allow.join("+");
        if !multi.is_empty() && !self.deny.is_empty() {
            multi.push('-');
            multi.push_str(&self.deny.join("-"));
        }
        multi
    }

    /// Deny entries as a lowercase set, for per-submission exclusion checks.
    pub fn deny_set(&self) -> HashSet<String> {
        self.deny.iter().map(|name| name.to_lowercase()).collect()
    }
}
