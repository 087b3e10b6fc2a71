// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pull request record and response trimming.
//!
//! ```text
//! POST /repos/o/n/pulls  --> JSON body + ETag/Last-Modified headers
//!        |
//!   trim_pr_json      (keep-list below, lists trimmed per element)
//!        |
//!   PullRequestRecord (serde, chrono timestamps)
//! ```
//!
//! | Key               | Kept fields            |
//! |-------------------|------------------------|
//! | top level         | ETag, Last-Modified, id, number, html_url, state, timestamps, merge info |
//! | `labels[]`        | name                   |
//! | `head`            | ref, label, repo.name  |
//! | `base`            | ref, repo.name         |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which parts of a JSON object survive trimming.
#[derive(Debug, Clone, Copy)]
enum Keep {
    /// Keep the value as is.
    All,
    /// Keep only the listed fields (applied to each element of an array).
    Fields(&'static [(&'static str, Keep)]),
}

const REPO_NAME: Keep = Keep::Fields(&[("name", Keep::All)]);

const PR_KEEP: &[(&str, Keep)] = &[
    ("ETag", Keep::All),
    ("Last-Modified", Keep::All),
    ("id", Keep::All),
    ("number", Keep::All),
    ("html_url", Keep::All),
    ("state", Keep::All),
    ("created_at", Keep::All),
    ("updated_at", Keep::All),
    ("closed_at", Keep::All),
    ("merged_at", Keep::All),
    ("merged", Keep::All),
    ("mergeable", Keep::All),
    ("mergeable_state", Keep::All),
    ("labels", Keep::Fields(&[("name", Keep::All)])),
    (
        "head",
        Keep::Fields(&[("ref", Keep::All), ("label", Keep::All), ("repo", REPO_NAME)]),
    ),
    ("base", Keep::Fields(&[("ref", Keep::All), ("repo", REPO_NAME)])),
];

fn trim_value(value: &Value, keep: Keep) -> Value {
    match (keep, value) {
        (Keep::All, _) => value.clone(),
        (Keep::Fields(fields), Value::Object(map)) => Value::Object(trim_object(map, fields)),
        (Keep::Fields(_), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| trim_value(item, keep)).collect())
        }
        (Keep::Fields(_), other) => other.clone(),
    }
}

fn trim_object(map: &Map<String, Value>, fields: &[(&str, Keep)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(key, keep)| {
            map.get(*key)
                .map(|value| ((*key).to_string(), trim_value(value, *keep)))
        })
        .collect()
}

/// Drops every field of a pull request response that is not persisted.
pub fn trim_pr_json(value: &mut Value) {
    trim_pr_json_from(value, &value.clone());
}

/// Replaces `dest` with the trimmed contents of `src`.
///
/// Whatever `dest` held before is discarded.
pub fn trim_pr_json_from(dest: &mut Value, src: &Value) {
    *dest = trim_value(src, Keep::Fields(PR_KEEP));
}

/// Lifecycle state. `Merged` is a closed pull request whose `merged` flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

/// GitHub's `mergeable_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    Behind,
    Blocked,
    Clean,
    Dirty,
    Draft,
    HasHooks,
    Unstable,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Head or base side of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// `<account>:<branch>`; GitHub only reports it for the head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub repo: Option<RepoName>,
}

/// Persisted view of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(rename = "ETag", default)]
    pub e_tag: Option<String>,
    #[serde(rename = "Last-Modified", default)]
    pub last_modified: Option<String>,
    pub id: u64,
    pub number: u64,
    pub html_url: String,
    pub state: PullRequestState,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub mergeable_state: Option<MergeableState>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

impl PullRequestRecord {
    /// Parses an already trimmed response.
    ///
    /// # Errors
    ///
    /// Fails if required fields are missing or have the wrong type.
    pub fn from_trimmed(value: Value) -> Result<Self, serde_json::Error> {
        let mut record: Self = serde_json::from_value(value)?;
        if record.state == PullRequestState::Closed && record.merged {
            record.state = PullRequestState::Merged;
        }
        Ok(record)
    }

    /// Sets the repository the pull request targets.
    #[must_use]
    pub fn in_repository(mut self, owner: &str, repo: &str) -> Self {
        owner.clone_into(&mut self.owner);
        repo.clone_into(&mut self.repo);
        self
    }

    /// Sets title and body, which are not part of the persisted response.
    #[must_use]
    pub fn with_text(mut self, title: &str, body: &str) -> Self {
        title.clone_into(&mut self.title);
        self.body = Some(body.to_string());
        self
    }

    /// Name of the head branch.
    #[must_use]
    pub fn head_ref(&self) -> &str {
        &self.head.ref_name
    }

    /// Repository name of the base side, if reported.
    #[must_use]
    pub fn base_repo_name(&self) -> Option<&str> {
        self.base.repo.as_ref().map(|r| r.name.as_str())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == PullRequestState::Open
    }
}
