/// One revision as reported by `jj log`. Value copy owned by the snapshot that produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    /// Content identity; changes on every rewrite.
    pub id: String,
    /// Logical identity; survives rebase/squash/describe. Not unique when divergent.
    pub change_id: String,
    pub parents: Vec<String>,
    pub branches: Vec<String>,
    pub is_working: bool,
    pub immutable: bool,
    pub conflicted: bool,
    pub divergent: bool,
    pub summary: String,
    pub author: String,
    pub timestamp: String,
}

impl Commit {
    pub fn short_id(&self) -> &str {
        short(&self.id)
    }

    pub fn short_change_id(&self) -> &str {
        short(&self.change_id)
    }

    pub fn display_summary(&self) -> &str {
        if self.summary.trim().is_empty() {
            "(no description set)"
        } else {
            &self.summary
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Revision string to hand to `jj`. A divergent change id is ambiguous,
    /// so those are addressed by commit id.
    pub fn rev(&self) -> &str {
        if self.divergent || self.change_id.is_empty() {
            &self.id
        } else {
            &self.change_id
        }
    }
}

pub(crate) fn short(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl FileStatus {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(FileStatus::Added),
            'M' => Some(FileStatus::Modified),
            'D' => Some(FileStatus::Deleted),
            'R' => Some(FileStatus::Renamed),
            'C' => Some(FileStatus::Copied),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Copied => 'C',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangedFile {
    pub status: FileStatus,
    pub path: String,
}
