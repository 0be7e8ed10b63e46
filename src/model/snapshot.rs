use std::collections::HashMap;

use super::Commit;

/// One complete `jj log` fetch. Replaced wholesale on every refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    commits: Vec<Commit>,
    children: HashMap<String, Vec<String>>,
    positions: HashMap<String, usize>,
}

impl Snapshot {
    pub fn new(commits: Vec<Commit>) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut positions = HashMap::with_capacity(commits.len());
        for (idx, commit) in commits.iter().enumerate() {
            positions.insert(commit.id.clone(), idx);
            for parent in &commit.parents {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(commit.id.clone());
            }
        }
        Self {
            commits,
            children,
            positions,
        }
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Commit> {
        self.commits.get(idx)
    }

    pub fn by_id(&self, id: &str) -> Option<&Commit> {
        self.positions.get(id).map(|&idx| &self.commits[idx])
    }

    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds a commit by change id. Divergent changes have several candidates;
    /// `prefer_id` picks the one that was previously seen if it still exists.
    pub fn find_change(&self, change_id: &str, prefer_id: Option<&str>) -> Option<usize> {
        if let Some(id) = prefer_id
            && let Some(idx) = self.index_of_id(id)
            && self.commits[idx].change_id == change_id
        {
            return Some(idx);
        }
        self.commits.iter().position(|c| c.change_id == change_id)
    }

    pub fn working_copy(&self) -> Option<usize> {
        self.commits.iter().position(|c| c.is_working)
    }
}
