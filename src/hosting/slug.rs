#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

/// Extracts `owner/repo` from a GitHub remote URL in https, ssh, or scp form.
pub fn parse_remote_slug(url: &str) -> Option<RepoSlug> {
    let url = url.trim();
    let path = if let Some(rest) = url.strip_prefix("git@github.com:") {
        rest
    } else {
        let without_scheme = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .or_else(|| url.strip_prefix("ssh://"))?;
        let without_user = without_scheme
            .split_once('@')
            .map(|(_, host)| host)
            .unwrap_or(without_scheme);
        without_user.strip_prefix("github.com")?.trim_start_matches(['/', ':'])
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some(RepoSlug {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}
