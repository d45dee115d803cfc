use std::path::Path;
use std::process::Command;

/// Who is recording a decision, from git config: `user.email`, then
/// `user.name`. `None` when git is missing or neither key is set.
#[must_use]
pub fn git_identity(project_root: &Path) -> Option<String> {
    git_config(project_root, "user.email").or_else(|| git_config(project_root, "user.name"))
}

fn git_config(project_root: &Path, key: &str) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(project_root)
        .args(["config", "--get", key])
        .output()
        .map_err(|error| tracing::debug!(%error, "git is not available"))
        .ok()?;
    if !output.status.success() {
        return None;
    }
    first_line(&String::from_utf8_lossy(&output.stdout))
}

fn first_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}
