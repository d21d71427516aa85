//! Path helpers shared by the config layer and the notepad's file dialogs.

use std::path::{Path, PathBuf};

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Resolve a user-typed path: `~/` is expanded, relative paths land in `base`.
pub fn resolve_user_path(raw: &str, base: &Path) -> PathBuf {
    let expanded = expand_tilde(raw.trim());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/log/x"), PathBuf::from("/var/log/x"));
        if dirs::home_dir().is_some() {
            assert!(!expand_tilde("~/notes").to_string_lossy().starts_with('~'));
        }
    }

    #[test]
    fn relative_paths_resolve_into_base() {
        let base = Path::new("/sandbox");
        assert_eq!(
            resolve_user_path("note.txt", base),
            PathBuf::from("/sandbox/note.txt")
        );
        assert_eq!(
            resolve_user_path(" /tmp/a.txt ", base),
            PathBuf::from("/tmp/a.txt")
        );
    }
}
