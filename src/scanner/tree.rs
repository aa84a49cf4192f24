//! Indented hierarchy listing.

use crate::constants::tree as tree_constants;

/// Render sorted `/`-separated paths as an indented tree.
///
/// Each nesting level adds two spaces; directories get a trailing `/` and
/// are printed once, before their contents.
pub fn hierarchy_tree<S: AsRef<str>>(sorted_paths: &[S]) -> String {
    let mut lines = Vec::new();
    let mut open_dirs: Vec<&str> = Vec::new();

    for path in sorted_paths {
        let parts: Vec<&str> = path.as_ref().split('/').filter(|p| !p.is_empty()).collect();
        let Some((file, dirs)) = parts.split_last() else {
            continue;
        };

        let shared = open_dirs
            .iter()
            .zip(dirs.iter())
            .take_while(|(a, b)| a == b)
            .count();
        open_dirs.truncate(shared);

        for dir in &dirs[shared..] {
            lines.push(format!("{}{}/", indent(open_dirs.len()), dir));
            open_dirs.push(*dir);
        }
        lines.push(format!("{}{}", indent(open_dirs.len()), file));
    }

    lines.join("\n")
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * tree_constants::INDENT_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_tree() {
        let paths = ["Cargo.toml", "src/ai/mod.rs", "src/ai/prompt/store.rs", "src/lib.rs", "tests/it.rs"];
        let tree = hierarchy_tree(&paths);
        assert_eq!(
            tree,
            "Cargo.toml\nsrc/\n  ai/\n    mod.rs\n    prompt/\n      store.rs\n  lib.rs\ntests/\n  it.rs"
        );
    }

    #[test]
    fn test_sibling_dirs_reopen_correctly() {
        let paths = ["a/x/1.rs", "a/y/2.rs", "b/3.rs"];
        assert_eq!(
            hierarchy_tree(&paths),
            "a/\n  x/\n    1.rs\n  y/\n    2.rs\nb/\n  3.rs"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(hierarchy_tree::<&str>(&[]), "");
    }
}
