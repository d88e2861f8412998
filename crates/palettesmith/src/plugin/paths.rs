//! `~` and environment-variable expansion for manifest paths.

use std::path::Path;

/// Expands `$VAR`, `${VAR}` and a leading `~` using the process environment.
///
/// Unset variables expand to the empty string. A `~` that cannot be resolved
/// to a home directory is left as is.
pub fn expand_path(path: &str) -> String {
    let home = dirs::home_dir();
    expand_path_with(path, |name| std::env::var(name).ok(), home.as_deref())
}

/// Expansion with an explicit variable source and home directory.
pub fn expand_path_with<F>(path: &str, var: F, home: Option<&Path>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if path.is_empty() {
        return String::new();
    }

    let expanded = expand_vars(path, &var);

    match home {
        Some(home) if expanded == "~" => home.to_string_lossy().into_owned(),
        Some(home) if expanded.starts_with("~/") => {
            home.join(&expanded[2..]).to_string_lossy().into_owned()
        }
        _ => expanded,
    }
}

fn expand_vars<F>(input: &str, var: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(&var(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
            // Unterminated `${`: keep literally.
            out.push('$');
            rest = after;
            continue;
        }

        let len = after
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(after.len());
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(&var(&after[..len]).unwrap_or_default());
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn env(name: &str) -> Option<String> {
        match name {
            "XDG_CONFIG_HOME" => Some("/home/ada/.config".to_string()),
            "APP" => Some("kitty".to_string()),
            _ => None,
        }
    }

    fn expand(path: &str) -> String {
        let home = PathBuf::from("/home/ada");
        expand_path_with(path, env, Some(home.as_path()))
    }

    #[test]
    fn test_tilde() {
        assert_eq!(expand("~"), "/home/ada");
        assert_eq!(expand("~/.config/kitty/kitty.conf"), "/home/ada/.config/kitty/kitty.conf");
        assert_eq!(expand("/etc/~/x"), "/etc/~/x");
        assert_eq!(expand("~other/x"), "~other/x");
    }

    #[test]
    fn test_env_vars() {
        assert_eq!(expand("$XDG_CONFIG_HOME/$APP/kitty.conf"), "/home/ada/.config/kitty/kitty.conf");
        assert_eq!(expand("${XDG_CONFIG_HOME}/${APP}.d"), "/home/ada/.config/kitty.d");
        assert_eq!(expand("/opt/$UNSET/x"), "/opt//x");
    }

    #[test]
    fn test_literal_dollars() {
        assert_eq!(expand("cost$"), "cost$");
        assert_eq!(expand("a$-b"), "a$-b");
        assert_eq!(expand("${APP"), "${APP");
    }

    #[test]
    fn test_var_then_tilde() {
        let var = |name: &str| (name == "H").then(|| "~".to_string());
        let home = PathBuf::from("/home/ada");
        assert_eq!(expand_path_with("$H/x", var, Some(home.as_path())), "/home/ada/x");
    }

    #[test]
    fn test_no_home() {
        assert_eq!(expand_path_with("~/x", |_| None, None), "~/x");
        assert_eq!(expand_path_with("", |_| None, None), "");
    }
}
