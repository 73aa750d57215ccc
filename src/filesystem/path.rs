//! Pure string algorithms over `/` separated paths.
//!
//! Everything here works on canonical paths: absolute, `/` joined, with no
//! empty, `.` or `..` segments. `..` at the root stays at the root.

/// Home folder of the single guest session, the expansion of a bare `~`.
pub const GUEST_HOME: &str = "/home/guest";
const HOME_ROOT: &str = "/home";

pub fn normalize(path: &str) -> String {
    let segments = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(Vec::new(), |mut acc, segment| {
            match segment {
                "." => {}
                ".." => {
                    acc.pop();
                }
                _ => acc.push(segment),
            }
            acc
        });

    format!("/{}", segments.join("/"))
}

/// Turns `target` into a canonical path, relative targets being taken from
/// `base`.
///
/// ```
/// use treefs::filesystem::path::resolve;
///
/// assert_eq!(resolve("/home/guest", "../jay"), "/home/jay");
/// assert_eq!(resolve("/usr", "~/Desktop"), "/home/guest/Desktop");
/// assert_eq!(resolve("/usr", "/etc/./hosts"), "/etc/hosts");
/// ```
pub fn resolve(base: &str, target: &str) -> String {
    if target.starts_with('/') {
        return normalize(target);
    }

    if let Some(rest) = target.strip_prefix('~') {
        return match rest.split_once('/') {
            _ if rest.is_empty() => normalize(GUEST_HOME),
            Some(("", tail)) => normalize(&format!("{GUEST_HOME}/{tail}")),
            Some((user, tail)) => normalize(&format!("{HOME_ROOT}/{user}/{tail}")),
            None => normalize(&format!("{HOME_ROOT}/{rest}")),
        };
    }

    normalize(&format!("{base}/{target}"))
}

/// Canonical parent of `path`; the root is its own parent.
pub fn parent_of(path: &str) -> String {
    normalize(&format!("{path}/.."))
}

/// Last segment of `path`, `None` for the root.
pub fn file_name(path: &str) -> Option<String> {
    normalize(path).rsplit('/').next().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Canonical segments of `path`, root excluded.
pub fn segments(path: &str) -> Vec<String> {
    normalize(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
