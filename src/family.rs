//! Browser family detection from profile paths.

use std::path::PathBuf;

use crate::parsers::browser::BrowserFamily;

/// Each rule lists substrings that must all appear in the lowercased path.
const FAMILY_RULES: &[(BrowserFamily, &[&str])] = &[
    (BrowserFamily::Edge, &["microsoft", "edge"]),
    (BrowserFamily::Chrome, &["google", "chrome"]),
    (BrowserFamily::Firefox, &["mozilla", "firefox"]),
    (BrowserFamily::Opera, &["opera"]),
    (BrowserFamily::Brave, &["bravesoftware", "brave"]),
];

/// Family for a single path, if any rule matches.
pub fn family_for_path(path: &str) -> Option<BrowserFamily> {
    let lower = path.to_lowercase();
    FAMILY_RULES
        .iter()
        .find(|(_, needles)| needles.iter().all(|needle| lower.contains(needle)))
        .map(|(family, _)| *family)
}

/// One label for a whole run: the first path, in order, that matches any
/// rule decides. Mixed-vendor roots therefore get a single label.
pub fn detect_family<'a, I>(candidate_paths: I) -> BrowserFamily
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    candidate_paths
        .into_iter()
        .find_map(|path| family_for_path(&path.to_string_lossy()))
        .unwrap_or(BrowserFamily::Unknown)
}
