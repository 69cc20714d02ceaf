//! Filename and path helpers.

use std::path::{Path, PathBuf};

use url::Url;

/// Characters that are unsafe in filenames on at least one platform.
const UNSAFE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Longest filename stem we will produce.
const MAX_STEM_LEN: usize = 200;

/// Name of the session file inside the output directory.
pub const SESSION_FILE_NAME: &str = "progress.json";

/// Replace filesystem-unsafe characters and cap the length.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_STEM_LEN)
        .collect();
    if cleaned.is_empty() {
        "article".to_string()
    } else {
        cleaned
    }
}

/// Filename for an article PDF, derived from its title.
#[must_use]
pub fn pdf_filename(title: &str) -> String {
    format!("{}.pdf", sanitize_filename(title))
}

/// Filesystem-safe slug from a URL path.
///
/// `https://example.com/2024/01/some-article/` becomes `2024_01_some-article`.
/// Used as the title fallback when an article page has no `h1`.
#[must_use]
pub fn slug_from_url(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().trim_matches('/').to_string())
        .unwrap_or_else(|_| url.trim_matches('/').to_string());
    sanitize_filename(&path)
}

/// Where the session file lives for a given output directory.
#[must_use]
pub fn session_file_path(output_dir: &Path) -> PathBuf {
    output_dir.join(SESSION_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(
            sanitize_filename("Project Car: The \"Best\" Build?"),
            "Project Car_ The _Best_ Build_"
        );
        assert_eq!(sanitize_filename("a/b\\c|d"), "a_b_c_d");
    }

    #[test]
    fn trims_and_handles_empty() {
        assert_eq!(sanitize_filename("  hello  "), "hello");
        assert_eq!(sanitize_filename(""), "article");
        assert_eq!(sanitize_filename("   "), "article");
    }

    #[test]
    fn caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), 200);
    }

    #[test]
    fn pdf_filename_appends_extension() {
        assert_eq!(pdf_filename("Some Article"), "Some Article.pdf");
    }

    #[test]
    fn slug_strips_host_and_slashes() {
        assert_eq!(
            slug_from_url("https://www.speedhunters.com/2024/01/some-article/"),
            "2024_01_some-article"
        );
    }

    #[test]
    fn slug_survives_unparseable_input() {
        assert_eq!(slug_from_url("not a url/at all/"), "not a url_at all");
    }

    #[test]
    fn session_path_joins_file_name() {
        let path = session_file_path(Path::new("/tmp/out"));
        assert_eq!(path, PathBuf::from("/tmp/out/progress.json"));
    }
}
