//! XPath selectors for speedhunters.com.
//!
//! The site's markup is position-based, so these are absolute paths. They
//! break if the theme changes; keeping them in one place makes that a
//! one-file fix.

/// The `ul` holding the article cards on a category index page.
pub const ARTICLE_LIST: &str = "/html/body/div[4]/section/div/section/div[1]/ul";

/// Anchor of each article card within the list.
pub const ARTICLE_LINKS: &str = "/html/body/div[4]/section/div/section/div[1]/ul/li/article/div/h2/a";

/// Root container of an article page, used to detect that content loaded.
pub const ARTICLE_ROOT: &str = "/html/body/div[4]";
