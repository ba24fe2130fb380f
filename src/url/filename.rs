use url::Url;

/// Maximum length of a derived filename, matching common filesystem limits
/// with headroom for temp-file suffixes.
const MAX_FILENAME_LEN: usize = 200;

/// Derives the local filename a page URL materializes to.
///
/// This is a pure function and the single source of truth for page naming:
/// the existing-output index and the page materializer both call it, so a
/// URL whose file is on disk is always recognized as already downloaded.
///
/// Rules:
/// - root or empty path maps to `index.html`
/// - path separators become underscores (`/blog/post` -> `blog_post.html`)
/// - characters unsafe for filenames are replaced with underscores
/// - a `.html` suffix is appended unless the path already ends in
///   `.html` or `.htm`
///
/// Distinct URLs can collide on the same filename (e.g. `/a/b` and `/a_b`);
/// first write wins and later colliders read as "already exists".
pub fn derive_filename(url: &Url) -> String {
    let path = url.path();

    if path.is_empty() || path == "/" {
        return "index.html".to_string();
    }

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return "index.html".to_string();
    }

    let mut name = trimmed.replace('/', "_");
    name = sanitize(&name);

    let lower = name.to_lowercase();
    if !lower.ends_with(".html") && !lower.ends_with(".htm") {
        name.push_str(".html");
    }

    name
}

/// Replaces filesystem-unsafe characters and truncates overlong names.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim().to_string();
    if cleaned.len() > MAX_FILENAME_LEN {
        cleaned.chars().take(MAX_FILENAME_LEN).collect()
    } else {
        cleaned
    }
}
