//! YouTube URL recognition.
//!
//! Accepted forms: `youtube.com/watch?v=ID`, `youtube.com/{shorts,embed,live}/ID`
//! (also on `m.` and `music.` hosts) and `youtu.be/ID`. Video ids are exactly
//! eleven characters of `[A-Za-z0-9_-]`.

const VIDEO_ID_LEN: usize = 11;
const YOUTUBE_HOSTS: [&str; 3] = ["youtube.com", "m.youtube.com", "music.youtube.com"];
const SHORT_HOST: &str = "youtu.be";

struct ParsedUrl<'a> {
    scheme: String,
    host: String,
    path: &'a str,
    query: &'a str,
}

fn parse(url: &str) -> Option<ParsedUrl<'_>> {
    let (scheme, rest) = url.trim().split_once("://")?;

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, rest) = rest.split_at(authority_end);

    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);

    let rest = rest.split('#').next().unwrap_or("");
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    Some(ParsedUrl {
        scheme: scheme.to_ascii_lowercase(),
        host,
        path,
        query,
    })
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Pulls the eleven character video id out of a YouTube URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = parse(url)?;

    let candidate = if parsed.host == SHORT_HOST {
        parsed.path.trim_matches('/').split('/').next()
    } else if YOUTUBE_HOSTS.contains(&parsed.host.as_str()) {
        let parts = parsed
            .path
            .split('/')
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>();
        if parsed.path == "/watch" {
            parsed
                .query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, value)| *key == "v" && !value.is_empty())
                .map(|(_, value)| value)
        } else if parts.len() > 1 && matches!(parts[0], "shorts" | "embed" | "live") {
            Some(parts[1])
        } else {
            None
        }
    } else {
        None
    };

    candidate.filter(|c| is_video_id(c)).map(str::to_string)
}

/// An http(s) URL on a known YouTube host that names a single video.
pub fn is_valid_youtube_url(url: &str) -> bool {
    let Some(parsed) = parse(url) else {
        return false;
    };

    if parsed.scheme != "http" && parsed.scheme != "https" {
        return false;
    }

    if parsed.host != SHORT_HOST && !YOUTUBE_HOSTS.contains(&parsed.host.as_str()) {
        return false;
    }

    extract_video_id(url).is_some()
}

/// Rewrites any recognized form to `https://www.youtube.com/watch?v=ID`,
/// dropping playlist and timestamp parameters. Unrecognized input is only
/// trimmed.
pub fn canonical_watch_url(url: &str) -> String {
    match extract_video_id(url) {
        Some(id) => format!("https://www.youtube.com/watch?v={id}"),
        None => url.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn extracts_from_watch_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extract_video_id("https://youtube.com/watch?list=PL1&v=dQw4w9WgXcQ&t=42").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extract_video_id("https://music.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn extracts_from_path_forms() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/live/dQw4w9WgXcQ",
            "  HTTPS://WWW.YOUTUBE.COM/watch?v=dQw4w9WgXcQ  ",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some(ID), "{url}");
        }
    }

    #[test]
    fn rejects_malformed_ids_and_hosts() {
        assert_eq!(extract_video_id("https://youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("https://youtube.com/watch?v="), None);
        assert_eq!(extract_video_id("https://vimeo.com/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://youtube.com/channel/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn valid_url_requires_http_scheme() {
        assert!(is_valid_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_valid_youtube_url("http://youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_valid_youtube_url("ftp://youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_valid_youtube_url("not a url"));
    }

    #[test]
    fn canonical_form_strips_extras() {
        assert_eq!(
            canonical_watch_url("https://youtu.be/dQw4w9WgXcQ?t=10"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(canonical_watch_url("  nope  "), "nope");
    }
}
