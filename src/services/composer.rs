// src/services/composer.rs

//! Post composer.
//!
//! Builds the daily digest post and its link/tag facets. Bluesky limits a
//! post body to 300 bytes of UTF-8 and addresses facets by byte offset, so
//! all length math here is in bytes, against the final rendered text.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{Facet, MatchSet, PostDraft};
use crate::utils::text::{find_byte_range, truncate_to_byte_budget};

/// Maximum post body size in UTF-8 bytes.
pub const POST_BYTE_LIMIT: usize = 300;

/// Marker appended to a shortened headline URL.
pub const ELLIPSIS: &str = "...";

/// Compose the digest post for `matches`.
///
/// The headline features the first discovered URL. When the message would
/// not fit in [`POST_BYTE_LIMIT`], only that URL is shortened; its link
/// facet still points at the full address.
pub fn compose(matches: &MatchSet, results_uri: &str, hashtag: &str) -> Result<PostDraft> {
    let first = matches
        .first()
        .ok_or_else(|| AppError::compose("no matches to post about"))?;
    let first_url = first.url.as_str();
    let count = matches.len();
    let date = matches.target_date();

    let overhead = overhead_bytes(count, date, results_uri, hashtag);
    if overhead + ELLIPSIS.len() > POST_BYTE_LIMIT {
        return Err(AppError::compose(format!(
            "template alone needs {overhead} bytes of {POST_BYTE_LIMIT}"
        )));
    }

    let display = if overhead + first_url.len() + ELLIPSIS.len() > POST_BYTE_LIMIT {
        let budget = POST_BYTE_LIMIT - overhead - ELLIPSIS.len();
        let shortened = format!("{}{}", truncate_to_byte_budget(first_url, budget), ELLIPSIS);
        log::debug!(
            "Headline URL shortened from {} to {} bytes",
            first_url.len(),
            shortened.len()
        );
        shortened
    } else {
        first_url.to_string()
    };

    let text = render(&display, count, date, results_uri, hashtag);

    let headline = 0..display.len();
    let results = find_byte_range(&text, results_uri, headline.end).ok_or_else(|| {
        AppError::compose(format!("results link {results_uri:?} missing from post text"))
    })?;
    let tag = find_byte_range(&text, hashtag, results.end)
        .ok_or_else(|| AppError::compose(format!("hashtag {hashtag:?} missing from post text")))?;
    let tag_name = hashtag.strip_prefix('#').unwrap_or(hashtag);

    Ok(PostDraft {
        facets: vec![
            Facet::link(headline, first_url),
            Facet::link(results, results_uri),
            Facet::tag(tag, tag_name),
        ],
        text,
    })
}

/// Byte length of the post without the headline URL.
pub fn overhead_bytes(count: usize, date: NaiveDate, results_uri: &str, hashtag: &str) -> usize {
    render("", count, date, results_uri, hashtag).len()
}

fn render(
    display: &str,
    count: usize,
    date: NaiveDate,
    results_uri: &str,
    hashtag: &str,
) -> String {
    format!(
        "{display}{} updated on {}.\n\nSee all updates: {results_uri} {hashtag}",
        others_clause(count),
        date.format("%B %d, %Y"),
    )
}

fn others_clause(count: usize) -> String {
    match count {
        0 | 1 => " was".to_string(),
        n => format!(" and {} others were", n - 1),
    }
}
