use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::{default_category_title, ParseOptions, ParsedCategory, RawCategory};

lazy_static! {
    static ref MEMBER_SPLITTER: Regex = Regex::new(r"[\n,]+").unwrap();
}

fn dedupe_key(name: &str) -> String {
    name.to_lowercase()
}

fn normalize_title(title: Option<&str>, index: usize) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => default_category_title(index),
    }
}

fn split_members(raw_text: &str) -> impl Iterator<Item = &str> {
    MEMBER_SPLITTER
        .split(raw_text)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Keeps only the first occurrence of every name, compared case-insensitively.
/// `seen` is shared by the caller when several lists are deduplicated together.
fn retain_unseen<'a, I>(names: I, seen: &mut HashSet<String>) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    names
        .filter(|name| seen.insert(dedupe_key(name)))
        .map(str::to_string)
        .collect()
}

pub fn parse_participants(raw_text: &str, options: &ParseOptions) -> Vec<String> {
    let members = split_members(raw_text);
    if options.remove_duplicates {
        retain_unseen(members, &mut HashSet::new())
    } else {
        members.map(str::to_string).collect()
    }
}

/// Parses every category's text into members.
///
/// Deduplication runs over all categories at once: a name in an earlier
/// category suppresses the same name in any later one. Categories that end up
/// without members are left out of the result.
pub fn parse_categories(
    raw_categories: &[RawCategory],
    options: &ParseOptions,
) -> Vec<ParsedCategory> {
    let mut seen = HashSet::new();

    raw_categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let members = split_members(category.text.as_deref().unwrap_or(""));
            let members = if options.remove_duplicates {
                retain_unseen(members, &mut seen)
            } else {
                members.map(str::to_string).collect()
            };

            ParsedCategory {
                id: category.id.unwrap_or(index as u64 + 1),
                title: normalize_title(category.title.as_deref(), index),
                members,
            }
        })
        .filter(|category| !category.members.is_empty())
        .collect()
}

pub fn count_participants(categories: &[ParsedCategory]) -> usize {
    categories.iter().map(|c| c.members.len()).sum()
}

/// Reads a count typed by a user. Leading whitespace, an optional sign and the
/// leading digits are used, anything after them is ignored. Values that are
/// not numbers or smaller than one become one.
pub fn parse_positive_integer(value: &str) -> usize {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digit_count = digits.bytes().take_while(u8::is_ascii_digit).count();
    if negative || digit_count == 0 {
        return 1;
    }

    match digits[..digit_count].parse::<usize>() {
        Ok(parsed) if parsed >= 1 => parsed,
        Ok(_) => 1,
        // Too many digits for usize
        Err(_) => usize::MAX,
    }
}

pub fn normalize_count(value: i64) -> usize {
    if value < 1 {
        1
    } else {
        usize::try_from(value).unwrap_or(usize::MAX)
    }
}
