// src/pipeline/search.rs

//! Title search over a saved listing.
//!
//! Files are matched on their parsed title or raw name, then grouped so that
//! all encodes of one broadcast (every quality, container and mirror) show up
//! together.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::models::{FileEntry, MirrorDescriptor, ParsedFilename};

/// Display order for link labels; anything else sorts last.
const FORMAT_ORDER: [&str; 4] = ["mp4", "avi", "HQ", "HD"];

/// A download link for one encode of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLink {
    /// Quality marker (upper-case) or container (lower-case)
    pub label: String,
    pub mirror_name: String,
    pub file_name: String,
    pub url: String,
}

/// All encodes of one broadcast that matched a search.
#[derive(Debug, Clone)]
pub struct SearchGroup {
    /// Metadata of the first matching file in the group
    pub broadcast: ParsedFilename,
    pub links: Vec<SearchLink>,
}

impl SearchGroup {
    /// One-line description, e.g. `Show (S01E02) | 2024-03-15 20:15 | ard | 90 min`.
    pub fn heading(&self) -> String {
        let b = &self.broadcast;
        let title = match b.episode_tag() {
            Some(tag) => format!("{} ({tag})", b.title),
            None => b.title.clone(),
        };
        format!(
            "{title} | {} {} | {} | {} min",
            b.date, b.time, b.channel, b.duration
        )
    }
}

/// Lower-case and drop underscores so `Der_Tatort` finds `der tatort`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('_', "")
}

/// Search `entries` for `term`.
///
/// Mirrors without a `search_url` template contribute no links. A blank term
/// matches nothing.
pub fn search(
    entries: &[FileEntry],
    mirrors: &[MirrorDescriptor],
    term: &str,
) -> Vec<SearchGroup> {
    let term = normalize(term.trim());
    if term.is_empty() {
        return Vec::new();
    }

    let templates: HashMap<&str, &str> = mirrors
        .iter()
        .filter_map(|m| m.search_url.as_deref().map(|url| (m.name.as_str(), url)))
        .collect();

    let mut groups: Vec<SearchGroup> = Vec::new();
    let mut positions: HashMap<(String, String, String, String, String), usize> = HashMap::new();

    for entry in entries {
        let parsed = ParsedFilename::parse(&entry.file_name);
        let title_match = parsed
            .as_ref()
            .is_some_and(|p| normalize(&p.title).contains(&term));
        if !title_match && !normalize(&entry.file_name).contains(&term) {
            continue;
        }
        let Some(parsed) = parsed else {
            continue;
        };

        let key = (
            parsed.title.clone(),
            parsed.date.clone(),
            parsed.time.clone(),
            parsed.channel.clone(),
            parsed.duration.clone(),
        );
        let link = templates
            .get(entry.mirror_name.as_str())
            .map(|template| SearchLink {
                label: link_label(&parsed),
                mirror_name: entry.mirror_name.clone(),
                file_name: entry.file_name.clone(),
                url: fill_template(template, &entry.file_name),
            });

        let position = *positions.entry(key).or_insert_with(|| {
            groups.push(SearchGroup {
                broadcast: parsed,
                links: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].links.extend(link);
    }

    for group in &mut groups {
        group.links.sort_by_key(|link| format_rank(&link.label));
    }
    groups
}

fn link_label(parsed: &ParsedFilename) -> String {
    match &parsed.quality {
        Some(quality) => quality.to_uppercase(),
        None => parsed.container.to_lowercase(),
    }
}

fn format_rank(label: &str) -> usize {
    FORMAT_ORDER
        .iter()
        .position(|known| *known == label)
        .unwrap_or(FORMAT_ORDER.len())
}

/// Substitute the URL-encoded file name for `{query}`.
fn fill_template(template: &str, file_name: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(file_name.as_bytes()).collect();
    template.replace("{query}", &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HD: &str = "Der_Tatortreiniger_24.03.15_22-45_ndr_30_TVOON_DE.mpg.HD.mp4.otrkey";
    const SD: &str = "Der_Tatortreiniger_24.03.15_22-45_ndr_30_TVOON_DE.mpg.avi.otrkey";
    const MP4: &str = "Der_Tatortreiniger_24.03.15_22-45_ndr_30_TVOON_DE.mpg.mp4.otrkey";
    const OTHER: &str = "Tagesschau_24.03.15_20-00_ard_15_TVOON_DE.mpg.avi.otrkey";

    fn mirrors() -> Vec<MirrorDescriptor> {
        vec![
            MirrorDescriptor::direct("alpha", "https://alpha.example/list")
                .with_search_url("https://alpha.example/search?q={query}"),
            MirrorDescriptor::direct("beta", "https://beta.example/list"),
        ]
    }

    #[test]
    fn test_groups_encodes_and_orders_links() {
        let entries = vec![
            FileEntry::new("alpha", HD),
            FileEntry::new("alpha", SD),
            FileEntry::new("beta", SD),
            FileEntry::new("alpha", MP4),
            FileEntry::new("alpha", OTHER),
        ];

        let groups = search(&entries, &mirrors(), "tatort");
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(
            group.heading(),
            "Der Tatortreiniger | 2024-03-15 22:45 | ndr | 30 min"
        );
        let labels: Vec<&str> = group.links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["mp4", "avi", "HD"]);
        assert!(group.links.iter().all(|l| l.mirror_name == "alpha"));
    }

    #[test]
    fn test_underscores_and_case_are_ignored() {
        let entries = vec![FileEntry::new("alpha", HD)];
        assert_eq!(search(&entries, &mirrors(), "DER_TATORT").len(), 1);
        assert_eq!(search(&entries, &mirrors(), "der tatort").len(), 1);
        assert_eq!(search(&entries, &mirrors(), "dertatort").len(), 1);
        assert_eq!(search(&entries, &mirrors(), "tatort reiniger").len(), 0);
    }

    #[test]
    fn test_match_on_raw_file_name() {
        let entries = vec![FileEntry::new("alpha", OTHER)];
        let groups = search(&entries, &mirrors(), "ard15");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].broadcast.title, "Tagesschau");
    }

    #[test]
    fn test_unparseable_matches_are_dropped() {
        let entries = vec![FileEntry::new("alpha", "tatort.otrkey")];
        assert!(search(&entries, &mirrors(), "tatort").is_empty());
    }

    #[test]
    fn test_blank_term_matches_nothing() {
        let entries = vec![FileEntry::new("alpha", HD)];
        assert!(search(&entries, &mirrors(), "  ").is_empty());
        assert!(search(&entries, &mirrors(), "_").is_empty());
    }

    #[test]
    fn test_link_url_is_encoded() {
        let entries = vec![FileEntry::new(
            "alpha",
            "A+B_24.03.15_22-45_ndr_30_TVOON_DE.mpg.avi.otrkey",
        )];
        let groups = search(&entries, &mirrors(), "a+b");
        assert_eq!(
            groups[0].links[0].url,
            "https://alpha.example/search?q=A%2BB_24.03.15_22-45_ndr_30_TVOON_DE.mpg.avi.otrkey"
        );
    }

    #[test]
    fn test_episode_tag_in_heading() {
        let entries = vec![FileEntry::new(
            "beta",
            "show_S01E02_24.01.01_20-00_pro7_90_TVOON_DE.mpg.HD.mp4.otrkey",
        )];
        let groups = search(&entries, &mirrors(), "show");
        assert_eq!(
            groups[0].heading(),
            "show (S01E02) | 2024-01-01 20:00 | pro7 | 90 min"
        );
        assert!(groups[0].links.is_empty());
    }
}
