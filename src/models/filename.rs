// src/models/filename.rs

//! Structured metadata parsed from an otrkey file name.
//!
//! Names follow the OTR convention
//! `Title[_SxxEyy]_YY.MM.DD_HH-MM_channel_duration_TVOON_DE.mpg[.HQ|.HD].{avi|mp4}.otrkey`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        ^(?P<title>.+?)
        (?:_S(?P<season>\d{2})E(?P<episode>\d{2}))?
        _(?P<date>\d{2}\.\d{2}\.\d{2})
        _(?P<time>\d{2}-\d{2})
        _(?P<channel>[a-z0-9]+)
        _(?P<duration>\d+)
        _TVOON_DE\.mpg
        (?:\.(?P<quality>HQ|HD))?
        \.(?P<container>avi|mp4)
        \.otrkey$",
    )
    .expect("filename pattern is valid")
});

/// Metadata carried by an otrkey file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFilename {
    /// Title with underscores replaced by spaces
    pub title: String,
    pub season: Option<String>,
    pub episode: Option<String>,
    /// Broadcast date as `YYYY-MM-DD`, read from the `YY.MM.DD` name token
    pub date: String,
    /// Broadcast time as `HH:MM`
    pub time: String,
    pub channel: String,
    /// Duration in minutes
    pub duration: String,
    /// `HQ` or `HD`; absent for the standard-quality encode
    pub quality: Option<String>,
    /// `avi` or `mp4`
    pub container: String,
}

impl ParsedFilename {
    /// Parse a file name, returning `None` if it does not follow the grammar.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = FILENAME_PATTERN.captures(file_name)?;
        let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

        let (year, month, day) = split3(caps.name("date")?.as_str(), '.')?;
        let (hour, minute) = caps.name("time")?.as_str().split_once('-')?;

        Some(Self {
            title: caps.name("title")?.as_str().replace('_', " ").trim().to_string(),
            season: group("season"),
            episode: group("episode"),
            date: format!("20{year}-{month}-{day}"),
            time: format!("{hour}:{minute}"),
            channel: group("channel")?,
            duration: group("duration")?,
            quality: group("quality"),
            container: group("container")?,
        })
    }

    /// Broadcast date, if it names a real calendar day.
    pub fn air_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// `SxxEyy` marker when both season and episode are present.
    pub fn episode_tag(&self) -> Option<String> {
        match (&self.season, &self.episode) {
            (Some(season), Some(episode)) => Some(format!("S{season}E{episode}")),
            _ => None,
        }
    }
}

fn split3(s: &str, sep: char) -> Option<(&str, &str, &str)> {
    let mut parts = s.splitn(3, sep);
    Some((parts.next()?, parts.next()?, parts.next()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_episode() {
        let parsed =
            ParsedFilename::parse("show_S01E02_01.01.24_20-00_pro7_90_TVOON_DE.mpg.HD.mp4.otrkey")
                .unwrap();

        assert_eq!(parsed.title, "show");
        assert_eq!(parsed.season.as_deref(), Some("01"));
        assert_eq!(parsed.episode.as_deref(), Some("02"));
        assert_eq!(parsed.date, "2001-01-24");
        assert_eq!(parsed.time, "20:00");
        assert_eq!(parsed.channel, "pro7");
        assert_eq!(parsed.duration, "90");
        assert_eq!(parsed.quality.as_deref(), Some("HD"));
        assert_eq!(parsed.container, "mp4");
        assert_eq!(parsed.episode_tag().as_deref(), Some("S01E02"));
    }

    #[test]
    fn test_parse_movie_without_quality() {
        let name = "Der_Tatortreiniger_24.03.15_22-45_ndr_30_TVOON_DE.mpg.avi.otrkey";
        let parsed = ParsedFilename::parse(name).unwrap();

        assert_eq!(parsed.title, "Der Tatortreiniger");
        assert_eq!(parsed.season, None);
        assert_eq!(parsed.episode, None);
        assert_eq!(parsed.date, "2024-03-15");
        assert_eq!(parsed.time, "22:45");
        assert_eq!(parsed.channel, "ndr");
        assert_eq!(parsed.quality, None);
        assert_eq!(parsed.container, "avi");
        assert_eq!(parsed.air_date(), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parsed.episode_tag(), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let parsed =
            ParsedFilename::parse("News_24.03.15_19-00_zdf_15_tvoon_de.MPG.hq.MP4.OTRKEY").unwrap();
        assert_eq!(parsed.quality.as_deref(), Some("hq"));
        assert_eq!(parsed.container, "MP4");
    }

    #[test]
    fn test_parse_rejects_non_matching() {
        assert!(ParsedFilename::parse("readme.txt").is_none());
        assert!(ParsedFilename::parse("old.otrkey").is_none());
        assert!(
            ParsedFilename::parse("Show_24.03.15_20-15_ard_90_TVOON_DE.mpg.mkv.otrkey").is_none()
        );
    }

    #[test]
    fn test_air_date_rejects_impossible_day() {
        let parsed =
            ParsedFilename::parse("Show_24.02.31_20-15_ard_90_TVOON_DE.mpg.avi.otrkey").unwrap();
        assert_eq!(parsed.date, "2024-02-31");
        assert!(parsed.air_date().is_none());
    }
}
