use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::modules::catalog::domain::SourceTier;
use crate::shared::errors::EngineError;

/// Which attribute a waterfall pass is trying to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeClass {
    Images,
    Videos,
    Website,
    Coordinates,
}

impl AttributeClass {
    pub const ALL: [AttributeClass; 4] = [
        AttributeClass::Images,
        AttributeClass::Videos,
        AttributeClass::Website,
        AttributeClass::Coordinates,
    ];
}

impl fmt::Display for AttributeClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            AttributeClass::Images => "images",
            AttributeClass::Videos => "videos",
            AttributeClass::Website => "website",
            AttributeClass::Coordinates => "coordinates",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for AttributeClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "images" => Ok(AttributeClass::Images),
            "videos" => Ok(AttributeClass::Videos),
            "website" => Ok(AttributeClass::Website),
            "coordinates" => Ok(AttributeClass::Coordinates),
            other => Err(EngineError::Validation(format!(
                "Unknown attribute class: {}",
                other
            ))),
        }
    }
}

/// Steps of the image chain, in descending trust order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStep {
    /// og:image scraped from the venue's own website.
    OfficialPage,
    /// Image search restricted to curated editorial domains.
    CuratedSearch,
    /// General image search; allowlist pass first, then the size-floor pass.
    GeneralSearch,
    /// Thumbnail derived from an already-linked venue video.
    VideoThumbnail,
    /// Static regional placeholder. Never counts toward sufficiency.
    StockFallback,
}

impl ImageStep {
    /// Trust tier written on candidates this step accepts. The general
    /// search writes two tiers, one per pass; this is its lower one.
    pub fn tier(&self) -> SourceTier {
        match self {
            ImageStep::OfficialPage => SourceTier::Official,
            ImageStep::CuratedSearch => SourceTier::Curated,
            ImageStep::GeneralSearch => SourceTier::General,
            ImageStep::VideoThumbnail => SourceTier::VideoDerived,
            ImageStep::StockFallback => SourceTier::Stock,
        }
    }
}

/// Every static table the waterfall and auditor consult, consolidated into
/// one injectable value instead of per-call-site constants.
///
/// Bump `version` whenever a table or threshold changes; the run log records
/// it so two runs' decisions can be compared.
#[derive(Debug, Clone)]
pub struct EnrichmentPolicy {
    pub version: u32,
    pub image_target: usize,
    pub image_fetch_limit: usize,
    pub video_target: usize,
    pub video_fetch_limit: usize,
    /// Both edges of a general-pass candidate must reach this many pixels.
    pub min_image_edge: u32,
    image_chain: Vec<ImageStep>,
    blocklist: Vec<&'static str>,
    allowlist: Vec<&'static str>,
    curated_domains: Vec<&'static str>,
    stock_by_region: Vec<(&'static str, &'static str)>,
    default_stock: &'static str,
}

impl EnrichmentPolicy {
    pub fn standard() -> Self {
        Self {
            version: 1,
            image_target: 3,
            image_fetch_limit: 10,
            video_target: 1,
            video_fetch_limit: 5,
            min_image_edge: 500,
            image_chain: vec![
                ImageStep::OfficialPage,
                ImageStep::CuratedSearch,
                ImageStep::GeneralSearch,
                ImageStep::VideoThumbnail,
                ImageStep::StockFallback,
            ],
            // Social platforms, review aggregators, and the video CDN the
            // VideoDerived step already covers.
            blocklist: vec![
                "facebook.com",
                "instagram.com",
                "pinterest.com",
                "twitter.com",
                "x.com",
                "tiktok.com",
                "yelp.com",
                "tripadvisor.com",
                "theknot.com",
                "weddingwire.com",
                "zola.com",
                "ytimg.com",
            ],
            allowlist: vec![
                "stylemepretty.com",
                "junebugweddings.com",
                "greenweddingshoes.com",
                "ruffledblog.com",
                "weddingchicks.com",
            ],
            curated_domains: vec!["stylemepretty.com", "junebugweddings.com"],
            stock_by_region: vec![
                ("napa", "https://images.unsplash.com/photo-1506377247377-2a5b3b417ebb"),
                ("sonoma", "https://images.unsplash.com/photo-1506377247377-2a5b3b417ebb"),
                ("coast", "https://images.unsplash.com/photo-1507525428034-b723cf961d3e"),
                ("beach", "https://images.unsplash.com/photo-1507525428034-b723cf961d3e"),
                ("mountain", "https://images.unsplash.com/photo-1464822759023-fed622ff2c3b"),
                ("tahoe", "https://images.unsplash.com/photo-1464822759023-fed622ff2c3b"),
            ],
            default_stock: "https://images.unsplash.com/photo-1519167758481-83f550bb49b3",
        }
    }

    /// Lowered targets keep test fixtures small.
    pub fn with_image_target(mut self, target: usize) -> Self {
        self.image_target = target;
        self
    }

    pub fn with_video_target(mut self, target: usize) -> Self {
        self.video_target = target;
        self
    }

    pub fn image_chain(&self) -> &[ImageStep] {
        &self.image_chain
    }

    fn host_of(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()))
    }

    fn host_in(url: &str, domains: &[&str]) -> bool {
        match Self::host_of(url) {
            Some(host) => domains
                .iter()
                .any(|d| host == *d || host.ends_with(&format!(".{}", d))),
            None => false,
        }
    }

    /// True when the URL (or the page it was found on) belongs to a domain
    /// the engine refuses to take candidates from.
    pub fn is_blocklisted(&self, url: &str) -> bool {
        Self::host_in(url, &self.blocklist)
    }

    pub fn is_allowlisted(&self, url: &str) -> bool {
        Self::host_in(url, &self.allowlist)
    }

    /// Search query for the curated-domain image step.
    pub fn curated_query(&self, name: &str, location: &str) -> String {
        let sites = self
            .curated_domains
            .iter()
            .map(|d| format!("site:{}", d))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{} {} wedding ({})", name, location, sites)
    }

    pub fn general_image_query(&self, name: &str, location: &str) -> String {
        format!("\"{}\" {} wedding venue", name, location)
    }

    pub fn video_query(&self, name: &str, location: &str) -> String {
        format!("{} {} wedding", name, location)
    }

    pub fn place_query(&self, name: &str, location: &str) -> String {
        if location.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", name, location)
        }
    }

    /// Regional placeholder for records with no imagery at all.
    pub fn stock_image_for(&self, region: &str) -> &'static str {
        let region = region.to_lowercase();
        self.stock_by_region
            .iter()
            .find(|(keyword, _)| region.contains(keyword))
            .map(|(_, url)| *url)
            .unwrap_or(self.default_stock)
    }
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
