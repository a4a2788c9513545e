use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a wire enum: SCREAMING_SNAKE_CASE on the wire, an `Unknown`
/// catch-all when decoding, and `Display`/`FromStr` over the known names.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
            #[serde(other, rename = "UNKNOWN")]
            Unknown,
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unknown => "UNKNOWN",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('-', "_").to_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let names: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        anyhow::anyhow!(
                            "Unknown {}: {}. Expected one of: {}.",
                            stringify!($name),
                            s,
                            names.join(", ")
                        )
                    })
            }
        }
    };
}

wire_enum! {
    /// Contract type of an offer.
    JobKind {
        Freelance => "FREELANCE",
        FullTime => "FULL_TIME",
        PartTime => "PART_TIME",
        Internship => "INTERNSHIP",
        Mission => "MISSION",
    }
}

wire_enum! {
    /// Lifecycle state of an offer.
    JobStatus {
        Open => "OPEN",
        InProgress => "IN_PROGRESS",
        Closed => "CLOSED",
    }
}

wire_enum! {
    /// Trade an offer is looking for.
    JobCategory {
        Developer => "DEVELOPER",
        Designer => "DESIGNER",
        Marketing => "MARKETING",
        Writer => "WRITER",
        Translator => "TRANSLATOR",
        Video => "VIDEO",
        Other => "OTHER",
    }
}

/// Poster of an offer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Remuneration attached to an offer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub negotiable: bool,
}

/// Moderation or system notice attached to an offer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A tag as listed by `/tags/offers`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Tag reference inside an offer: either a bare id or an embedded tag.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TagRef {
    Id(String),
    Tag(Tag),
}

impl TagRef {
    pub fn id(&self) -> &str {
        match self {
            TagRef::Id(id) => id,
            TagRef::Tag(tag) => &tag.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TagRef::Id(_) => None,
            TagRef::Tag(tag) => Some(&tag.name),
        }
    }
}

/// A job offer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub kind: Option<JobKind>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub category: Option<JobCategory>,
    #[serde(default)]
    pub volunteer: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Job {
    /// Public page of this offer.
    pub fn url(&self) -> String {
        super::build_job_url(self)
    }
}

/// Position of a page within a listing.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_items: u64,
    pub total_pages: u64,
    /// 0-based index of this page.
    pub page: u64,
}

impl Pagination {
    /// True when no page follows this one.
    pub fn is_last_page(&self) -> bool {
        self.total_pages == 0 || self.page.saturating_add(1) >= self.total_pages
    }
}

/// One page of offers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}
