use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod chat;
pub mod derived;
pub mod records;

pub use chat::{ChatMessage, ChatPrompt, ChatRole};
pub use derived::{DerivedNode, DerivedStat, NodeLevel};
pub use records::{IncidentRecord, RelationRecord};

pub const VIEW_SCHEMA_VERSION: u32 = 1;

/// Shown by every panel when the filtered subset is empty.
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

/// Categorical column of the incident table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "Site")]
    Site,
    #[serde(rename = "Time frame")]
    TimeFrame,
    #[serde(rename = "Group")]
    Group,
    #[serde(rename = "Category")]
    Category,
    #[serde(rename = "Sub Cat")]
    SubCategory,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Site,
        Dimension::TimeFrame,
        Dimension::Group,
        Dimension::Category,
        Dimension::SubCategory,
    ];

    /// Column header as it appears in uploaded tables
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Site => "Site",
            Self::TimeFrame => "Time frame",
            Self::Group => "Group",
            Self::Category => "Category",
            Self::SubCategory => "Sub Cat",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Dimension {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "site" => Ok(Self::Site),
            "timeframe" => Ok(Self::TimeFrame),
            "group" => Ok(Self::Group),
            "category" => Ok(Self::Category),
            "subcat" | "subcategory" => Ok(Self::SubCategory),
            _ => anyhow::bail!("unknown dimension '{raw}'"),
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dimension_parses_column_names_and_aliases() {
        assert_eq!("Time frame".parse::<Dimension>().unwrap(), Dimension::TimeFrame);
        assert_eq!("time-frame".parse::<Dimension>().unwrap(), Dimension::TimeFrame);
        assert_eq!("Sub Cat".parse::<Dimension>().unwrap(), Dimension::SubCategory);
        assert_eq!("subcategory".parse::<Dimension>().unwrap(), Dimension::SubCategory);
        assert!("severity".parse::<Dimension>().is_err());
    }

    #[test]
    fn dimension_serializes_as_column_name() {
        let raw = serialize_json(&Dimension::TimeFrame).unwrap();
        assert_eq!(raw, "\"Time frame\"");
        for dim in Dimension::ALL {
            assert_eq!(dim.column_name().parse::<Dimension>().unwrap(), dim);
        }
    }
}
