use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::TraceEvent;

// Field used to partition events into groups
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Block,
    Pipeline,
    Size,
}

impl FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block" | "block_id" => Ok(GroupKey::Block),
            "pipeline" | "pipeline_id" | "scheme" => Ok(GroupKey::Pipeline),
            "size" | "size_bytes" => Ok(GroupKey::Size),
            _ => Err(format!("Unknown group key: {s}")),
        }
    }
}

impl GroupKey {
    pub fn select(&self, event: &TraceEvent) -> i64 {
        match self {
            GroupKey::Block => event.block_id,
            GroupKey::Pipeline => event.pipeline_id,
            GroupKey::Size => event.size_bytes,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GroupKey::Block => "block_id",
            GroupKey::Pipeline => "pipeline_id",
            GroupKey::Size => "size_bytes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_key() {
        assert_eq!("block".parse::<GroupKey>(), Ok(GroupKey::Block));
        assert_eq!("Pipeline_ID".parse::<GroupKey>(), Ok(GroupKey::Pipeline));
        assert_eq!("size".parse::<GroupKey>(), Ok(GroupKey::Size));
        assert!("tenant".parse::<GroupKey>().is_err());
    }
}
