use serde::{Deserialize, Serialize};

/// One block-level access, created from a single trace line.
///
/// Field order follows the positional trace format:
/// `block_id offset size timestamp op pipeline namespace user [rs_shard_id [op_count]]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub block_id: i64,
    pub offset: i64,
    pub size_bytes: i64,
    pub timestamp: f64, // seconds
    pub op: i64,
    pub pipeline_id: i64, // eviction scheme / experiment arm
    pub namespace_id: i64,
    pub user_id: i64,
    pub shard_id: Option<i64>,
    pub op_count: Option<i64>,
    pub hit: Option<bool>,
}
