use std::collections::BTreeMap;

use crate::models::{GroupKey, TraceEvent};

/// Events per key, in input order. Keys iterate in ascending order.
pub type EventGroups = BTreeMap<i64, Vec<TraceEvent>>;

/// Pure partition of `events` by `key`; order inside a group is input order.
pub fn group_events(events: Vec<TraceEvent>, key: GroupKey) -> EventGroups {
    let mut groups: EventGroups = BTreeMap::new();
    for event in events {
        groups.entry(key.select(&event)).or_default().push(event);
    }
    groups
}

/// Keeps the `k` groups holding the most events; ties go to the smaller key.
pub fn select_top_groups(groups: EventGroups, k: usize) -> EventGroups {
    let mut by_count: Vec<(i64, Vec<TraceEvent>)> = groups.into_iter().collect();
    // stable sort keeps ascending key order within equal counts
    by_count.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    by_count.truncate(k);
    by_count.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(block_id: i64, pipeline_id: i64, size_bytes: i64, timestamp: f64) -> TraceEvent {
        TraceEvent {
            block_id,
            offset: 0,
            size_bytes,
            timestamp,
            op: 0,
            pipeline_id,
            namespace_id: 0,
            user_id: 0,
            shard_id: None,
            op_count: None,
            hit: None,
        }
    }

    #[test]
    fn test_group_by_block_keeps_input_order() {
        let events = vec![
            event(2, 0, 4096, 3.0),
            event(1, 0, 4096, 2.0),
            event(2, 1, 4096, 1.0),
            event(3, 1, 4096, 0.5),
        ];
        let groups = group_events(events, GroupKey::Block);

        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        let times: Vec<f64> = groups[&2].iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![3.0, 1.0]);
        // single-event groups are kept here
        assert_eq!(groups[&3].len(), 1);
    }

    #[test]
    fn test_group_by_pipeline_and_size() {
        let events = vec![
            event(1, 5, 4096, 1.0),
            event(2, 5, 8192, 2.0),
            event(3, 6, 4096, 3.0),
        ];
        let by_pipeline = group_events(events.clone(), GroupKey::Pipeline);
        assert_eq!(by_pipeline[&5].len(), 2);
        assert_eq!(by_pipeline[&6].len(), 1);

        let by_size = group_events(events, GroupKey::Size);
        assert_eq!(by_size[&4096].len(), 2);
        assert_eq!(by_size[&8192].len(), 1);
    }

    #[test]
    fn test_select_top_groups() {
        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(event(1, 0, 100, 1.0));
        }
        for _ in 0..5 {
            events.push(event(2, 0, 200, 1.0));
        }
        for _ in 0..3 {
            events.push(event(3, 0, 50, 1.0));
        }
        events.push(event(4, 0, 300, 1.0));

        let top = select_top_groups(group_events(events, GroupKey::Size), 2);
        assert_eq!(top.keys().copied().collect::<Vec<_>>(), vec![50, 200]);
    }
}
