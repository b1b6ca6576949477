//! Egress queue settings.

use serde::{Deserialize, Serialize};

/// Traffic class a queue carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    #[default]
    Unicast,
    Multicast,
    All,
}

/// Scheduling discipline of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueScheduling {
    StrictPriority,
    #[default]
    WeightedRoundRobin,
    DeficitRoundRobin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_settings_from_json() {
        let scheduling: QueueScheduling = serde_json::from_str("\"strict_priority\"").unwrap();
        assert_eq!(scheduling, QueueScheduling::StrictPriority);
        assert_eq!(StreamType::default(), StreamType::Unicast);
    }
}
