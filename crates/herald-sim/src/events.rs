//! Simulation events for the run timeline.

use herald_topology::{DeviceId, Point};
use serde::{Deserialize, Serialize};

/// Events that occur during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A device joined and published its initial state
    DeviceSpawned {
        device: DeviceId,
        position: Point,
        time: f64,
    },

    /// A device stopped running rounds and left every snapshot
    DeviceRemoved { device: DeviceId, time: f64 },

    /// The scripted failure fired on the natural leader
    PerturbationTriggered { victim: DeviceId, time: f64 },

    /// A measured output changed
    LeaderChanged {
        device: DeviceId,
        variant: String,
        from: DeviceId,
        to: DeviceId,
        time: f64,
    },
}

impl SimEvent {
    /// Get the simulated time of this event.
    pub fn time(&self) -> f64 {
        match self {
            SimEvent::DeviceSpawned { time, .. } => *time,
            SimEvent::DeviceRemoved { time, .. } => *time,
            SimEvent::PerturbationTriggered { time, .. } => *time,
            SimEvent::LeaderChanged { time, .. } => *time,
        }
    }

    /// Device the event is about.
    pub fn device(&self) -> DeviceId {
        match self {
            SimEvent::DeviceSpawned { device, .. }
            | SimEvent::DeviceRemoved { device, .. }
            | SimEvent::LeaderChanged { device, .. } => *device,
            SimEvent::PerturbationTriggered { victim, .. } => *victim,
        }
    }
}

/// Leader changes of one variant, in time order.
pub fn leader_changes<'a>(events: &'a [SimEvent], variant: &'a str) -> impl Iterator<Item = &'a SimEvent> + 'a {
    events
        .iter()
        .filter(move |e| matches!(e, SimEvent::LeaderChanged { variant: v, .. } if v == variant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let event = SimEvent::LeaderChanged {
            device: DeviceId(3),
            variant: "colr_s1".into(),
            from: DeviceId(3),
            to: DeviceId(0),
            time: 4.0,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("LeaderChanged"));
        assert!(json.contains("colr_s1"));

        let parsed: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.time(), 4.0);
        assert_eq!(parsed.device(), DeviceId(3));
    }

    #[test]
    fn filters_changes_by_variant() {
        let events = vec![
            SimEvent::DeviceSpawned {
                device: DeviceId(0),
                position: Point::ORIGIN,
                time: 0.0,
            },
            SimEvent::LeaderChanged {
                device: DeviceId(1),
                variant: "a".into(),
                from: DeviceId(1),
                to: DeviceId(0),
                time: 1.0,
            },
            SimEvent::LeaderChanged {
                device: DeviceId(1),
                variant: "b".into(),
                from: DeviceId(1),
                to: DeviceId(0),
                time: 1.0,
            },
        ];
        assert_eq!(leader_changes(&events, "a").count(), 1);
    }
}
