//! Bloom / collapse state machine.
//!
//! The controller owns the reveal phase counter. Every change is pushed to
//! subscribers (the force field) as a [`PhaseSnapshot`], and the renderer asks
//! the current snapshot which nodes are visible.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info};

use crate::graph::Placement;

/// First reveal value used by clusters.
pub const CLUSTER_PHASE_BASE: u32 = 1000;
/// Reveal value pinned once a bloom has completed.
pub const REVEAL_ALL: u32 = u32::MAX;

const BLOOM_START_DELAY_SECS: f64 = 0.100;
const BLOOM_ISOLATED_STAGGER_SECS: f64 = 0.080;
const BLOOM_CLUSTER_GAP_SECS: f64 = 0.150;
const BLOOM_CLUSTER_STAGGER_SECS: f64 = 0.120;
const COLLAPSE_CLUSTER_STAGGER_SECS: f64 = 0.150;
const COLLAPSE_ISOLATED_STAGGER_SECS: f64 = 0.080;
const COLLAPSE_SETTLE_SECS: f64 = 0.100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseState {
    Collapsed,
    Blooming,
    Expanded,
    Collapsing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseSnapshot {
    pub state: PhaseState,
    pub expanded: bool,
    pub reveal_phase: u32,
    pub cluster_base: u32,
}

impl PhaseSnapshot {
    pub fn collapsed(cluster_base: u32) -> Self {
        Self {
            state: PhaseState::Collapsed,
            expanded: false,
            reveal_phase: 0,
            cluster_base,
        }
    }

    /// Phase value from which a node of this placement is drawn.
    pub fn threshold(&self, placement: Placement) -> u64 {
        match placement {
            Placement::Hub => 0,
            Placement::Isolated { isolated_index } => 1 + isolated_index as u64,
            Placement::PolygonVertex {
                vertex_index: cluster,
            }
            | Placement::ClusterMember {
                cluster_id: cluster,
            } => self.cluster_base as u64 + cluster as u64,
        }
    }

    pub fn is_revealed(&self, placement: Placement) -> bool {
        self.reveal_phase as u64 >= self.threshold(placement)
    }

    pub fn is_visible(&self, placement: Placement) -> bool {
        match placement {
            Placement::Hub => true,
            _ => self.expanded && self.is_revealed(placement),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Reveal(u32),
    Settle(PhaseState),
}

#[derive(Clone, Copy, Debug)]
struct ScheduledStep {
    at_secs: f64,
    step: Step,
}

pub struct PhaseController {
    isolated_count: usize,
    cluster_count: usize,
    current: PhaseSnapshot,
    schedule: VecDeque<ScheduledStep>,
    subscribers: Vec<Sender<PhaseSnapshot>>,
    toggled_once: bool,
}

impl PhaseController {
    pub fn new(isolated_count: usize, cluster_count: usize) -> Self {
        // Isolated thresholds run 1..=n; keep the cluster range above them.
        let cluster_base = CLUSTER_PHASE_BASE.max(u32::try_from(isolated_count + 1).unwrap_or(u32::MAX));
        Self {
            isolated_count,
            cluster_count,
            current: PhaseSnapshot::collapsed(cluster_base),
            schedule: VecDeque::new(),
            subscribers: Vec::new(),
            toggled_once: false,
        }
    }

    pub fn new_expanded(isolated_count: usize, cluster_count: usize) -> Self {
        let mut controller = Self::new(isolated_count, cluster_count);
        controller.current.state = PhaseState::Expanded;
        controller.current.expanded = true;
        controller.current.reveal_phase = REVEAL_ALL;
        controller.toggled_once = true;
        controller
    }

    pub fn subscribe(&mut self) -> Receiver<PhaseSnapshot> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.current);
        self.subscribers.push(tx);
        rx
    }

    pub fn snapshot(&self) -> PhaseSnapshot {
        self.current
    }

    pub fn state(&self) -> PhaseState {
        self.current.state
    }

    pub fn is_animating(&self) -> bool {
        !self.schedule.is_empty()
    }

    pub fn toggled_once(&self) -> bool {
        self.toggled_once
    }

    /// Hub activation: bloom when collapsed or collapsing, collapse otherwise.
    pub fn toggle(&mut self, now_secs: f64) -> PhaseState {
        self.toggled_once = true;
        match self.current.state {
            PhaseState::Collapsed | PhaseState::Collapsing => self.bloom(now_secs),
            PhaseState::Blooming | PhaseState::Expanded => self.collapse(now_secs),
        }
        self.current.state
    }

    /// Starts a bloom, replacing any pending transition.
    pub fn bloom(&mut self, now_secs: f64) {
        self.schedule.clear();
        self.current.state = PhaseState::Blooming;
        self.current.expanded = true;
        self.current.reveal_phase = 0;
        self.publish();

        for index in 0..self.isolated_count {
            self.schedule.push_back(ScheduledStep {
                at_secs: now_secs + BLOOM_START_DELAY_SECS + index as f64 * BLOOM_ISOLATED_STAGGER_SECS,
                step: Step::Reveal(phase_value(1 + index as u64)),
            });
        }

        let clusters_start = now_secs
            + BLOOM_START_DELAY_SECS
            + self.isolated_count as f64 * BLOOM_ISOLATED_STAGGER_SECS
            + BLOOM_CLUSTER_GAP_SECS;
        for index in 0..self.cluster_count {
            self.schedule.push_back(ScheduledStep {
                at_secs: clusters_start + index as f64 * BLOOM_CLUSTER_STAGGER_SECS,
                step: Step::Reveal(phase_value(
                    self.current.cluster_base as u64 + index as u64,
                )),
            });
        }

        self.schedule.push_back(ScheduledStep {
            at_secs: clusters_start + self.cluster_count as f64 * BLOOM_CLUSTER_STAGGER_SECS,
            step: Step::Settle(PhaseState::Expanded),
        });

        info!(
            isolated = self.isolated_count,
            clusters = self.cluster_count,
            "bloom started"
        );
    }

    /// Starts a collapse from wherever the counter currently is.
    pub fn collapse(&mut self, now_secs: f64) {
        if self.current.state == PhaseState::Collapsed {
            return;
        }

        self.schedule.clear();
        self.current.state = PhaseState::Collapsing;
        self.publish();

        let mut last = self.current.reveal_phase as u64;
        let mut at_secs = now_secs;
        let mut push = |value: u64, stagger: f64, schedule: &mut VecDeque<ScheduledStep>| {
            if value < last {
                schedule.push_back(ScheduledStep {
                    at_secs,
                    step: Step::Reveal(phase_value(value)),
                });
                at_secs += stagger;
                last = value;
            }
        };

        for cluster in (0..self.cluster_count).rev() {
            let hidden = if cluster > 0 {
                self.current.cluster_base as u64 + cluster as u64 - 1
            } else {
                self.isolated_count as u64
            };
            push(hidden, COLLAPSE_CLUSTER_STAGGER_SECS, &mut self.schedule);
        }
        for isolated in (0..self.isolated_count).rev() {
            push(isolated as u64, COLLAPSE_ISOLATED_STAGGER_SECS, &mut self.schedule);
        }

        let settle_at = self
            .schedule
            .back()
            .map(|step| step.at_secs + COLLAPSE_SETTLE_SECS)
            .unwrap_or(now_secs);
        self.schedule.push_back(ScheduledStep {
            at_secs: settle_at,
            step: Step::Settle(PhaseState::Collapsed),
        });

        info!(steps = self.schedule.len(), "collapse started");
    }

    /// Applies every step due at `now_secs`. Returns whether anything changed.
    pub fn advance(&mut self, now_secs: f64) -> bool {
        let mut changed = false;
        while let Some(next) = self.schedule.front().copied() {
            if next.at_secs > now_secs {
                break;
            }
            self.schedule.pop_front();
            match next.step {
                Step::Reveal(value) => {
                    self.current.reveal_phase = value;
                }
                Step::Settle(PhaseState::Collapsed) => {
                    self.current.state = PhaseState::Collapsed;
                    self.current.expanded = false;
                    self.current.reveal_phase = 0;
                }
                Step::Settle(state) => {
                    self.current.state = state;
                    self.current.reveal_phase = REVEAL_ALL;
                }
            }
            debug!(phase = self.current.reveal_phase, state = ?self.current.state, "reveal step");
            self.publish();
            changed = true;
        }
        changed
    }

    fn publish(&mut self) {
        let snapshot = self.current;
        self.subscribers.retain(|tx| tx.send(snapshot).is_ok());
    }
}

fn phase_value(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(REVEAL_ALL)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn drain(rx: &Receiver<PhaseSnapshot>) -> Vec<PhaseSnapshot> {
        rx.try_iter().collect()
    }

    fn run_to_end(controller: &mut PhaseController, from: f64) -> f64 {
        let mut now = from;
        while controller.is_animating() {
            now += 0.01;
            controller.advance(now);
        }
        now
    }

    #[test]
    fn starts_collapsed_with_only_the_hub_visible() {
        let controller = PhaseController::new(1, 2);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, PhaseState::Collapsed);
        assert!(snapshot.is_visible(Placement::Hub));
        assert!(!snapshot.is_visible(Placement::Isolated { isolated_index: 0 }));
        assert!(!snapshot.is_visible(Placement::ClusterMember { cluster_id: 0 }));
    }

    #[test]
    fn bloom_reveals_isolated_then_clusters() {
        let mut controller = PhaseController::new(1, 2);
        let rx = controller.subscribe();
        drain(&rx);

        controller.toggle(0.0);
        let end = run_to_end(&mut controller, 0.0);
        assert!(end < 1.0);

        let phases = drain(&rx)
            .into_iter()
            .map(|snapshot| snapshot.reveal_phase)
            .collect::<Vec<_>>();
        assert_eq!(phases, vec![0, 1, 1000, 1001, REVEAL_ALL]);
        assert_eq!(controller.state(), PhaseState::Expanded);
    }

    #[test]
    fn isolated_node_is_visible_before_any_cluster() {
        let mut controller = PhaseController::new(1, 2);
        controller.toggle(0.0);

        controller.advance(0.10);
        let snapshot = controller.snapshot();
        assert!(snapshot.is_visible(Placement::Isolated { isolated_index: 0 }));
        assert!(!snapshot.is_visible(Placement::PolygonVertex { vertex_index: 0 }));

        controller.advance(0.34);
        let snapshot = controller.snapshot();
        assert!(snapshot.is_visible(Placement::ClusterMember { cluster_id: 0 }));
        assert!(!snapshot.is_visible(Placement::ClusterMember { cluster_id: 1 }));

        controller.advance(0.46);
        assert!(controller.snapshot().is_visible(Placement::ClusterMember { cluster_id: 1 }));
    }

    #[test]
    fn bloom_sequence_is_monotonic() {
        let mut controller = PhaseController::new(5, 4);
        let rx = controller.subscribe();
        controller.toggle(2.0);
        run_to_end(&mut controller, 2.0);

        let phases = drain(&rx)
            .into_iter()
            .skip(1)
            .map(|snapshot| snapshot.reveal_phase)
            .collect::<Vec<_>>();
        assert!(phases.windows(2).all(|pair| pair[0] <= pair[1]));
        let first_cluster = phases.iter().position(|&p| p >= CLUSTER_PHASE_BASE).expect("clusters revealed");
        assert!(phases[..first_cluster].contains(&5));
    }

    #[test]
    fn collapse_hides_clusters_then_isolated_in_reverse() {
        let mut controller = PhaseController::new_expanded(2, 3);
        let rx = controller.subscribe();
        drain(&rx);

        assert_eq!(controller.toggle(0.0), PhaseState::Collapsing);
        run_to_end(&mut controller, 0.0);

        let phases = drain(&rx)
            .into_iter()
            .map(|snapshot| snapshot.reveal_phase)
            .collect::<Vec<_>>();
        assert_eq!(phases, vec![REVEAL_ALL, 1001, 1000, 2, 1, 0, 0]);
        assert_eq!(controller.state(), PhaseState::Collapsed);
        assert!(!controller.snapshot().expanded);
    }

    #[test]
    fn collapse_keeps_expanded_flag_until_settled() {
        let mut controller = PhaseController::new_expanded(1, 1);
        controller.collapse(0.0);
        controller.advance(0.0);
        let snapshot = controller.snapshot();
        assert!(snapshot.expanded);
        assert!(snapshot.is_visible(Placement::Isolated { isolated_index: 0 }));
        assert!(!snapshot.is_visible(Placement::ClusterMember { cluster_id: 0 }));
    }

    #[test]
    fn retoggle_supersedes_pending_bloom() {
        let mut controller = PhaseController::new(3, 2);
        let rx = controller.subscribe();
        controller.toggle(0.0);
        controller.advance(0.2);
        drain(&rx);

        assert_eq!(controller.toggle(0.2), PhaseState::Collapsing);
        run_to_end(&mut controller, 0.2);

        let phases = drain(&rx)
            .into_iter()
            .map(|snapshot| snapshot.reveal_phase)
            .collect::<Vec<_>>();
        assert!(phases.windows(2).all(|pair| pair[0] >= pair[1]), "{phases:?}");
        assert!(phases.iter().all(|&phase| phase < CLUSTER_PHASE_BASE));
        assert_eq!(controller.state(), PhaseState::Collapsed);
    }

    #[test]
    fn bloom_during_collapse_restarts_from_zero() {
        let mut controller = PhaseController::new_expanded(2, 1);
        controller.toggle(0.0);
        controller.advance(0.05);
        assert_eq!(controller.toggle(0.05), PhaseState::Blooming);
        assert_eq!(controller.snapshot().reveal_phase, 0);
        run_to_end(&mut controller, 0.05);
        assert_eq!(controller.state(), PhaseState::Expanded);
    }

    #[test]
    fn empty_graph_settles_immediately() {
        let mut controller = PhaseController::new(0, 0);
        controller.toggle(0.0);
        assert!(controller.advance(1.0));
        assert_eq!(controller.state(), PhaseState::Expanded);
        controller.toggle(1.0);
        controller.advance(1.0);
        assert_eq!(controller.state(), PhaseState::Collapsed);
    }

    #[test]
    fn cluster_base_stays_above_isolated_thresholds() {
        let controller = PhaseController::new(1500, 2);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.cluster_base, 1501);
        assert!(
            snapshot.threshold(Placement::ClusterMember { cluster_id: 0 })
                > snapshot.threshold(Placement::Isolated { isolated_index: 1499 })
        );
    }
}
