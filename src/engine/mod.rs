mod field;
mod phase;
mod physics;
mod quadtree;
mod settings;
mod simulation;

use tracing::info;

use crate::graph::KnowledgeGraph;

pub use field::ForceField;
pub use phase::{PhaseController, PhaseSnapshot, PhaseState};
pub use physics::{Center, Collide, Links, ManyBody};
pub use settings::{ForceKey, ForceSettings};
pub use simulation::{ForceIntegrator, Simulation};

pub const CHARGE_FORCE: &str = "charge";
pub const LINK_FORCE: &str = "link";
pub const CENTER_FORCE: &str = "center";
pub const COLLIDE_FORCE: &str = "collide";
pub const CLUSTER_FORCE: &str = "cluster";

/// Integrator seeded at the layout targets with the hub locked in place.
pub fn build_simulation(graph: &KnowledgeGraph) -> Simulation {
    let mut simulation = Simulation::new(graph.nodes.iter().map(|node| node.target));
    simulation.lock(graph.hub_index, graph.hub().target);
    simulation
}

/// Registers every named force for the current settings.
pub fn install_forces(
    integrator: &mut dyn ForceIntegrator,
    graph: &KnowledgeGraph,
    settings: &ForceSettings,
    controller: &mut PhaseController,
) {
    for key in ForceKey::ALL {
        install_force(integrator, graph, settings, key, controller);
    }
    integrator.reheat();
}

/// Rebuilds the one force driven by `key` and re-heats.
pub fn apply_setting(
    integrator: &mut dyn ForceIntegrator,
    graph: &KnowledgeGraph,
    settings: &ForceSettings,
    key: ForceKey,
    controller: &mut PhaseController,
) {
    install_force(integrator, graph, settings, key, controller);
    integrator.reheat();
    info!(setting = key.label(), value = settings.get(key), "force setting changed");
}

fn install_force(
    integrator: &mut dyn ForceIntegrator,
    graph: &KnowledgeGraph,
    settings: &ForceSettings,
    key: ForceKey,
    controller: &mut PhaseController,
) {
    match key {
        ForceKey::ChargeStrength => {
            integrator.register_force(CHARGE_FORCE, Box::new(ManyBody::new(settings.charge_strength)));
        }
        ForceKey::LinkDistance => {
            let pairs = graph.edges.iter().map(|edge| (edge.source, edge.target));
            integrator.register_force(
                LINK_FORCE,
                Box::new(Links::new(graph.nodes.len(), pairs, settings.link_distance)),
            );
        }
        ForceKey::CenterForce if settings.center_force <= 0.0 => {
            integrator.remove_force(CENTER_FORCE);
        }
        ForceKey::CenterForce => {
            integrator.register_force(
                CENTER_FORCE,
                Box::new(Center::new(graph.hub().target, settings.center_force)),
            );
        }
        ForceKey::CollisionRadius => {
            integrator.register_force(COLLIDE_FORCE, Box::new(Collide::new(settings.collision_radius)));
        }
        ForceKey::PolygonRadius => {
            let field = ForceField::new(graph, settings.polygon_radius, controller.subscribe());
            integrator.register_force(CLUSTER_FORCE, Box::new(field));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{LayoutConfig, Placement, RawEdge, RawGraph, RawNode, build_knowledge_graph};

    fn scenario() -> KnowledgeGraph {
        let raw = RawGraph {
            nodes: ["A", "B", "C", "D", "E"]
                .iter()
                .map(|id| RawNode::new(*id, *id))
                .collect(),
            edges: vec![RawEdge::new("A", "B"), RawEdge::new("C", "D")],
        };
        build_knowledge_graph(&raw, &LayoutConfig::default())
    }

    #[test]
    fn installs_all_named_forces() {
        let graph = scenario();
        let mut controller = PhaseController::new(graph.isolated_count, graph.cluster_count);
        let mut simulation = build_simulation(&graph);
        install_forces(&mut simulation, &graph, &ForceSettings::default(), &mut controller);

        assert_eq!(
            simulation.force_names().collect::<Vec<_>>(),
            vec![CHARGE_FORCE, LINK_FORCE, CENTER_FORCE, COLLIDE_FORCE, CLUSTER_FORCE]
        );
    }

    #[test]
    fn changing_a_setting_reheats() {
        let graph = scenario();
        let mut controller = PhaseController::new(graph.isolated_count, graph.cluster_count);
        let mut simulation = build_simulation(&graph);
        install_forces(&mut simulation, &graph, &ForceSettings::default(), &mut controller);
        while simulation.tick() {}
        assert!(!simulation.is_active());

        let settings = ForceSettings {
            link_distance: 80.0,
            ..ForceSettings::default()
        };
        apply_setting(&mut simulation, &graph, &settings, ForceKey::LinkDistance, &mut controller);
        assert!(simulation.is_active());
        assert_eq!(simulation.force_names().count(), 5);
    }

    #[test]
    fn zero_center_force_drops_the_force() {
        let graph = scenario();
        let mut controller = PhaseController::new(graph.isolated_count, graph.cluster_count);
        let mut simulation = build_simulation(&graph);
        install_forces(&mut simulation, &graph, &ForceSettings::default(), &mut controller);

        let settings = ForceSettings {
            center_force: 0.0,
            ..ForceSettings::default()
        };
        apply_setting(&mut simulation, &graph, &settings, ForceKey::CenterForce, &mut controller);
        assert!(!simulation.force_names().any(|name| name == CENTER_FORCE));
    }

    #[test]
    fn collapsed_graph_gathers_at_the_hub() {
        let graph = scenario();
        let mut controller = PhaseController::new(graph.isolated_count, graph.cluster_count);
        let mut simulation = build_simulation(&graph);
        install_forces(&mut simulation, &graph, &ForceSettings::default(), &mut controller);
        while simulation.tick() {}

        let hub = graph.hub().target;
        assert_eq!(simulation.position(graph.hub_index), Some(hub));
        for position in simulation.positions() {
            assert!(position.x.is_finite() && position.y.is_finite());
            assert!((position - hub).length() < 150.0, "{position:?}");
        }
    }

    #[test]
    fn expanded_graph_spreads_clusters_to_their_vertices() {
        let graph = scenario();
        let mut controller = PhaseController::new_expanded(graph.isolated_count, graph.cluster_count);
        let mut simulation = build_simulation(&graph);
        install_forces(&mut simulation, &graph, &ForceSettings::default(), &mut controller);
        simulation.warm_up(400);

        let hub = graph.hub().target;
        let positions = simulation.positions();
        for (node, position) in graph.nodes.iter().zip(&positions) {
            if let Placement::PolygonVertex { .. } = node.placement {
                assert!((*position - hub).length() > 100.0, "{} at {position:?}", node.id);
            }
        }
    }
}
