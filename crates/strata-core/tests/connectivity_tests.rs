mod common;

use strata_core::audit::ConnectivityAnalyzer;
use strata_core::catalog::PredicateMetadata;
use strata_core::graph::RelationshipGraph;

use common::{catalog, edge, graph, sample_catalog, sample_spec};

#[test]
fn test_transitive_chain_follows_predicate() {
    let catalog = catalog(vec![PredicateMetadata::new("p1", "dependency").transitive()]);
    let graph = graph(
        &["x.a", "x.b", "x.c"],
        vec![edge("r1", "x.a", "x.b", "p1"), edge("r2", "x.b", "x.c", "p1")],
    );

    let report = ConnectivityAnalyzer::new(&catalog).analyze(&graph).unwrap();

    assert_eq!(report.transitive_chains.len(), 1);
    let chain = &report.transitive_chains[0];
    assert_eq!(chain.predicate, "p1");
    assert_eq!(chain.chain, vec!["x.a", "x.b", "x.c"]);
    assert_eq!(chain.length, 3);
    assert!(!chain.truncated);
}

#[test]
fn test_chains_ignore_non_transitive_predicates() {
    let catalog = catalog(vec![
        PredicateMetadata::new("p1", "dependency").transitive(),
        PredicateMetadata::new("p2", "dependency"),
    ]);
    let graph = graph(
        &["x.a", "x.b", "x.c"],
        vec![edge("r1", "x.a", "x.b", "p2"), edge("r2", "x.b", "x.c", "p2")],
    );

    let report = ConnectivityAnalyzer::new(&catalog).analyze(&graph).unwrap();
    assert!(report.transitive_chains.is_empty());
}

#[test]
fn test_longest_branch_is_kept() {
    let catalog = catalog(vec![PredicateMetadata::new("p", "flow").transitive()]);
    // a -> b (dead end), a -> c -> d -> e
    let graph = graph(
        &["x.a", "x.b", "x.c", "x.d", "x.e"],
        vec![
            edge("r1", "x.a", "x.b", "p"),
            edge("r2", "x.a", "x.c", "p"),
            edge("r3", "x.c", "x.d", "p"),
            edge("r4", "x.d", "x.e", "p"),
        ],
    );

    let chains = ConnectivityAnalyzer::new(&catalog)
        .transitive_chains(&graph)
        .unwrap();

    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].chain, vec!["x.a", "x.c", "x.d", "x.e"]);
}

#[test]
fn test_cycles_terminate() {
    let catalog = catalog(vec![PredicateMetadata::new("p", "flow").transitive()]);
    let graph = graph(
        &["x.a", "x.b", "x.c"],
        vec![
            edge("r1", "x.a", "x.b", "p"),
            edge("r2", "x.b", "x.c", "p"),
            edge("r3", "x.c", "x.a", "p"),
        ],
    );

    let chains = ConnectivityAnalyzer::new(&catalog)
        .transitive_chains(&graph)
        .unwrap();

    // No roots in a pure cycle; the first sorted node starts the only chain
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].chain, vec!["x.a", "x.b", "x.c"]);
}

#[test]
fn test_branch_budget_truncates_search() {
    let catalog = catalog(vec![PredicateMetadata::new("p", "flow").transitive()]);
    let mut edges = Vec::new();
    let mut nodes = Vec::new();
    // Fully connected six-node subgraph
    for i in 0..6 {
        nodes.push(format!("x.n{i}"));
        for j in 0..6 {
            if i != j {
                edges.push(edge(&format!("r{i}{j}"), &format!("x.n{i}"), &format!("x.n{j}"), "p"));
            }
        }
    }
    let graph = RelationshipGraph::build(nodes, edges, None);

    let bounded = ConnectivityAnalyzer::new(&catalog)
        .with_max_branches(3)
        .transitive_chains(&graph)
        .unwrap();
    assert!(bounded.iter().any(|c| c.truncated));
    assert!(bounded.iter().all(|c| c.length >= 2));

    let unbounded = ConnectivityAnalyzer::new(&catalog)
        .with_max_branches(0)
        .transitive_chains(&graph)
        .unwrap();
    assert_eq!(unbounded.len(), 1);
    assert_eq!(unbounded[0].length, 6);
    assert!(!unbounded[0].truncated);
}

#[test]
fn test_isolated_node_in_its_own_component() {
    let catalog = catalog(Vec::new());
    let graph = graph(
        &["x.a", "x.b", "x.c", "x.d"],
        vec![edge("r1", "x.a", "x.b", "p"), edge("r2", "x.b", "x.c", "p")],
    );

    let report = ConnectivityAnalyzer::new(&catalog).analyze(&graph).unwrap();

    assert_eq!(report.isolated_nodes, vec!["x.d"]);
    assert_eq!(report.components.len(), 2);
    assert_eq!(report.components[0].nodes, vec!["x.a", "x.b", "x.c"]);
    assert_eq!(report.components[1].nodes, vec!["x.d"]);
    assert_eq!(report.components[1].size, 1);
    assert_eq!(report.stats.largest_component_size, 3);
}

#[test]
fn test_sample_specification_connectivity() {
    let spec = sample_spec();
    let catalog = sample_catalog();
    let graph = RelationshipGraph::from_specification(&spec, None);

    let report = ConnectivityAnalyzer::new(&catalog).analyze(&graph).unwrap();

    assert_eq!(report.stats.node_count, 8);
    assert_eq!(report.stats.edge_count, 8);
    assert_eq!(report.stats.component_count, 3);
    assert_eq!(report.stats.isolated_count, 2);
    assert_eq!(report.stats.largest_component_size, 6);
    assert_eq!(report.stats.average_degree, 2.0);
    assert_eq!(
        report.isolated_nodes,
        vec!["application.dataobject", "data.schema"]
    );

    // Highest total degree first, ties broken by name
    assert_eq!(report.degrees[0].node_type, "application.component");
    assert_eq!(report.degrees[0].total_degree, 4);
    assert_eq!(report.degrees[1].node_type, "application.service");
    let service = report.degree("application.service").unwrap();
    assert_eq!((service.in_degree, service.out_degree), (3, 1));

    let triggers: Vec<_> = report
        .transitive_chains
        .iter()
        .filter(|c| c.predicate == "triggers")
        .collect();
    assert_eq!(triggers.len(), 1);
    assert_eq!(
        triggers[0].chain,
        vec!["business.process", "business.event", "business.actor"]
    );
    assert_eq!(report.stats.transitive_chain_count, 3);
}

#[test]
fn test_empty_graph_connectivity() {
    let catalog = catalog(Vec::new());
    let graph = graph(&[], Vec::new());

    let report = ConnectivityAnalyzer::new(&catalog).analyze(&graph).unwrap();

    assert!(report.components.is_empty());
    assert_eq!(report.stats.average_degree, 0.0);
    assert_eq!(report.stats.largest_component_size, 0);
}
