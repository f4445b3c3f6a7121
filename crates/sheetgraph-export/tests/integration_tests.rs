//! Integration tests for filtering and graph construction

use pretty_assertions::assert_eq;
use sheetgraph_core::FilterConfig;
use sheetgraph_export::{DependencyGraph, Export, Labeler, NeighborView, Record, RecordFilter, RecordId, Reference};

fn sheet(id: RecordId, name: &str, refs: &[RecordId]) -> Record {
    refs.iter().fold(Record::new(id, name, "MeasureSheet"), |record, target| {
        record.with_reference(Reference::new(*target, "MeasureSheet"))
    })
}

fn build(records: &[Record]) -> DependencyGraph {
    let config = FilterConfig::default();
    let eligible = RecordFilter::new(&config).apply(records);
    DependencyGraph::build(&eligible)
}

/// A small export mixing every kind of record the filter has to handle
fn mixed_records() -> Vec<Record> {
    vec![
        Record::folder(1, "Sheets"),
        sheet(2, "1.0 Revenue", &[3, 4]),
        sheet(3, "2.0 Cost", &[2, 9]),
        sheet(4, "3.0 Margin", &[2, 3]),
        // no references
        sheet(5, "4.0 Draft", &[]),
        // archived folder
        sheet(6, "5.0 Old", &[2]).with_parent(24532),
        // not a measure sheet
        Record::new(7, "Lookup", "Table").with_reference(Reference::new(2, "MeasureSheet")),
        // self-referencing sheet
        sheet(8, "6.0 Loop", &[8, 2]),
        // only references things outside the graph
        sheet(10, "7.0 Orphan", &[7, 6]),
    ]
}

#[test]
fn filter_keeps_exactly_the_valid_subset() {
    let records = mixed_records();
    let config = FilterConfig::default();
    let kept: Vec<RecordId> = RecordFilter::new(&config)
        .apply(&records)
        .iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(kept, vec![2, 3, 4, 8, 10]);
}

#[test]
fn edges_are_symmetric() {
    let graph = build(&mixed_records());

    for a in graph.nodes() {
        for b in graph.nodes() {
            let a_in_b_incoming = b.incoming().iter().filter(|id| **id == a.id).count();
            let b_in_a_outgoing = a.outgoing().iter().filter(|id| **id == b.id).count();
            assert_eq!(a_in_b_incoming, b_in_a_outgoing, "edge {} -> {}", a.id, b.id);
        }
    }
}

#[test]
fn no_dangling_edges() {
    let graph = build(&mixed_records());

    for node in graph.nodes() {
        for id in node.incoming().iter().chain(node.outgoing()) {
            assert!(graph.contains(*id), "node {} links to missing {}", node.id, id);
        }
    }
}

#[test]
fn every_node_has_an_edge() {
    let graph = build(&mixed_records());

    for node in graph.nodes() {
        assert!(node.incoming().len() + node.outgoing().len() > 0);
    }

    let ids: Vec<RecordId> = graph.nodes().map(|n| n.id).collect();
    assert_eq!(ids, vec![2, 3, 4, 8]);
    assert_eq!(graph.stats().pruned, 1);
}

#[test]
fn mixed_export_views() {
    let graph = build(&mixed_records());
    let labeler = Labeler::default();

    let revenue = NeighborView::for_node(&graph, graph.get(2).unwrap(), &labeler);
    assert_eq!(
        revenue.to_diagram(),
        [
            "'2.0' -> '1.0'",
            "'3.0' -> '1.0'",
            "'1.0' -> '2.0'",
            "'1.0' -> '3.0'",
            "'1.0' -> '6.0'",
        ]
        .join("\n")
    );

    let looping = NeighborView::for_node(&graph, graph.get(8).unwrap(), &labeler);
    assert_eq!(looping.to_diagram(), "'1.0' -> '6.0'\n");
    assert!(looping
        .upstream
        .iter()
        .chain(&looping.downstream)
        .all(|edge| edge.source != edge.destination));
}

#[test]
fn referenced_sheet_without_references_is_lost() {
    // Folder F, A references B, but B declares nothing and never becomes a node
    let records = vec![
        Record::folder(1, "F"),
        sheet(2, "1.0 A", &[3]),
        sheet(3, "2.0 B", &[]),
    ];
    let graph = build(&records);

    assert!(graph.is_empty());
    assert_eq!(graph.stats().references_dropped, 1);
}

#[test]
fn pointing_at_filtered_sheet_leaves_node_isolated() {
    let records = vec![sheet(10, "C", &[11]), sheet(11, "D", &[])];
    let graph = build(&records);

    assert!(graph.is_empty());
    assert_eq!(graph.stats().materialized, 1);
    assert_eq!(graph.stats().pruned, 1);
}

#[test]
fn parses_and_builds_from_json() {
    let json = r#"[
        {"id": 1, "parentId": 0, "name": "1.0 A", "typeName": "MeasureSheet", "isFolder": false,
         "directReferences": [{"id": 2, "typeName": "MeasureSheet", "dependencyType": [1]}]},
        {"id": 2, "parentId": 0, "name": "2.0 B", "typeName": "MeasureSheet", "isFolder": false,
         "directReferences": [{"id": 3, "typeName": "Table", "dependencyType": null}]},
        {"id": 3, "parentId": 0, "name": "Table", "typeName": "Table", "isFolder": false,
         "directReferences": null}
    ]"#;

    let export = Export::from_str(json).unwrap();
    let graph = build(&export.records);

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.get(1).unwrap().incoming(), &[2]);
    assert_eq!(graph.get(2).unwrap().outgoing(), &[1]);
}
