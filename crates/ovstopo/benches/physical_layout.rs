use criterion::{Criterion, criterion_group, criterion_main};
use ovstopo::entities::{LinkKind, TunnelPair};
use ovstopo::render::{ForceLayoutGraph, GraphLink, GraphNode, GraphOptions, NodeKind};
use std::hint::black_box;

/// `hosts` OVSDB nodes, each managing `br-int`, with a full VXLAN mesh between the bridges.
fn synthetic_mesh(hosts: usize) -> (Vec<GraphNode>, Vec<GraphLink>) {
    let mut nodes = Vec::with_capacity(hosts * 2);
    for h in 0..hosts {
        nodes.push(GraphNode::new(
            format!("ovsdb:{h}/bridge/br-int"),
            format!("10.0.{}.{}", h / 250, h % 250 + 1),
            NodeKind::Bridge,
        ));
    }
    for h in 0..hosts {
        nodes.push(GraphNode::new(format!("ovsdb:{h}"), format!("ovsdb:{h}"), NodeKind::Ovsdb));
    }

    let mut links = Vec::new();
    for h in 0..hosts {
        links.push(GraphLink::new(
            format!("ovsdb:{h}-br-int"),
            hosts + h,
            h,
            LinkKind::BridgeOvs,
        ));
    }
    for a in 0..hosts {
        for b in (a + 1)..hosts {
            let pair = TunnelPair {
                source_port: format!("vxlan-{b}"),
                dest_port: format!("vxlan-{a}"),
                source_ip: format!("192.168.0.{a}"),
                dest_ip: format!("192.168.0.{b}"),
            };
            links.push(GraphLink::new(
                format!("tun-{a}-{b}"),
                a,
                b,
                LinkKind::Tunnel(pair),
            ));
        }
    }
    (nodes, links)
}

fn bench_physical_layout(c: &mut Criterion) {
    let (nodes, links) = synthetic_mesh(24);

    let mut group = c.benchmark_group("physical_layout");
    group.sample_size(30);

    group.bench_function("mesh24_settle_300_ticks", |b| {
        b.iter(|| {
            let mut graph = ForceLayoutGraph::new(GraphOptions::default());
            graph.set_nodes(black_box(nodes.clone()));
            graph.set_links(black_box(links.clone())).expect("links");
            graph.start();
            let ticks = graph.run(300);
            graph.stop();
            black_box((ticks, graph.nodes().len()));
        });
    });

    group.bench_function("mesh24_perspective_toggle_x50", |b| {
        let mut graph = ForceLayoutGraph::new(GraphOptions::default());
        graph.set_nodes(nodes.clone());
        graph.set_links(links.clone()).expect("links");
        graph.start();
        graph.run(300);
        graph.stop();
        b.iter(|| {
            for _ in 0..50usize {
                graph.apply_perspective(true).expect("enable");
                graph.apply_perspective(false).expect("disable");
            }
            black_box(graph.transform());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_physical_layout);
criterion_main!(benches);
