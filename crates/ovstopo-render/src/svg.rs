//! Headless SVG scenes for both views.

use crate::geom::fmt_number as fmt;
use crate::logical::{
    INSTANCE_SIZE, LINK_HEIGHT, LogicalLayout, NETWORK_WIDTH, ROUTER_SIZE,
};
use crate::physical::{ForceLayoutGraph, GraphLink, GraphNode, NodeKind};
use std::fmt::Write as _;

const SWITCH_GLYPH: &str = concat!(
    r##"<g class="switch" transform="translate(-16 -1036.4)">"##,
    r##"<rect x="1.6668" y="1021.9" width="28.784" height="28.901" ry="3.6808" style="fill:#2a7fff;fill-rule:evenodd;stroke:#002b69;stroke-width:3px"/>"##,
    r##"<path d="m28.043 1027.2-5.0754 3.3764-.01018-2.1082-5.9209-.022.01773-2.6018 5.9031-.037.08118-2.1164z" style="fill:#002b69"/>"##,
    r##"<path d="m27.866 1040.4-5.0754 3.3764-.01018-2.1082-5.9209-.022.01773-2.6018 5.9031-.037.08118-2.1164z" style="fill:#002b69"/>"##,
    r##"<path d="m4.0872 1032.6 5.0754 3.3764.01018-2.1082 5.9209-.022-.01773-2.6018-5.9031-.037-.08118-2.1164z" style="fill:#002b69"/>"##,
    r##"<path d="m4.2639 1045.8 5.0754 3.3764.01018-2.1082 5.9209-.022-.01773-2.6018-5.9031-.037-.08118-2.1164z" style="fill:#002b69"/>"##,
    "</g>",
);

pub fn render_physical_svg(graph: &ForceLayoutGraph) -> String {
    let opts = graph.options();
    let (w, h) = (fmt(opts.width), fmt(opts.height));

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="ovstopo-physical" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    out.push_str(concat!(
        r#"<defs><filter id="selectNode" x="-20%" y="-20%" width="140%" height="140%">"#,
        r#"<feGaussianBlur stdDeviation="2" result="coloredBlur"/>"#,
        r#"<feMerge><feMergeNode in="coloredBlur"/><feMergeNode in="SourceGraphic"/></feMerge>"#,
        r#"</filter></defs>"#,
    ));
    let _ = write!(
        &mut out,
        r#"<g class="root" transform="{}">"#,
        graph.parent_transform().to_svg_string()
    );

    if let Some(quad) = graph.background() {
        let points = quad
            .iter()
            .map(|p| format!("{},{}", fmt(p.x), fmt(p.y)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            &mut out,
            r##"<polygon class="perspective" points="{points}" fill="#f5f7fa" stroke="#c8d0da"/>"##
        );
    }

    for link in graph.links() {
        write_link(&mut out, link);
    }
    for node in graph.nodes() {
        write_node(&mut out, node);
    }

    out.push_str("</g></svg>");
    out
}

fn write_link(out: &mut String, link: &GraphLink) {
    let class = if link.is_tunnel() { "link tunnel" } else { "link" };
    let dash = link.style.dash.as_deref().unwrap_or("none");
    let _ = write!(
        out,
        r#"<path class="{class}" id="{id}" data-link-index="{idx}" d="{d}" fill="none" stroke="{stroke}" stroke-width="{sw}" stroke-dasharray="{dash}" opacity="{op}"/>"#,
        id = escape_xml(&link.id),
        idx = link.link_index,
        d = link.path,
        stroke = escape_xml(&link.style.color),
        sw = fmt(link.style.width),
        dash = escape_xml(dash),
        op = if link.hidden { "0.3" } else { "1" },
    );
}

fn write_node(out: &mut String, node: &GraphNode) {
    let kind = match node.kind {
        NodeKind::Bridge => "bridge",
        NodeKind::Ovsdb => "ovsdb",
    };
    let _ = write!(
        out,
        r#"<g class="node {kind}" data-id="{id}" transform="translate({x},{y})" opacity="{op}">{glyph}<text x="0" y="30" fill="black" text-anchor="middle">{label}</text></g>"#,
        id = escape_xml(&node.id),
        x = fmt(node.local.x),
        y = fmt(node.local.y),
        op = fmt(node.opacity()),
        glyph = SWITCH_GLYPH,
        label = escape_xml(&node.label),
    );
}

pub fn render_logical_svg(layout: &LogicalLayout) -> String {
    let (w, h) = (fmt(layout.canvas.width), fmt(layout.canvas.height));

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="ovstopo-logical" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        &mut out,
        r#"<g class="layer_0" transform="scale({s})"><rect width="{w}" height="{h}" fill="white"/><g>"#,
        s = fmt(layout.scale),
    );

    for link in &layout.links {
        let _ = write!(
            &mut out,
            r#"<g class="llink" transform="translate({x}, {y})"><rect width="{lw}" height="{lh}" style="fill: {color}"/><text x="40" y="-3">{label}</text></g>"#,
            x = fmt(link.source.x),
            y = fmt(link.source.y),
            lw = fmt(link.width().max(0.0)),
            lh = fmt(LINK_HEIGHT),
            color = escape_xml(&link.color),
            label = escape_xml(&link.label),
        );
    }

    let nh = layout.network_height;
    for net in &layout.networks {
        let _ = write!(
            &mut out,
            r#"<g class="network" data-id="{id}" transform="translate({x}, {y})"><rect width="{nw}" height="{nh}" rx="10" ry="10" style="fill: {color}"/><text x="{cx}" y="{cy}" style="text-anchor: middle; writing-mode: tb; font-size: 12px">{name}</text><text class="linfolabel" x="{ix}" y="{iy}" transform="translate({ix} {iy}) rotate(-90) translate(-{ix} -{iy})">{ip}</text></g>"#,
            id = escape_xml(&net.id),
            x = fmt(net.origin.x),
            y = fmt(net.origin.y),
            nw = fmt(NETWORK_WIDTH),
            nh = fmt(nh),
            color = escape_xml(&net.color),
            cx = fmt(NETWORK_WIDTH / 2.0),
            cy = fmt(nh / 2.0),
            name = escape_xml(&net.name),
            ix = fmt(NETWORK_WIDTH + 10.0),
            iy = fmt(nh - 15.0),
            ip = escape_xml(&net.ip),
        );
    }

    for router in &layout.routers {
        let _ = write!(
            &mut out,
            r##"<g class="router" data-id="{id}" transform="translate({x}, {y})"><rect width="{s}" height="{s}" rx="6" fill="#4a6fa5"/><text class="linfolabel" x="{cx}" y="{ty}" text-anchor="middle">{name}</text></g>"##,
            id = escape_xml(&router.id),
            x = fmt(router.origin.x),
            y = fmt(router.origin.y),
            s = fmt(ROUTER_SIZE),
            cx = fmt(ROUTER_SIZE * 0.5),
            ty = fmt(ROUTER_SIZE + 15.0),
            name = escape_xml(&router.name),
        );
    }

    for inst in &layout.instances {
        let class = if inst.dhcp { "vm dhcp" } else { "vm" };
        let _ = write!(
            &mut out,
            r##"<g class="{class}" data-id="{id}" transform="translate({x}, {y})"><rect width="{s}" height="{s}" rx="4" fill="#6c7a89"/><text class="linfolabel" x="{cx}" y="{ty}" text-anchor="middle">{name}</text><text x="-35" y="40" text-anchor="middle">{fip}</text></g>"##,
            id = escape_xml(&inst.id),
            x = fmt(inst.origin.x),
            y = fmt(inst.origin.y),
            s = fmt(INSTANCE_SIZE),
            cx = fmt(INSTANCE_SIZE * 0.5),
            ty = fmt(INSTANCE_SIZE + 15.0),
            name = escape_xml(&inst.name),
            fip = escape_xml(inst.floating_ip.as_deref().unwrap_or("")),
        );
    }

    out.push_str("</g></g></svg>");
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
