//! SVG schematic export
//!
//! Draws a block schematic of a snapshot: one box per component and one line
//! per resolvable connection, centred on the canvas. Coordinates are scaled
//! by [`RENDER_SCALE`], independent of the clearance scale used by DRC.

use crate::design::{Component, Connection};
use crate::structure::generate_default_coordinates;

/// Canvas pixels per schematic unit.
pub const RENDER_SCALE: f64 = 50.0;

pub const BOX_WIDTH: f64 = 60.0;
pub const BOX_HEIGHT: f64 = 40.0;

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the schematic as a standalone SVG document. Components without a
/// position are laid out on the default grid from
/// [`generate_default_coordinates`]; connections whose endpoints do not
/// resolve are skipped.
pub fn export_svg(
    project_name: &str,
    components: &[Component],
    connections: &[Connection],
    width: u32,
    height: u32,
) -> String {
    let components = generate_default_coordinates(components);
    let offset_x = width as f64 / 2.0;
    let offset_y = height as f64 / 2.0;
    let to_canvas = |c: &Component| {
        (
            offset_x + c.x.unwrap_or(0.0) * RENDER_SCALE,
            offset_y + c.y.unwrap_or(0.0) * RENDER_SCALE,
        )
    };

    let mut svg = format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg">
  <title>{name} - PCB Schematic</title>
  <desc>Generated by boardcheck</desc>

  <rect width="{w}" height="{h}" fill="#ffffff"/>
  <defs>
    <pattern id="grid" width="20" height="20" patternUnits="userSpaceOnUse">
      <path d="M 20 0 L 0 0 0 20" fill="none" stroke="#e2e8f0" stroke-width="0.5"/>
    </pattern>
  </defs>
  <rect width="{w}" height="{h}" fill="url(#grid)"/>

"##,
        w = width,
        h = height,
        name = escape(project_name)
    );

    for conn in connections {
        let from = components.iter().find(|c| c.reference == conn.from);
        let to = components.iter().find(|c| c.reference == conn.to);
        let (Some(from), Some(to)) = (from, to) else {
            continue;
        };
        let (x1, y1) = to_canvas(from);
        let (x2, y2) = to_canvas(to);
        svg.push_str(&format!(
            r##"  <!-- Connection: {from} to {to} -->
  <line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="#3b82f6" stroke-width="2"/>
  <text x="{lx}" y="{ly}" font-size="10" fill="#64748b">{signal}</text>
"##,
            from = escape(&conn.from),
            to = escape(&conn.to),
            lx = (x1 + x2) / 2.0 + 5.0,
            ly = (y1 + y2) / 2.0 - 5.0,
            signal = escape(&conn.signal),
        ));
    }

    for component in &components {
        let (x, y) = to_canvas(component);
        let label = component
            .value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(&component.name);
        svg.push_str(&format!(
            r##"  <!-- Component: {reference} -->
  <rect x="{rx}" y="{ry}" width="{bw}" height="{bh}" fill="#f1f5f9" stroke="#3b82f6" stroke-width="2"/>
  <text x="{x}" y="{ty}" text-anchor="middle" font-weight="bold" font-size="12" fill="#0f172a">{reference}</text>
  <text x="{x}" y="{vy}" text-anchor="middle" font-size="10" fill="#475569">{label}</text>
"##,
            reference = escape(&component.reference),
            rx = x - BOX_WIDTH / 2.0,
            ry = y - BOX_HEIGHT / 2.0,
            bw = BOX_WIDTH,
            bh = BOX_HEIGHT,
            ty = y - 5.0,
            vy = y + 8.0,
            label = escape(label),
        ));
    }

    svg.push_str(&format!(
        r##"  <text x="10" y="25" font-weight="bold" font-size="14" fill="#1e293b">PCB Schematic</text>
  <text x="10" y="42" font-size="11" fill="#64748b">{} components, {} connections</text>
</svg>
"##,
        components.len(),
        connections.len()
    ));

    svg
}
