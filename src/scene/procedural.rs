//! Procedural fallback room and the sky plate.
//!
//! The room uses the same node names as the authored model so everything
//! that looks nodes up by name (glass panes, the screen, the lamp) works
//! before, or without, a model file.

use glam::Vec3;

use super::{MeshData, MeshVertex, NodeHandle, NodeMaterial, SceneGraph, Transform};
use crate::options::SkyOptions;

/// Name of the sky plate node.
pub const SKY_PLATE: &str = "sky_plate";

/// Name of the screen node the camera zooms onto.
pub const SCREEN: &str = "screen";

fn face(
    mesh: &mut MeshData,
    center: Vec3,
    normal: Vec3,
    u: Vec3,
    v: Vec3,
) {
    let base = mesh.vertices.len() as u32;
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    for (su, sv) in corners {
        let p = center + u * su + v * sv;
        mesh.vertices.push(MeshVertex {
            position: p.to_array(),
            normal: normal.to_array(),
            uv: [(su + 1.0) * 0.5, (1.0 - sv) * 0.5],
        });
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Flat rectangle facing +Z, centred on the origin.
pub fn quad(width: f32, height: f32) -> MeshData {
    let mut mesh = MeshData::default();
    face(
        &mut mesh,
        Vec3::ZERO,
        Vec3::Z,
        Vec3::X * width * 0.5,
        Vec3::Y * height * 0.5,
    );
    mesh
}

/// Axis-aligned box centred on `center`.
pub fn cuboid_at(center: Vec3, size: Vec3) -> MeshData {
    let h = size * 0.5;
    let mut mesh = MeshData::default();
    let axes = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y, h.x, h.z, h.y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y, h.x, h.z, h.y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z, h.y, h.x, h.z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z, h.y, h.x, h.z),
        (Vec3::Z, Vec3::X, Vec3::Y, h.z, h.x, h.y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y, h.z, h.x, h.y),
    ];
    for (n, u, v, dn, du, dv) in axes {
        face(&mut mesh, center + n * dn, n, u * du, v * dv);
    }
    mesh
}

/// Axis-aligned box centred on the origin.
pub fn cuboid(size: Vec3) -> MeshData {
    cuboid_at(Vec3::ZERO, size)
}

fn merged(parts: &[MeshData]) -> MeshData {
    let mut mesh = MeshData::default();
    for part in parts {
        mesh.append(part);
    }
    mesh
}

struct Piece {
    name: &'static str,
    center: Vec3,
    mesh: MeshData,
    tint: [f32; 3],
}

fn piece(name: &'static str, center: [f32; 3], size: [f32; 3], tint: [f32; 3]) -> Piece {
    Piece {
        name,
        center: Vec3::from(center),
        mesh: cuboid(Vec3::from(size)),
        tint,
    }
}

/// Window opening: centre x, centre y, width, height. Both windows sit in
/// the back wall.
const WINDOWS: [(f32, f32, f32, f32); 2] = [(-4.6, 1.7, 1.0, 1.2), (-1.8, 1.7, 1.0, 1.2)];
const BACK_WALL_Z: f32 = -4.5;
const ROOM_MIN_X: f32 = -6.0;
const ROOM_MAX_X: f32 = 0.5;
const ROOM_HEIGHT: f32 = 3.0;

fn back_wall() -> MeshData {
    let z = BACK_WALL_Z;
    let t = 0.1;
    let sill = WINDOWS[0].1 - WINDOWS[0].3 * 0.5;
    let head = WINDOWS[0].1 + WINDOWS[0].3 * 0.5;
    let width = ROOM_MAX_X - ROOM_MIN_X;
    let mid_x = (ROOM_MIN_X + ROOM_MAX_X) * 0.5;

    let mut parts = vec![
        cuboid_at(Vec3::new(mid_x, sill * 0.5, z), Vec3::new(width, sill, t)),
        cuboid_at(
            Vec3::new(mid_x, (head + ROOM_HEIGHT) * 0.5, z),
            Vec3::new(width, ROOM_HEIGHT - head, t),
        ),
    ];
    let mut x = ROOM_MIN_X;
    for (cx, _, w, _) in WINDOWS {
        let left = cx - w * 0.5;
        parts.push(cuboid_at(
            Vec3::new((x + left) * 0.5, (sill + head) * 0.5, z),
            Vec3::new(left - x, head - sill, t),
        ));
        x = cx + w * 0.5;
    }
    parts.push(cuboid_at(
        Vec3::new((x + ROOM_MAX_X) * 0.5, (sill + head) * 0.5, z),
        Vec3::new(ROOM_MAX_X - x, head - sill, t),
    ));
    merged(&parts)
}

fn window_frame(cx: f32, cy: f32, w: f32, h: f32) -> MeshData {
    let z = BACK_WALL_Z;
    let bar = 0.05;
    merged(&[
        cuboid_at(Vec3::new(cx, cy + h * 0.5, z), Vec3::new(w, bar, 0.12)),
        cuboid_at(Vec3::new(cx, cy - h * 0.5, z), Vec3::new(w, bar, 0.12)),
        cuboid_at(Vec3::new(cx - w * 0.5, cy, z), Vec3::new(bar, h, 0.12)),
        cuboid_at(Vec3::new(cx + w * 0.5, cy, z), Vec3::new(bar, h, 0.12)),
        cuboid_at(Vec3::new(cx, cy, z), Vec3::new(bar, h, 0.12)),
    ])
}

fn pieces() -> Vec<Piece> {
    let wood = [0.55, 0.38, 0.24];
    let plant = [0.25, 0.5, 0.28];
    let wall = [0.86, 0.82, 0.76];
    let dark = [0.12, 0.12, 0.14];

    let mut list = vec![
        Piece {
            name: "floor",
            center: Vec3::new(-2.75, 0.0, -2.0),
            mesh: cuboid(Vec3::new(6.5, 0.02, 5.0)),
            tint: [0.42, 0.33, 0.27],
        },
        Piece {
            name: "ceiling",
            center: Vec3::new(-2.75, ROOM_HEIGHT, -2.0),
            mesh: cuboid(Vec3::new(6.5, 0.02, 5.0)),
            tint: wall,
        },
        Piece {
            name: "wall1",
            center: Vec3::ZERO,
            mesh: back_wall(),
            tint: wall,
        },
        piece("wall2", [ROOM_MIN_X, 1.5, -2.0], [0.1, 3.0, 5.0], [0.8, 0.76, 0.7]),
        piece("desk", [-3.2, 0.74, -3.85], [1.6, 0.06, 0.7], wood),
        piece("computer", [-3.2, 1.2, -4.08], [0.56, 0.38, 0.04], dark),
        piece("keyboard", [-3.2, 0.78, -3.6], [0.44, 0.02, 0.14], [0.2, 0.2, 0.22]),
        piece("mouse", [-2.85, 0.785, -3.6], [0.06, 0.03, 0.1], [0.2, 0.2, 0.22]),
        piece("desk_lamp", [-3.85, 0.98, -4.0], [0.12, 0.44, 0.12], [0.9, 0.8, 0.45]),
        piece("coffee", [-2.65, 0.82, -3.75], [0.08, 0.1, 0.08], [0.95, 0.95, 0.92]),
        piece("book", [-3.7, 0.79, -3.7], [0.22, 0.04, 0.3], [0.6, 0.2, 0.2]),
        piece("phone", [-2.7, 0.775, -3.95], [0.08, 0.01, 0.15], dark),
        piece("chair2", [-3.1, 0.5, -3.0], [0.5, 1.0, 0.5], [0.3, 0.3, 0.34]),
        piece("plant1", [-1.0, 0.4, -4.2], [0.3, 0.8, 0.3], plant),
        piece("plant2", [-5.5, 0.35, -4.1], [0.35, 0.7, 0.35], plant),
        piece("plant3", [-2.2, 0.85, -4.3], [0.15, 0.22, 0.15], plant),
        piece("floor_lamp", [-5.4, 0.8, -3.0], [0.2, 1.6, 0.2], [0.7, 0.7, 0.65]),
        piece("curtain_stick", [-3.2, 2.45, -4.4], [4.4, 0.03, 0.03], [0.3, 0.25, 0.2]),
        piece("curtain", [-5.4, 1.5, -4.35], [0.4, 1.9, 0.05], [0.75, 0.6, 0.5]),
        piece("poster1", [-3.2, 1.95, -4.44], [0.6, 0.8, 0.01], [0.3, 0.45, 0.7]),
        piece("poster2", [ROOM_MIN_X + 0.06, 1.8, -2.5], [0.01, 0.7, 0.5], [0.8, 0.55, 0.3]),
        piece("poster3", [ROOM_MIN_X + 0.06, 1.7, -1.4], [0.01, 0.5, 0.4], [0.55, 0.3, 0.6]),
    ];

    for (i, (cx, cy, w, h)) in WINDOWS.into_iter().enumerate() {
        list.push(Piece {
            name: if i == 0 { "window1" } else { "window2" },
            center: Vec3::ZERO,
            mesh: window_frame(cx, cy, w, h),
            tint: [0.95, 0.95, 0.95],
        });
    }
    list
}

/// Glass panes: two per window, left and right of the mullion.
fn glass_panes() -> Vec<(&'static str, Vec3, MeshData)> {
    let names = [
        ("window1glass1", "window1glass2"),
        ("window2glass1", "window2glass2"),
    ];
    WINDOWS
        .into_iter()
        .zip(names)
        .flat_map(|((cx, cy, w, h), (left, right))| {
            let pane_w = w * 0.5 - 0.04;
            let pane_h = h - 0.04;
            let offset = w * 0.25;
            [
                (left, Vec3::new(cx - offset, cy, BACK_WALL_Z), quad(pane_w, pane_h)),
                (right, Vec3::new(cx + offset, cy, BACK_WALL_Z), quad(pane_w, pane_h)),
            ]
        })
        .collect()
}

/// Fill `graph` with the procedural room.
pub fn build_room(graph: &mut SceneGraph) {
    for p in pieces() {
        let _ = graph.insert(
            p.name,
            Transform::from_translation(p.center),
            Some(p.mesh),
            NodeMaterial::Baked {
                texture: None,
                tint: p.tint,
            },
        );
    }
    for (name, center, mesh) in glass_panes() {
        let _ = graph.insert(
            name,
            Transform::from_translation(center),
            Some(mesh),
            NodeMaterial::Glass,
        );
    }
    let _ = graph.insert(
        SCREEN,
        Transform::from_translation(Vec3::new(-3.2, 1.2, -4.055)),
        Some(quad(0.5, 0.31)),
        NodeMaterial::Baked {
            texture: None,
            tint: [0.05, 0.06, 0.08],
        },
    );
    log::debug!("procedural room: {} nodes", graph.len());
}

/// Add (or replace) the sky plate described by `sky`.
pub fn add_sky_plate(graph: &mut SceneGraph, sky: &SkyOptions) -> NodeHandle {
    graph.insert(
        SKY_PLATE,
        Transform::from_translation(Vec3::from(sky.plate_position)),
        Some(quad(sky.plate_size[0], sky.plate_size[1])),
        NodeMaterial::Sky,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AssetOptions;

    #[test]
    fn room_has_every_named_node() {
        let mut graph = SceneGraph::new();
        build_room(&mut graph);
        let assets = AssetOptions::default();
        for name in assets.objects.iter().chain(&assets.glass) {
            assert!(graph.find(name).is_some(), "missing node {name}");
        }
        assert!(graph.find(&assets.screen_node).is_some());
        assert!(graph.find(&assets.lamp_node).is_some());
    }

    #[test]
    fn glass_panes_use_glass_material() {
        let mut graph = SceneGraph::new();
        build_room(&mut graph);
        for name in AssetOptions::default().glass {
            let node = graph.find(&name).and_then(|h| graph.node(h));
            assert!(node.is_some_and(|n| n.material == NodeMaterial::Glass));
        }
    }

    #[test]
    fn screen_faces_the_camera() {
        let mut graph = SceneGraph::new();
        build_room(&mut graph);
        let screen = graph.find(SCREEN).and_then(|h| graph.zoom_target(h)).unwrap();
        assert!((screen.normal() - Vec3::Z).length() < 1e-6);
        assert!((screen.size.x - 0.5).abs() < 1e-5);
        assert!((screen.size.y - 0.31).abs() < 1e-5);
    }

    #[test]
    fn cuboid_has_six_faces() {
        let mesh = cuboid(Vec3::ONE);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let b = mesh.bounds();
        assert_eq!(b.size(), Vec3::ONE);
    }

    #[test]
    fn sky_plate_follows_options() {
        let mut graph = SceneGraph::new();
        let sky = SkyOptions::default();
        let h = add_sky_plate(&mut graph, &sky);
        let node = graph.node(h).unwrap();
        assert_eq!(node.material, NodeMaterial::Sky);
        assert_eq!(node.transform.translation, Vec3::new(-5.0, 11.0, -30.0));
        assert_eq!(node.local_bounds.size().x, 50.0);
    }
}
