use glam::{Vec2, Vec3};
use lyon_path::Path;
use lyon_path::math::point;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use ttf_parser::{Face, OutlineBuilder};

use crate::{Geometry, SceneError};

/// A closed polygon in glyph space (y up), without a repeated end point.
pub type Contour = Vec<Vec2>;

/// Extrusion parameters.
///
/// Lower `curve_segments` and `bevel_segments` load and render faster at the
/// cost of visibly faceted curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextParams {
    /// Em size in scene units.
    pub size: f32,
    /// Extrusion depth along +z, excluding the bevel.
    pub depth: f32,
    /// Line segments per outline curve.
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    /// How far the bevel extends along z beyond each cap.
    pub bevel_thickness: f32,
    /// How far the bevel extends outward from the outline.
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        }
    }
}

/// Collects a glyph outline as flattened contours.
struct ContourSink<'a> {
    contours: &'a mut Vec<Contour>,
    current: Contour,
    scale: f32,
    origin: Vec2,
    segments: u32,
}

impl ContourSink<'_> {
    fn map(&self, x: f32, y: f32) -> Vec2 {
        self.origin + Vec2::new(x, y) * self.scale
    }

    fn last(&self) -> Vec2 {
        self.current.last().copied().unwrap_or(self.origin)
    }

    fn flush(&mut self) {
        let contour = std::mem::take(&mut self.current);
        let contour = clean_contour(contour);
        if contour.len() >= 3 {
            self.contours.push(contour);
        }
    }
}

impl OutlineBuilder for ContourSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last();
        let p1 = self.map(x1, y1);
        let p2 = self.map(x, y);
        for s in 1..=self.segments {
            let t = s as f32 / self.segments as f32;
            let mt = 1.0 - t;
            self.current
                .push(p0 * (mt * mt) + p1 * (2.0 * mt * t) + p2 * (t * t));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last();
        let p1 = self.map(x1, y1);
        let p2 = self.map(x2, y2);
        let p3 = self.map(x, y);
        for s in 1..=self.segments {
            let t = s as f32 / self.segments as f32;
            let mt = 1.0 - t;
            self.current.push(
                p0 * (mt * mt * mt)
                    + p1 * (3.0 * mt * mt * t)
                    + p2 * (3.0 * mt * t * t)
                    + p3 * (t * t * t),
            );
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Drop consecutive duplicates and the closing point.
fn clean_contour(points: Contour) -> Contour {
    let mut out: Contour = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|q| q.distance_squared(p) > 1e-12) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) <= 1e-12 {
        out.pop();
    }
    out
}

/// Lay out `text` on one line and flatten every glyph outline.
pub fn glyph_contours(
    text: &str,
    font_data: &[u8],
    params: &TextParams,
) -> Result<Vec<Contour>, SceneError> {
    let face = Face::parse(font_data, 0)
        .map_err(|e| SceneError::InvalidFont(e.to_string()))?;
    let scale = params.size / face.units_per_em() as f32;
    let segments = params.curve_segments.max(1);

    let mut contours = Vec::new();
    let mut cursor = 0.0f32;
    for ch in text.chars() {
        let Some(glyph) = face.glyph_index(ch) else {
            tracing::debug!(?ch, "font has no glyph, skipping");
            continue;
        };
        let mut sink = ContourSink {
            contours: &mut contours,
            current: Vec::new(),
            scale,
            origin: Vec2::new(cursor, 0.0),
            segments,
        };
        // Glyphs without an outline (spaces) only advance the cursor.
        if face.outline_glyph(glyph, &mut sink).is_some() {
            sink.flush();
        }
        cursor += face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale;
    }

    if contours.is_empty() {
        return Err(SceneError::EmptyText(text.to_string()));
    }
    Ok(contours)
}

/// Parse the font, extrude `text` and center the resulting geometry.
pub fn extrude_text(
    text: &str,
    font_data: &[u8],
    params: &TextParams,
) -> Result<Geometry, SceneError> {
    let contours = glyph_contours(text, font_data, params)?;
    let mut geometry = extrude_contours(&contours, params)?;
    geometry.center();
    Ok(geometry)
}

fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| contour[i].perp_dot(contour[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn contains(contour: &[Vec2], p: Vec2) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Per-vertex directions pointing away from the solid region, scaled so that
/// an offset of `d` moves each edge by roughly `d`.
fn outward_normals(contours: &[Contour]) -> Vec<Vec<Vec2>> {
    contours
        .iter()
        .enumerate()
        .map(|(ci, contour)| {
            let nesting = contours
                .iter()
                .enumerate()
                .filter(|(oi, other)| *oi != ci && contains(other, contour[0]))
                .count();
            let is_hole = nesting % 2 == 1;
            let ccw = signed_area(contour) > 0.0;
            // Right-hand normal points outward for a solid CCW contour.
            let sign = if ccw != is_hole { 1.0 } else { -1.0 };

            let n = contour.len();
            let edge_normal = |i: usize| {
                let d = (contour[(i + 1) % n] - contour[i]).normalize_or_zero();
                Vec2::new(d.y, -d.x) * sign
            };
            (0..n)
                .map(|i| {
                    let prev = edge_normal((i + n - 1) % n);
                    let next = edge_normal(i);
                    let avg = (prev + next).normalize_or_zero();
                    let cos = avg.dot(next).max(0.25);
                    avg / cos
                })
                .collect()
        })
        .collect()
}

/// One ring of the extrusion: z position and outward offset.
#[derive(Debug, Clone, Copy)]
struct Layer {
    z: f32,
    offset: f32,
}

fn layers(params: &TextParams) -> Vec<Layer> {
    let mut out = Vec::new();
    let segs = params.bevel_segments.max(1);
    let bevel = |b: u32| {
        let t = b as f32 / segs as f32;
        (
            params.bevel_thickness * (t * FRAC_PI_2).cos(),
            params.bevel_size * (t * FRAC_PI_2).sin() + params.bevel_offset,
        )
    };

    if params.bevel_enabled {
        for b in 0..segs {
            let (z, offset) = bevel(b);
            out.push(Layer { z: -z, offset });
        }
    }
    let body = if params.bevel_enabled {
        params.bevel_size + params.bevel_offset
    } else {
        0.0
    };
    out.push(Layer {
        z: 0.0,
        offset: body,
    });
    out.push(Layer {
        z: params.depth,
        offset: body,
    });
    if params.bevel_enabled {
        for b in (0..segs).rev() {
            let (z, offset) = bevel(b);
            out.push(Layer {
                z: params.depth + z,
                offset,
            });
        }
    }
    out
}

fn tessellate_cap(
    contours: &[Contour],
    normals: &[Vec<Vec2>],
    offset: f32,
) -> Result<VertexBuffers<Vec2, u32>, SceneError> {
    let mut builder = Path::builder();
    for (contour, dirs) in contours.iter().zip(normals) {
        let p = contour[0] + dirs[0] * offset;
        builder.begin(point(p.x, p.y));
        for (q, d) in contour.iter().zip(dirs).skip(1) {
            let q = *q + *d * offset;
            builder.line_to(point(q.x, q.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::tolerance(1e-4).with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
                let p = v.position();
                Vec2::new(p.x, p.y)
            }),
        )
        .map_err(|e| SceneError::Tessellation(format!("{e:?}")))?;
    Ok(buffers)
}

/// Extrude closed outlines into a solid with optional bevel. Caps face ±z and
/// side walls face away from the solid; all normals are flat.
pub fn extrude_contours(contours: &[Contour], params: &TextParams) -> Result<Geometry, SceneError> {
    let contours: Vec<Contour> = contours
        .iter()
        .cloned()
        .map(clean_contour)
        .filter(|c| c.len() >= 3)
        .collect();
    if contours.is_empty() {
        return Err(SceneError::EmptyText(String::new()));
    }
    let normals = outward_normals(&contours);
    let layers = layers(params);
    let (Some(bottom), Some(top)) = (layers.first().copied(), layers.last().copied()) else {
        return Err(SceneError::Tessellation("no extrusion layers".into()));
    };

    let mut geometry = Geometry::default();

    // Caps: back faces -z, front faces +z.
    let cap = tessellate_cap(&contours, &normals, bottom.offset)?;
    for tri in cap.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cap.vertices[i as usize]);
        let ccw = (b - a).perp_dot(c - a) > 0.0;
        let (b, c) = if ccw { (c, b) } else { (b, c) };
        geometry.push_flat_triangle(
            a.extend(bottom.z),
            b.extend(bottom.z),
            c.extend(bottom.z),
            Vec3::NEG_Z,
        );
    }
    let cap = if (top.offset - bottom.offset).abs() > f32::EPSILON {
        tessellate_cap(&contours, &normals, top.offset)?
    } else {
        cap
    };
    for tri in cap.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cap.vertices[i as usize]);
        let ccw = (b - a).perp_dot(c - a) > 0.0;
        let (b, c) = if ccw { (b, c) } else { (c, b) };
        geometry.push_flat_triangle(a.extend(top.z), b.extend(top.z), c.extend(top.z), Vec3::Z);
    }

    // Side walls between consecutive layers.
    for (contour, dirs) in contours.iter().zip(&normals) {
        let n = contour.len();
        let at = |i: usize, layer: Layer| (contour[i] + dirs[i] * layer.offset).extend(layer.z);
        for pair in layers.windows(2) {
            let (l0, l1) = (pair[0], pair[1]);
            for i in 0..n {
                let j = (i + 1) % n;
                let (a, b, c, d) = (at(i, l0), at(j, l0), at(j, l1), at(i, l1));
                let edge = contour[j] - contour[i];
                let outward = (dirs[i] + dirs[j]).normalize_or(Vec2::new(edge.y, -edge.x));
                // Offsets at tight concave corners can cross and fold the quad.
                push_wall_triangle(&mut geometry, a, b, c, outward);
                push_wall_triangle(&mut geometry, a, c, d, outward);
            }
        }
    }

    Ok(geometry)
}

fn push_wall_triangle(geometry: &mut Geometry, a: Vec3, b: Vec3, c: Vec3, outward: Vec2) {
    let face = (b - a).cross(c - a);
    if face.length_squared() <= 1e-20 {
        return;
    }
    if face.truncate().dot(outward) >= 0.0 {
        geometry.push_flat_triangle(a, b, c, face.normalize());
    } else {
        geometry.push_flat_triangle(a, c, b, -face.normalize());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32, ccw: bool) -> Contour {
        let mut c = vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ];
        if !ccw {
            c.reverse();
        }
        c
    }

    fn check_orientation(g: &Geometry) {
        for tri in g.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| g.positions[i as usize]);
            let n = g.normals[tri[0] as usize];
            let face = (b - a).cross(c - a);
            if face.length_squared() > 1e-12 {
                assert!(face.dot(n) > 0.0, "winding disagrees with normal");
            }
        }
    }

    #[test]
    fn layer_stack_without_bevel() {
        let params = TextParams {
            bevel_enabled: false,
            ..TextParams::default()
        };
        let l = layers(&params);
        assert_eq!(l.len(), 2);
        assert_eq!(l[0].z, 0.0);
        assert_eq!(l[1].z, params.depth);
    }

    #[test]
    fn layer_stack_with_bevel() {
        let params = TextParams::default();
        let l = layers(&params);
        assert_eq!(l.len(), 2 * params.bevel_segments as usize + 2);
        assert!((l[0].z + params.bevel_thickness).abs() < 1e-6);
        let last = l.last().unwrap();
        assert!((last.z - (params.depth + params.bevel_thickness)).abs() < 1e-6);
    }

    #[test]
    fn extruded_square_bounds() {
        let params = TextParams::default();
        let g = extrude_contours(&[square(0.0, 1.0, true)], &params).unwrap();
        let b = g.bounding_box().unwrap();
        let grow = params.bevel_size + params.bevel_offset;
        assert!((b.min.x + grow).abs() < 1e-4);
        assert!((b.max.x - (1.0 + grow)).abs() < 1e-4);
        assert!((b.min.z + params.bevel_thickness).abs() < 1e-5);
        assert!((b.max.z - (params.depth + params.bevel_thickness)).abs() < 1e-5);
        check_orientation(&g);
    }

    #[test]
    fn clockwise_outline_faces_outward_too() {
        let params = TextParams {
            bevel_enabled: false,
            ..TextParams::default()
        };
        let g = extrude_contours(&[square(0.0, 1.0, false)], &params).unwrap();
        check_orientation(&g);
        // A side normal on the x = 1 wall points toward +x.
        let wall = g
            .positions
            .iter()
            .zip(&g.normals)
            .find(|(p, n)| (p.x - 1.0).abs() < 1e-6 && n.z.abs() < 1e-6 && n.x.abs() > 0.5)
            .map(|(_, n)| *n)
            .unwrap();
        assert!(wall.x > 0.0);
    }

    #[test]
    fn hole_stays_open() {
        let params = TextParams {
            bevel_enabled: false,
            ..TextParams::default()
        };
        let outer = square(0.0, 3.0, true);
        let hole = square(1.0, 2.0, false);
        let g = extrude_contours(&[outer, hole], &params).unwrap();
        check_orientation(&g);
        // No cap triangle covers the hole's center.
        let center = Vec2::new(1.5, 1.5);
        for tri in g.indices.chunks_exact(3) {
            let n = g.normals[tri[0] as usize];
            if n.z.abs() < 0.5 {
                continue;
            }
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| g.positions[i as usize].truncate());
            let d1 = (b - a).perp_dot(center - a);
            let d2 = (c - b).perp_dot(center - b);
            let d3 = (a - c).perp_dot(center - c);
            let inside = (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0);
            assert!(!inside, "cap covers the hole");
        }
        // Hole walls face into the hole (toward its center).
        let hole_wall = g
            .positions
            .iter()
            .zip(&g.normals)
            .find(|(p, n)| (p.x - 1.0).abs() < 1e-6 && n.z.abs() < 1e-6 && n.x.abs() > 0.5)
            .map(|(_, n)| *n)
            .unwrap();
        assert!(hole_wall.x > 0.0);
    }

    #[test]
    fn centered_text_geometry_is_symmetric() {
        let params = TextParams::default();
        let mut g = extrude_contours(&[square(2.0, 5.0, true), square(6.0, 7.0, true)], &params)
            .unwrap();
        g.center();
        let b = g.bounding_box().unwrap();
        assert!((b.min + b.max).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn degenerate_contours_rejected() {
        let err = extrude_contours(&[vec![Vec2::ZERO, Vec2::X]], &TextParams::default());
        assert!(matches!(err, Err(SceneError::EmptyText(_))));
    }

    #[test]
    fn invalid_font_is_an_error() {
        let err = extrude_text("Click to change", b"nope", &TextParams::default());
        assert!(matches!(err, Err(SceneError::InvalidFont(_))));
    }

    /// Two glyphs: an empty `.notdef` and `A`, a 100-unit square whose top
    /// edge bulges through one off-curve point at (50, 150). 1000 units/em,
    /// `A` advances 120 units.
    fn tiny_font() -> Vec<u8> {
        fn be16(out: &mut Vec<u8>, v: i32) {
            out.extend_from_slice(&(v as u16).to_be_bytes());
        }
        fn be32(out: &mut Vec<u8>, v: u32) {
            out.extend_from_slice(&v.to_be_bytes());
        }

        let mut head = Vec::new();
        be32(&mut head, 0x0001_0000);
        be32(&mut head, 0x0001_0000);
        be32(&mut head, 0);
        be32(&mut head, 0x5F0F_3CF5);
        be16(&mut head, 0);
        be16(&mut head, 1000);
        head.extend_from_slice(&[0; 16]);
        for v in [0, 0, 100, 150] {
            be16(&mut head, v);
        }
        for v in [0, 8, 2, 0, 0] {
            be16(&mut head, v);
        }

        let mut hhea = Vec::new();
        be32(&mut hhea, 0x0001_0000);
        for v in [800, -200, 0] {
            be16(&mut hhea, v);
        }
        hhea.extend_from_slice(&[0; 24]);
        be16(&mut hhea, 2);

        let mut maxp = Vec::new();
        be32(&mut maxp, 0x0000_5000);
        be16(&mut maxp, 2);

        let mut hmtx = Vec::new();
        for v in [500, 0, 120, 0] {
            be16(&mut hmtx, v);
        }

        let mut cmap = Vec::new();
        for v in [0, 1, 0, 3] {
            be16(&mut cmap, v);
        }
        be32(&mut cmap, 12);
        for v in [0, 262, 0] {
            be16(&mut cmap, v);
        }
        let mut ids = [0u8; 256];
        ids[b'A' as usize] = 1;
        cmap.extend_from_slice(&ids);

        let mut glyf = Vec::new();
        for v in [1, 0, 0, 100, 150, 4, 0] {
            be16(&mut glyf, v);
        }
        glyf.extend_from_slice(&[1, 1, 1, 0, 1]);
        for dx in [0, 100, 0, -50, -50] {
            be16(&mut glyf, dx);
        }
        for dy in [0, 0, 100, 50, -50] {
            be16(&mut glyf, dy);
        }
        glyf.push(0);

        let mut loca = Vec::new();
        for v in [0, 0, glyf.len() as i32 / 2] {
            be16(&mut loca, v);
        }

        let tables = [
            (b"cmap", cmap),
            (b"glyf", glyf),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"loca", loca),
            (b"maxp", maxp),
        ];
        let header = 12 + 16 * tables.len();
        let mut font = Vec::new();
        be32(&mut font, 0x0001_0000);
        be16(&mut font, tables.len() as i32);
        font.extend_from_slice(&[0; 6]);
        let mut body = Vec::new();
        for (tag, data) in &tables {
            font.extend_from_slice(*tag);
            be32(&mut font, 0);
            be32(&mut font, (header + body.len()) as u32);
            be32(&mut font, data.len() as u32);
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
        }
        font.extend(body);
        font
    }

    #[test]
    fn sink_flattens_quadratic_with_scale_and_origin() {
        let mut contours = Vec::new();
        {
            let mut sink = ContourSink {
                contours: &mut contours,
                current: Vec::new(),
                scale: 0.5,
                origin: Vec2::new(10.0, 0.0),
                segments: 4,
            };
            sink.move_to(0.0, 0.0);
            sink.line_to(4.0, 0.0);
            sink.quad_to(4.0, 4.0, 0.0, 4.0);
            sink.close();
        }
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert_eq!(c.len(), 2 + 4);
        assert_eq!(c[0], Vec2::new(10.0, 0.0));
        assert_eq!(c[1], Vec2::new(12.0, 0.0));
        assert!(c[3].abs_diff_eq(Vec2::new(11.5, 1.5), 1e-6));
        assert!(c[5].abs_diff_eq(Vec2::new(10.0, 2.0), 1e-6));
    }

    #[test]
    fn sink_flattens_cubic_to_endpoint() {
        let mut contours = Vec::new();
        {
            let mut sink = ContourSink {
                contours: &mut contours,
                current: Vec::new(),
                scale: 1.0,
                origin: Vec2::ZERO,
                segments: 3,
            };
            sink.move_to(0.0, 0.0);
            sink.curve_to(0.0, 3.0, 3.0, 3.0, 3.0, 0.0);
            sink.close();
        }
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert_eq!(c.len(), 1 + 3);
        assert!(c[3].abs_diff_eq(Vec2::new(3.0, 0.0), 1e-6));
        assert!(c[1].y > 0.0 && c[2].y > 0.0);
    }

    #[test]
    fn sink_drops_degenerate_contours() {
        let mut contours = Vec::new();
        {
            let mut sink = ContourSink {
                contours: &mut contours,
                current: Vec::new(),
                scale: 1.0,
                origin: Vec2::ZERO,
                segments: 2,
            };
            sink.move_to(0.0, 0.0);
            sink.line_to(1.0, 0.0);
            sink.close();
        }
        assert!(contours.is_empty());
    }

    #[test]
    fn glyph_outlines_are_scaled_and_advanced() {
        let params = TextParams {
            size: 2.0,
            ..TextParams::default()
        };
        let contours = glyph_contours("AA", &tiny_font(), &params).unwrap();
        assert_eq!(contours.len(), 2);
        let scale = 2.0 / 1000.0;
        let first = &contours[0];
        assert_eq!(first.len(), 3 + params.curve_segments as usize);
        assert!(first[0].abs_diff_eq(Vec2::ZERO, 1e-6));
        assert!(first[1].abs_diff_eq(Vec2::new(100.0, 0.0) * scale, 1e-6));
        let end = first[first.len() - 1];
        assert!(end.abs_diff_eq(Vec2::new(0.0, 100.0) * scale, 1e-6));
        // The bulge peaks halfway along the curve.
        let peak = first.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!(peak > 100.0 * scale && peak <= 125.0 * scale + 1e-6);
        let second = contours[1][0];
        assert!(second.abs_diff_eq(Vec2::new(120.0 * scale, 0.0), 1e-6));
    }

    #[test]
    fn more_curve_segments_give_more_points() {
        let font = tiny_font();
        let coarse = TextParams {
            curve_segments: 2,
            ..TextParams::default()
        };
        let fine = TextParams {
            curve_segments: 12,
            ..TextParams::default()
        };
        let coarse = glyph_contours("A", &font, &coarse).unwrap();
        let fine = glyph_contours("A", &font, &fine).unwrap();
        assert_eq!(fine[0].len() - coarse[0].len(), 10);
    }

    #[test]
    fn unmapped_characters_are_skipped() {
        let font = tiny_font();
        let params = TextParams::default();
        assert_eq!(glyph_contours("A?", &font, &params).unwrap().len(), 1);
        assert!(matches!(
            glyph_contours("??", &font, &params),
            Err(SceneError::EmptyText(_))
        ));
    }

    #[test]
    fn extruded_glyph_is_centered() {
        let g = extrude_text("AA", &tiny_font(), &TextParams::default()).unwrap();
        check_orientation(&g);
        let b = g.bounding_box().unwrap();
        assert!((b.min + b.max).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn narrow_notch_walls_face_outward() {
        // A 0.01-wide slot: its floor corners are concave and their bevel
        // offsets cross before the bevel is fully out.
        let notched = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.505, 1.0),
            Vec2::new(0.505, 0.5),
            Vec2::new(0.495, 0.5),
            Vec2::new(0.495, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let g = extrude_contours(&[notched], &TextParams::default()).unwrap();
        check_orientation(&g);
    }

    #[test]
    fn clean_contour_drops_closing_point() {
        let c = clean_contour(vec![Vec2::ZERO, Vec2::X, Vec2::X, Vec2::ONE, Vec2::ZERO]);
        assert_eq!(c, vec![Vec2::ZERO, Vec2::X, Vec2::ONE]);
    }
}
