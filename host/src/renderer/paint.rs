//! 场景绘制列表 → egui 图元
//!
//! 纯转换，不依赖 GPU；文字需要字体，单独作为 [`Primitive::Text`] 交给 Painter。

use board_fx::scene::{Affine, DrawItem, Rgba, Shape, StrokeStyle, Vec2};
use egui::{Color32, Mesh, Pos2, Stroke};

/// 转换结果
#[derive(Debug, Clone)]
pub enum Primitive {
    Shape(egui::Shape),
    Text {
        pos: Pos2,
        text: String,
        size: f32,
        color: Color32,
    },
}

fn color(c: Rgba, alpha: f32) -> Color32 {
    let a = (c.a * alpha).clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (a * 255.0).round() as u8)
}

fn stroke(style: StrokeStyle, transform: &Affine, alpha: f32) -> Stroke {
    Stroke::new(style.width * transform.scale, color(style.color, alpha))
}

fn pos(p: Vec2, origin: Pos2) -> Pos2 {
    Pos2::new(origin.x + p.x, origin.y + p.y)
}

/// 以局部原点为中心的三角扇
fn fan(points: &[Vec2], transform: &Affine, origin: Pos2, fill: Color32) -> egui::Shape {
    let mut mesh = Mesh::default();
    mesh.colored_vertex(pos(transform.apply(Vec2::zero()), origin), fill);
    for p in points {
        mesh.colored_vertex(pos(transform.apply(*p), origin), fill);
    }
    let n = points.len() as u32;
    for i in 0..n {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
    }
    egui::Shape::mesh(mesh)
}

fn translate_shape(
    shape: &Shape,
    transform: &Affine,
    alpha: f32,
    origin: Pos2,
    out: &mut Vec<Primitive>,
) {
    let center = pos(transform.translation, origin);
    match shape {
        Shape::Empty => {}
        Shape::Circle {
            radius,
            fill,
            stroke: outline,
        } => {
            let r = radius * transform.scale;
            if r <= 0.0 {
                return;
            }
            if let Some(fill) = fill {
                out.push(Primitive::Shape(egui::Shape::circle_filled(
                    center,
                    r,
                    color(*fill, alpha),
                )));
            }
            if let Some(style) = outline {
                out.push(Primitive::Shape(egui::Shape::circle_stroke(
                    center,
                    r,
                    stroke(*style, transform, alpha),
                )));
            }
        }
        Shape::Rect {
            width,
            height,
            fill,
        } => {
            let (hw, hh) = (width / 2.0, height / 2.0);
            let corners = [
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ]
            .iter()
            .map(|p| pos(transform.apply(*p), origin))
            .collect();
            out.push(Primitive::Shape(egui::Shape::convex_polygon(
                corners,
                color(*fill, alpha),
                Stroke::NONE,
            )));
        }
        Shape::Polygon { points, fill } => {
            if points.len() >= 3 {
                out.push(Primitive::Shape(fan(
                    points,
                    transform,
                    origin,
                    color(*fill, alpha),
                )));
            }
        }
        Shape::Polyline {
            points,
            stroke: style,
        } => {
            if points.len() >= 2 {
                let line = points
                    .iter()
                    .map(|p| pos(transform.apply(*p), origin))
                    .collect();
                out.push(Primitive::Shape(egui::Shape::line(
                    line,
                    stroke(*style, transform, alpha),
                )));
            }
        }
        Shape::Glyph {
            text,
            size,
            color: c,
        } => {
            out.push(Primitive::Text {
                pos: center,
                text: text.clone(),
                size: size * transform.scale,
                color: color(*c, alpha),
            });
        }
        Shape::Layers(layers) => {
            for layer in layers {
                translate_shape(layer, transform, alpha, origin, out);
            }
        }
    }
}

/// 转换整张绘制列表；`origin` 为渲染表面左上角在窗口中的位置
pub fn translate(items: &[DrawItem<'_>], origin: Pos2) -> Vec<Primitive> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        translate_shape(item.shape, &item.transform, item.alpha, origin, &mut out);
    }
    out
}

/// 提交到 egui Painter
pub fn paint(painter: &egui::Painter, primitives: &[Primitive]) {
    for primitive in primitives {
        match primitive {
            Primitive::Shape(shape) => {
                painter.add(shape.clone());
            }
            Primitive::Text {
                pos,
                text,
                size,
                color,
            } => {
                if *size > 0.5 {
                    painter.text(
                        *pos,
                        egui::Align2::CENTER_CENTER,
                        text,
                        egui::FontId::monospace(*size),
                        *color,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_fx::scene::{Node, Scene};

    #[test]
    fn test_disc_position_and_alpha() {
        let mut scene = Scene::new();
        let root = scene.root();
        let c = scene
            .attach(root, Node::container().at(100.0, 50.0).faded(0.5))
            .unwrap();
        scene
            .attach(
                c,
                Node::with_shape(Shape::disc(10.0, Rgba::WHITE)).scaled(2.0),
            )
            .unwrap();

        let prims = translate(&scene.draw_list(), Pos2::new(0.0, 56.0));
        assert_eq!(prims.len(), 1);
        match &prims[0] {
            Primitive::Shape(egui::Shape::Circle(circle)) => {
                assert_eq!(circle.center, Pos2::new(100.0, 106.0));
                assert_eq!(circle.radius, 20.0);
                assert_eq!(circle.fill.a(), 128);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_star_becomes_fan_mesh() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene
            .attach(
                root,
                Node::with_shape(Shape::star(5, 4.0, 10.0, Rgba::WHITE)),
            )
            .unwrap();

        let prims = translate(&scene.draw_list(), Pos2::ZERO);
        match &prims[0] {
            Primitive::Shape(egui::Shape::Mesh(mesh)) => {
                assert_eq!(mesh.vertices.len(), 11);
                assert_eq!(mesh.indices.len(), 30);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_layers_and_glyph() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene
            .attach(root, Node::with_shape(Shape::glow(5.0, 0xff0000, 0.1, 0.8)))
            .unwrap();
        scene
            .attach(
                root,
                Node::with_shape(Shape::Glyph {
                    text: "ア".to_string(),
                    size: 12.0,
                    color: Rgba::hex(0x00ff00),
                })
                .at(3.0, 4.0),
            )
            .unwrap();

        let prims = translate(&scene.draw_list(), Pos2::ZERO);
        assert_eq!(prims.len(), 3);
        assert!(matches!(
            &prims[2],
            Primitive::Text { pos, size, .. } if *pos == Pos2::new(3.0, 4.0) && *size == 12.0
        ));
    }
}
