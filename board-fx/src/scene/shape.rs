//! # Shape 模块
//!
//! 节点携带的几何图元。坐标均为节点局部坐标，绘制时由宿主层
//! 乘以节点的世界变换。

use super::transform::Vec2;

/// 颜色（RGB + 透明度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 透明度 (0.0 - 1.0)
    pub a: f32,
}

impl Rgba {
    /// 白色
    pub const WHITE: Rgba = Rgba::hex(0xffffff);

    /// 由 `0xRRGGBB` 构造不透明颜色
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    /// 替换透明度
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// 描边样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// 线宽（局部坐标单位）
    pub width: f32,
    pub color: Rgba,
}

impl StrokeStyle {
    pub const fn new(width: f32, color: Rgba) -> Self {
        Self { width, color }
    }
}

/// 几何图元
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Shape {
    /// 纯容器，不绘制
    #[default]
    Empty,
    /// 圆
    Circle {
        radius: f32,
        fill: Option<Rgba>,
        stroke: Option<StrokeStyle>,
    },
    /// 以原点为中心的矩形
    Rect { width: f32, height: f32, fill: Rgba },
    /// 闭合多边形（星形多边形，以原点做三角扇填充）
    Polygon { points: Vec<Vec2>, fill: Rgba },
    /// 折线
    Polyline { points: Vec<Vec2>, stroke: StrokeStyle },
    /// 单个文字字形
    Glyph { text: String, size: f32, color: Rgba },
    /// 多层叠加（按顺序绘制）
    Layers(Vec<Shape>),
}

impl Shape {
    /// 实心圆
    pub fn disc(radius: f32, fill: Rgba) -> Self {
        Shape::Circle {
            radius,
            fill: Some(fill),
            stroke: None,
        }
    }

    /// 圆环
    pub fn ring(radius: f32, stroke: StrokeStyle) -> Self {
        Shape::Circle {
            radius,
            fill: None,
            stroke: Some(stroke),
        }
    }

    /// 外发光 + 内核的双层圆
    pub fn glow(radius: f32, color: u32, glow_alpha: f32, core_alpha: f32) -> Self {
        Shape::Layers(vec![
            Shape::disc(radius * 2.0, Rgba::hex(color).with_alpha(glow_alpha)),
            Shape::disc(radius, Rgba::hex(color).with_alpha(core_alpha)),
        ])
    }

    /// 正多边形，首顶点在 +x 轴
    pub fn regular_polygon(sides: u32, radius: f32, fill: Rgba) -> Self {
        let sides = sides.max(3);
        let points = (0..sides)
            .map(|i| {
                let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
                Vec2::from_angle(angle, radius)
            })
            .collect();
        Shape::Polygon { points, fill }
    }

    /// 星形（内外半径交替）
    pub fn star(points: u32, inner: f32, outer: f32, fill: Rgba) -> Self {
        let points = points.max(2);
        let count = points * 2;
        let vertices = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU
                    - std::f32::consts::FRAC_PI_2;
                let r = if i % 2 == 0 { outer } else { inner };
                Vec2::from_angle(angle, r)
            })
            .collect();
        Shape::Polygon {
            points: vertices,
            fill,
        }
    }

    /// 图元距局部原点的最大距离（未乘节点缩放）
    ///
    /// 用于比较不同缩放下的绝对尺寸。
    pub fn extent(&self) -> f32 {
        match self {
            Shape::Empty => 0.0,
            Shape::Circle { radius, .. } => *radius,
            Shape::Rect { width, height, .. } => (width * width + height * height).sqrt() / 2.0,
            Shape::Polygon { points, .. } | Shape::Polyline { points, .. } => {
                points.iter().map(|p| p.length()).fold(0.0, f32::max)
            }
            Shape::Glyph { size, .. } => *size / 2.0,
            Shape::Layers(layers) => layers.iter().map(Shape::extent).fold(0.0, f32::max),
        }
    }
}
