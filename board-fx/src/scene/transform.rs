//! # Transform 模块
//!
//! 二维向量与仿射变换。节点的局部变换（位置、缩放、旋转）
//! 在绘制时沿父链组合为世界变换。

use std::ops::{Add, Mul, Sub};

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 由角度（弧度）和长度构造
    pub fn from_angle(angle: f32, length: f32) -> Self {
        Self {
            x: angle.cos() * length,
            y: angle.sin() * length,
        }
    }

    /// 向量长度
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 限制最大长度
    pub fn clamp_length(self, max: f32) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            self * (max / len)
        } else {
            self
        }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for (f32, f32) {
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

/// 仿射变换（均匀缩放 + 旋转 + 平移）
///
/// 节点只支持均匀缩放，因此用 `scale * rotation` 的组合即可精确表达，
/// 不需要完整的 2x3 矩阵。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    /// 平移
    pub translation: Vec2,
    /// 均匀缩放
    pub scale: f32,
    /// 旋转（弧度）
    pub rotation: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// 单位变换
    pub const fn identity() -> Self {
        Self {
            translation: Vec2::zero(),
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// 由局部位置、缩放、旋转构造
    pub fn new(translation: Vec2, scale: f32, rotation: f32) -> Self {
        Self {
            translation,
            scale,
            rotation,
        }
    }

    /// 变换一个点
    pub fn apply(&self, p: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        let x = (p.x * cos - p.y * sin) * self.scale;
        let y = (p.x * sin + p.y * cos) * self.scale;
        Vec2::new(x + self.translation.x, y + self.translation.y)
    }

    /// 组合：先应用 `child`，再应用 `self`
    pub fn then(&self, child: &Affine) -> Affine {
        Affine {
            translation: self.apply(child.translation),
            scale: self.scale * child.scale,
            rotation: self.rotation + child.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_lerp() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(10.0, 20.0);
        let mid = v1.lerp(v2, 0.5);
        assert_eq!(mid.x, 5.0);
        assert_eq!(mid.y, 10.0);
    }

    #[test]
    fn test_vec2_clamp_length() {
        let v = Vec2::new(3.0, 4.0).clamp_length(2.5);
        assert!((v.length() - 2.5).abs() < 1e-5);

        let short = Vec2::new(0.3, 0.4).clamp_length(2.5);
        assert_eq!(short, Vec2::new(0.3, 0.4));
    }

    #[test]
    fn test_affine_compose() {
        let parent = Affine::new(Vec2::new(100.0, 100.0), 2.0, 0.0);
        let child = Affine::new(Vec2::new(10.0, 0.0), 1.5, 0.0);
        let world = parent.then(&child);

        assert_eq!(world.translation, Vec2::new(120.0, 100.0));
        assert!((world.scale - 3.0).abs() < 1e-6);

        let p = world.apply(Vec2::new(1.0, 0.0));
        assert!((p.x - 123.0).abs() < 1e-4);
    }

    #[test]
    fn test_affine_rotation() {
        let rot = Affine::new(Vec2::zero(), 1.0, std::f32::consts::FRAC_PI_2);
        let p = rot.apply(Vec2::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }
}
