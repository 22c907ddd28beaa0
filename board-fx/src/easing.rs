//! # Easing 模块
//!
//! 缓动函数库，效果用它把线性进度映射为生长/淡出曲线。

use std::f32::consts::PI;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 二次缓入
    InQuad,
    /// 二次缓出
    OutQuad,
    /// 三次缓出
    OutCubic,
    /// 三次缓入缓出
    InOutCubic,
    /// 正弦缓入缓出
    InOutSine,
    /// 回弹缓出（略微超出 1 再回落）
    OutBack,
}

impl Easing {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度，会被限制到 0.0 - 1.0
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::OutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}

/// 把 `t` 映射到子区间 `[start, end]` 内的局部进度，区间外截断到 0 / 1
///
/// 多阶段效果用它划分阶段边界（边界是寿命的比例，不是墙钟时间）。
pub fn phase(t: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return if t >= end { 1.0 } else { 0.0 };
    }
    ((t - start) / (end - start)).clamp(0.0, 1.0)
}

/// 末段淡出：`t < from` 时为 1，之后线性降到 0
pub fn fade_tail(t: f32, from: f32) -> f32 {
    1.0 - phase(t, from, 1.0)
}
