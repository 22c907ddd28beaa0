//! # Perf 模块
//!
//! 设备档位检测与缩放表，是"移动端降级"的唯一来源。
//!
//! 档位判断是粗粒度的：UA 命中移动端关键字 **或** 视口宽度小于
//! [`MOBILE_VIEWPORT_WIDTH`] 即视为移动端。

/// 视口宽度阈值（逻辑像素），低于此值视为移动端
pub const MOBILE_VIEWPORT_WIDTH: f32 = 768.0;

/// 移动端 UA 关键字（大小写不敏感）
const MOBILE_UA_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// 档位探测输入
#[derive(Debug, Clone, Default)]
pub struct TierProbe<'a> {
    /// User-Agent（桌面宿主通常没有）
    pub user_agent: Option<&'a str>,
    /// 视口宽度（逻辑像素）
    pub viewport_width: f32,
}

/// 设备档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceTier {
    pub is_mobile: bool,
}

impl DeviceTier {
    pub const DESKTOP: DeviceTier = DeviceTier { is_mobile: false };
    pub const MOBILE: DeviceTier = DeviceTier { is_mobile: true };
}

/// 探测设备档位（UA 与视口宽度取或）
pub fn detect_tier(probe: &TierProbe<'_>) -> DeviceTier {
    let ua_mobile = probe.user_agent.is_some_and(|ua| {
        let ua = ua.to_lowercase();
        MOBILE_UA_TOKENS.iter().any(|token| ua.contains(token))
    });
    let narrow = probe.viewport_width > 0.0 && probe.viewport_width < MOBILE_VIEWPORT_WIDTH;

    DeviceTier {
        is_mobile: ua_mobile || narrow,
    }
}

/// 档位对应的缩放表
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfScaling {
    pub tier: DeviceTier,
    /// 粒子数量倍率
    pub particle_scale: f32,
    /// 几何复杂度倍率（层数、花瓣数、分支数等）
    pub complexity_scale: f32,
    /// 单个实例的粒子上限
    pub max_particles: usize,
}

impl Default for PerfScaling {
    fn default() -> Self {
        scaling_for(DeviceTier::DESKTOP)
    }
}

/// 获取档位的缩放表
pub fn scaling_for(tier: DeviceTier) -> PerfScaling {
    if tier.is_mobile {
        PerfScaling {
            tier,
            particle_scale: 0.3,
            complexity_scale: 0.4,
            max_particles: 20,
        }
    } else {
        PerfScaling {
            tier,
            particle_scale: 1.0,
            complexity_scale: 1.0,
            max_particles: 120,
        }
    }
}

impl PerfScaling {
    /// 是否应走廉价更新路径
    pub fn is_mobile(&self) -> bool {
        self.tier.is_mobile
    }

    /// 缩放粒子数量
    ///
    /// 配置为 0 时保持 0；否则至少 1 个，且不超过 `max_particles`。
    pub fn scale_count(&self, requested: usize) -> usize {
        if requested == 0 {
            return 0;
        }
        let scaled = (requested as f32 * self.particle_scale).round() as usize;
        scaled.clamp(1, self.max_particles)
    }

    /// 缩放几何复杂度（层数、分支等），配置为 0 时保持 0，否则至少 1
    pub fn scale_complexity(&self, requested: usize) -> usize {
        if requested == 0 {
            return 0;
        }
        ((requested as f32 * self.complexity_scale).round() as usize).max(1)
    }
}
