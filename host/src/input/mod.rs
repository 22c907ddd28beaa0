//! # Input 模块
//!
//! 把指针位置映射到 4x4 触发区域。
//!
//! 渲染表面与看板共用同一块区域（窗口减去顶部工具栏），坐标统一使用
//! 逻辑像素；效果在指针位置（相对渲染表面）生成。

/// 每行/列的区域数
pub const GRID_SIZE: usize = 4;
/// 区域总数
pub const ZONE_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// 看板布局
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    /// 工具栏高度（看板从此处开始）
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// 区域矩形（相对渲染表面）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoardLayout {
    /// 由窗口逻辑尺寸与工具栏高度构造
    pub fn new(window_width: f32, window_height: f32, chrome_height: f32) -> Self {
        Self {
            top: chrome_height,
            width: window_width.max(0.0),
            height: (window_height - chrome_height).max(0.0),
        }
    }

    /// 窗口坐标转换为渲染表面坐标；落在工具栏或窗口外时返回 `None`
    pub fn to_surface(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        let sy = y - self.top;
        if x < 0.0 || sy < 0.0 || x >= self.width || sy >= self.height {
            return None;
        }
        Some((x, sy))
    }

    /// 渲染表面坐标所在的区域（行优先）
    pub fn zone_at(&self, x: f32, y: f32) -> Option<usize> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        if x < 0.0 || y < 0.0 || x >= self.width || y >= self.height {
            return None;
        }
        let col = ((x / self.width) * GRID_SIZE as f32) as usize;
        let row = ((y / self.height) * GRID_SIZE as f32) as usize;
        Some(row.min(GRID_SIZE - 1) * GRID_SIZE + col.min(GRID_SIZE - 1))
    }

    /// 区域矩形（渲染表面坐标）
    pub fn zone_rect(&self, index: usize) -> Option<ZoneRect> {
        if index >= ZONE_COUNT {
            return None;
        }
        let w = self.width / GRID_SIZE as f32;
        let h = self.height / GRID_SIZE as f32;
        Some(ZoneRect {
            x: (index % GRID_SIZE) as f32 * w,
            y: (index / GRID_SIZE) as f32 * h,
            width: w,
            height: h,
        })
    }
}

/// 指针状态（记录最近位置，按下时产出触发）
#[derive(Debug, Default)]
pub struct PointerState {
    position: Option<(f32, f32)>,
}

/// 一次触发：区域索引 + 渲染表面坐标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub zone: usize,
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录指针移动（窗口逻辑坐标）
    pub fn moved(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
    }

    pub fn left(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    /// 指针按下：命中区域时返回触发
    pub fn pressed(&self, layout: &BoardLayout) -> Option<Tap> {
        let (wx, wy) = self.position?;
        let (x, y) = layout.to_surface(wx, wy)?;
        let zone = layout.zone_at(x, y)?;
        Some(Tap { zone, x, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BoardLayout {
        BoardLayout::new(400.0, 456.0, 56.0)
    }

    #[test]
    fn test_layout_subtracts_chrome() {
        let l = layout();
        assert_eq!(l.height, 400.0);
        assert_eq!(l.to_surface(10.0, 20.0), None);
        assert_eq!(l.to_surface(10.0, 66.0), Some((10.0, 10.0)));
    }

    #[test]
    fn test_zone_at_corners() {
        let l = layout();
        assert_eq!(l.zone_at(0.0, 0.0), Some(0));
        assert_eq!(l.zone_at(399.0, 0.0), Some(3));
        assert_eq!(l.zone_at(0.0, 399.0), Some(12));
        assert_eq!(l.zone_at(399.0, 399.0), Some(15));
        assert_eq!(l.zone_at(150.0, 250.0), Some(9));
        assert_eq!(l.zone_at(400.0, 0.0), None);
    }

    #[test]
    fn test_zone_rect() {
        let r = layout().zone_rect(5).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (100.0, 100.0, 100.0, 100.0));
        assert!(layout().zone_rect(16).is_none());
    }

    #[test]
    fn test_pointer_press() {
        let mut pointer = PointerState::new();
        let l = layout();
        assert!(pointer.pressed(&l).is_none());

        pointer.moved(250.0, 56.0 + 120.0);
        assert_eq!(
            pointer.pressed(&l),
            Some(Tap {
                zone: 6,
                x: 250.0,
                y: 120.0
            })
        );

        pointer.left();
        assert!(pointer.pressed(&l).is_none());
    }

    #[test]
    fn test_empty_layout() {
        let l = BoardLayout::new(300.0, 40.0, 56.0);
        assert_eq!(l.height, 0.0);
        assert_eq!(l.zone_at(0.0, 0.0), None);
    }
}
