//! # Surface 模块
//!
//! "渲染表面就绪"通道：渲染表面初始化成功后发布自己的 [`StageHandle`]，
//! 拆除时撤回。消费者（触发分发器）订阅一次，之后直接读取自己的
//! 监听槽，不需要轮询全局状态。
//!
//! 撤回只在句柄与当前发布的是同一个时生效，旧表面的延迟拆除不会
//! 清掉新表面。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::stage::StageHandle;

type ListenerCell = Rc<RefCell<Option<StageHandle>>>;

#[derive(Default)]
struct SlotState {
    current: Option<StageHandle>,
    listeners: Vec<Weak<RefCell<Option<StageHandle>>>>,
}

impl SlotState {
    fn broadcast(&mut self) {
        let current = self.current.clone();
        self.listeners.retain(|weak| match weak.upgrade() {
            Some(cell) => {
                *cell.borrow_mut() = current.clone();
                true
            }
            None => false,
        });
    }
}

/// 渲染表面发布槽（克隆体共享同一状态）
#[derive(Clone, Default)]
pub struct SurfaceSlot {
    state: Rc<RefCell<SlotState>>,
}

impl std::fmt::Debug for SurfaceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SurfaceSlot")
            .field("ready", &state.current.is_some())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl SurfaceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发布就绪的 Stage，替换之前发布的句柄
    pub fn publish(&self, handle: StageHandle) {
        let mut state = self.state.borrow_mut();
        state.current = Some(handle);
        state.broadcast();
        debug!(listeners = state.listeners.len(), "渲染表面已发布");
    }

    /// 撤回句柄（只有与当前发布的是同一个时才生效）
    pub fn clear(&self, handle: &StageHandle) -> bool {
        let mut state = self.state.borrow_mut();
        let same = state
            .current
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, handle));
        if same {
            state.current = None;
            state.broadcast();
            debug!("渲染表面已撤回");
        }
        same
    }

    /// 当前发布的句柄
    pub fn current(&self) -> Option<StageHandle> {
        self.state.borrow().current.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().current.is_some()
    }

    /// 订阅；订阅时已发布的句柄会立即可见
    pub fn subscribe(&self) -> SurfaceListener {
        let mut state = self.state.borrow_mut();
        let cell: ListenerCell = Rc::new(RefCell::new(state.current.clone()));
        state.listeners.push(Rc::downgrade(&cell));
        SurfaceListener { cell }
    }
}

/// 订阅端，持有最近一次发布的句柄
pub struct SurfaceListener {
    cell: ListenerCell,
}

impl std::fmt::Debug for SurfaceListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceListener")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl SurfaceListener {
    /// 就绪时返回句柄，未就绪返回 `None`（不是错误）
    pub fn ready(&self) -> Option<StageHandle> {
        self.cell.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.borrow().is_some()
    }
}
