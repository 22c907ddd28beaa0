//! # Board 模块
//!
//! 看板文件轮询：按间隔检查修改时间，变化时重新解析。
//! 解析失败保留旧看板，只记录警告。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use board_fx::{BoardConfig, BoardError};
use tracing::{info, warn};

/// 看板文件监视器
#[derive(Debug)]
pub struct BoardWatcher {
    path: PathBuf,
    interval: Duration,
    last_check: Option<Instant>,
    last_modified: Option<SystemTime>,
}

impl BoardWatcher {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            last_check: None,
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// 立即加载（启动时使用）
    pub fn load_now(&mut self) -> Result<BoardConfig, BoardError> {
        self.last_modified = self.modified();
        let board = BoardConfig::load(&self.path)?;
        info!(path = ?self.path, zones = board.zones.len(), "看板加载成功");
        Ok(board)
    }

    /// 轮询：间隔未到或文件未变化时返回 `None`
    pub fn poll(&mut self, now: Instant) -> Option<BoardConfig> {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_check = Some(now);

        let modified = self.modified()?;
        if self.last_modified == Some(modified) {
            return None;
        }
        self.last_modified = Some(modified);

        match BoardConfig::load(&self.path) {
            Ok(board) => {
                info!(path = ?self.path, zones = board.zones.len(), "看板已重新加载");
                Some(board)
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "看板重新加载失败，保留旧配置");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"{ "zones": [{ "animationKey": "burst" }] }"#;

    #[test]
    fn test_load_now() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, BOARD).unwrap();

        let mut watcher = BoardWatcher::new(&path, Duration::from_secs(5));
        let board = watcher.load_now().unwrap();
        assert_eq!(board.zones[0].animation_key, "burst");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = BoardWatcher::new(dir.path().join("none.json"), Duration::ZERO);
        assert!(matches!(watcher.load_now(), Err(BoardError::Io { .. })));
        assert!(watcher.poll(Instant::now()).is_none());
    }

    #[test]
    fn test_poll_respects_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, BOARD).unwrap();

        let mut watcher = BoardWatcher::new(&path, Duration::from_secs(60));
        let start = Instant::now();
        // 首次轮询：尚未记录修改时间，视为变化
        assert!(watcher.poll(start).is_some());
        // 间隔内不再检查
        assert!(watcher.poll(start + Duration::from_secs(1)).is_none());
        // 间隔已过但文件未变
        assert!(watcher.poll(start + Duration::from_secs(61)).is_none());
    }

    #[test]
    fn test_poll_keeps_old_board_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{ not json").unwrap();

        let mut watcher = BoardWatcher::new(&path, Duration::ZERO);
        assert!(watcher.poll(Instant::now()).is_none());
    }
}
