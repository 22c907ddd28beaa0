//! # Audio 模块
//!
//! 样本播放，使用 rodio 库实现。
//! 支持 MP3, WAV, FLAC, OGG 格式。
//!
//! 每次触发创建一个一次性 `Sink` 并分离，多个样本可以同时播放。
//! 播放失败只记录警告，不影响动画。

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use board_fx::AudioOutput;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;
use tracing::{debug, warn};

/// 音频错误
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("无法初始化音频输出: {0}")]
    Init(String),
    #[error("无法打开音频文件 {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("无法解码音频文件 {path}: {message}")]
    Decode { path: String, message: String },
    #[error("无法创建音频播放器: {0}")]
    Sink(String),
}

/// dB 增益换算为线性音量，再乘以主音量
pub fn linear_gain(gain_db: f32, master_volume: f32) -> f32 {
    let db = if gain_db.is_finite() { gain_db } else { 0.0 };
    10f32.powf(db / 20.0) * master_volume.clamp(0.0, 1.0)
}

/// 音频管理器
pub struct AudioManager {
    /// 音频输出流（必须保持存活）
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    /// 资源基础路径
    base_path: PathBuf,
    master_volume: f32,
    muted: bool,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("base_path", &self.base_path)
            .field("master_volume", &self.master_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    /// 创建新的音频管理器
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::Init(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            base_path: base_path.into(),
            master_volume: 1.0,
            muted: false,
        })
    }

    fn resolve_path(&self, url: &str) -> PathBuf {
        let path = Path::new(url);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// 播放一个样本（即发即忘）
    pub fn play_sample(&self, url: &str, gain_db: f32) -> Result<(), AudioError> {
        if self.muted {
            return Ok(());
        }

        let full_path = self.resolve_path(url);
        let display = full_path.display().to_string();
        let file = File::open(&full_path).map_err(|source| AudioError::Open {
            path: display.clone(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
            path: display,
            message: e.to_string(),
        })?;

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| AudioError::Sink(e.to_string()))?;
        sink.set_volume(linear_gain(gain_db, self.master_volume));
        sink.append(source);
        // 分离后自动播放完毕
        sink.detach();
        debug!(url, gain_db, "播放样本");
        Ok(())
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl AudioOutput for AudioManager {
    fn play(&mut self, url: &str, gain_db: f32) {
        if let Err(e) = self.play_sample(url, gain_db) {
            warn!(url, error = %e, "样本播放失败");
        }
    }
}
