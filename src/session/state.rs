use crate::error::StoryError;
use crate::models::Clip;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What an interactive client last played back, kept across restarts.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClientSnapshot {
    /// Clips of the last spoken (free-text) reply
    pub last_speech_clips: Vec<Clip>,
    /// Clips of the last reply to a live event
    pub last_live_clips: Vec<Clip>,
    /// When either list last changed
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shared state of an interactive client.
///
/// Single writer. The hotkey flag keeps a second trigger from starting while
/// one is still running: it is dropped, not queued.
///
/// The flag lives in process memory. It matters to a long-lived client that
/// shares one `Arc<ClientState>` between its hotkey tasks; a one-shot
/// `storyloom replay` run only ever sees its own trigger.
pub struct ClientState {
    /// Where the snapshot is persisted, if anywhere
    state_path: Option<PathBuf>,
    snapshot: Arc<RwLock<ClientSnapshot>>,
    hotkey_busy: Arc<AtomicBool>,
}

/// Held while a hotkey action runs; clears the busy flag on drop.
#[derive(Debug)]
pub struct HotkeyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for HotkeyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ClientState {
    /// State that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            state_path: None,
            snapshot: Arc::new(RwLock::new(ClientSnapshot::default())),
            hotkey_busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load the snapshot from disk or start empty.
    pub fn load_or_create(path: &Path) -> Result<Self, StoryError> {
        let snapshot = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| {
                StoryError::Config(format!("Failed to read client state: {}", e))
            })?;
            serde_json::from_str(&json).map_err(|e| {
                StoryError::Config(format!("Failed to parse client state: {}", e))
            })?
        } else {
            ClientSnapshot::default()
        };

        Ok(Self {
            state_path: Some(path.to_path_buf()),
            snapshot: Arc::new(RwLock::new(snapshot)),
            hotkey_busy: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Persist the snapshot. No-op for in-memory state.
    pub async fn save(&self) -> Result<(), StoryError> {
        let Some(path) = &self.state_path else {
            return Ok(());
        };
        let snapshot = self.snapshot.read().await;
        let json = serde_json::to_string_pretty(&*snapshot).map_err(|e| {
            StoryError::Config(format!("Failed to serialize client state: {}", e))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoryError::Config(format!("Failed to create state directory: {}", e))
            })?;
        }

        std::fs::write(path, json)
            .map_err(|e| StoryError::Config(format!("Failed to write client state: {}", e)))?;
        Ok(())
    }

    pub async fn snapshot(&self) -> ClientSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn set_last_speech_clips(&self, clips: Vec<Clip>) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.last_speech_clips = clips;
        snapshot.updated_at = Some(Utc::now());
    }

    pub async fn set_last_live_clips(&self, clips: Vec<Clip>) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.last_live_clips = clips;
        snapshot.updated_at = Some(Utc::now());
    }

    pub fn is_hotkey_busy(&self) -> bool {
        self.hotkey_busy.load(Ordering::Acquire)
    }

    /// Claim the hotkey. `None` while another hotkey action is running.
    ///
    /// Safe to call from many tasks at once; at most one guard is live.
    pub fn try_begin_hotkey(&self) -> Option<HotkeyGuard> {
        self.hotkey_busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| HotkeyGuard {
                flag: Arc::clone(&self.hotkey_busy),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_hotkey_is_dropped() {
        let state = ClientState::in_memory();
        let guard = state.try_begin_hotkey().expect("first trigger");
        assert!(state.is_hotkey_busy());
        assert!(state.try_begin_hotkey().is_none());

        drop(guard);
        assert!(!state.is_hotkey_busy());
        assert!(state.try_begin_hotkey().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_triggers_yield_one_guard() {
        let state = Arc::new(ClientState::in_memory());

        let held = state.try_begin_hotkey().expect("first trigger");
        let blocked: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                tokio::spawn(async move { state.try_begin_hotkey().is_some() })
            })
            .collect();
        for task in blocked {
            assert!(!task.await.unwrap(), "trigger ran while busy");
        }
        drop(held);

        let racing: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                tokio::spawn(async move { state.try_begin_hotkey() })
            })
            .collect();
        let mut guards = Vec::new();
        for task in racing {
            guards.push(task.await.unwrap());
        }
        assert_eq!(guards.iter().filter(|g| g.is_some()).count(), 1);

        drop(guards);
        assert!(!state.is_hotkey_busy());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client_state.json");

        let state = ClientState::load_or_create(&path).unwrap();
        state
            .set_last_speech_clips(vec![Clip::speech("你好")])
            .await;
        state.save().await.unwrap();

        let reloaded = ClientState::load_or_create(&path).unwrap();
        let snapshot = reloaded.snapshot().await;
        assert_eq!(snapshot.last_speech_clips, vec![Clip::speech("你好")]);
        assert!(snapshot.last_live_clips.is_empty());
        assert!(snapshot.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_in_memory_save_is_noop() {
        let state = ClientState::in_memory();
        state.set_last_live_clips(vec![Clip::speech("x")]).await;
        state.save().await.unwrap();
    }
}
