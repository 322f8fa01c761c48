use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::state::SessionState;
use crate::error::AppError;

/// 세션 하나에 대한 핸들
///
/// 세션별 Mutex로 한 세션에서 동시에 하나의 모델 호출만 진행되도록 합니다.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// 인메모리 세션 저장소
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// 새 세션 생성
    ///
    /// 생성 시 만료된 세션을 함께 정리합니다.
    pub async fn create(&self) -> SessionHandle {
        self.purge_expired().await;

        let state = SessionState::new();
        let id = state.id;
        let handle = Arc::new(Mutex::new(state));

        self.sessions.write().await.insert(id, Arc::clone(&handle));
        metrics::gauge!("prompt_sessions_active").increment(1.0);
        tracing::info!(session_id = %id, "Session created");

        handle
    }

    /// 세션 조회
    ///
    /// TTL이 지난 유휴 세션은 제거하고 없는 세션으로 취급합니다.
    pub async fn get(&self, id: &str) -> Result<SessionHandle, AppError> {
        let uuid = parse_id(id)?;
        let handle = self
            .sessions
            .read()
            .await
            .get(&uuid)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;

        let expired = handle
            .try_lock()
            .map(|state| self.is_expired(&state, Utc::now()))
            .unwrap_or(false);
        if expired {
            if self.sessions.write().await.remove(&uuid).is_some() {
                metrics::gauge!("prompt_sessions_active").decrement(1.0);
                tracing::info!(session_id = %uuid, "Expired session removed on access");
            }
            return Err(AppError::SessionNotFound(id.to_string()));
        }

        Ok(handle)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let uuid = parse_id(id)?;
        match self.sessions.write().await.remove(&uuid) {
            Some(_) => {
                metrics::gauge!("prompt_sessions_active").decrement(1.0);
                tracing::info!(session_id = %uuid, "Session removed");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id.to_string())),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// TTL이 지난 유휴 세션 제거
    ///
    /// 처리 중(잠금 상태)인 세션은 건너뜁니다.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(state) => !self.is_expired(&state, now),
            Err(_) => true,
        });

        let purged = before - sessions.len();
        if purged > 0 {
            metrics::gauge!("prompt_sessions_active").decrement(purged as f64);
            tracing::info!(purged = purged, "Expired sessions purged");
        }
        purged
    }
}

impl SessionStore {
    fn is_expired(&self, state: &SessionState, now: DateTime<Utc>) -> bool {
        (now - state.updated_at)
            .to_std()
            .map(|idle| idle > self.ttl)
            .unwrap_or(false)
    }
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::SessionNotFound(id.to_string()))
}
