//! InMemory Participant Repository 実装
//!
//! 接続中の参加者（学生・ドライバー）を identity をキーとする HashMap で保持します。
//! `claim_driver` はロックを保持したまま「受付可能か確認して受付停止にする」ため、
//! 同じドライバーが二つの配車を同時に引き受けることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    DriverLocation, Participant, ParticipantId, ParticipantRepository, RepositoryError,
};

/// インメモリ Participant Repository 実装
pub struct InMemoryParticipantRepository {
    participants: Arc<Mutex<HashMap<ParticipantId, Participant>>>,
}

impl InMemoryParticipantRepository {
    pub fn new() -> Self {
        Self {
            participants: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryParticipantRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &ParticipantId) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "participant",
        id: id.to_string(),
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    async fn add_participant(&self, participant: Participant) -> Result<(), RepositoryError> {
        let mut participants = self.participants.lock().await;
        if participants.contains_key(&participant.id) {
            return Err(RepositoryError::DuplicateParticipant(
                participant.id.to_string(),
            ));
        }
        participants.insert(participant.id.clone(), participant);
        Ok(())
    }

    async fn remove_participant(&self, participant_id: &ParticipantId) -> Option<Participant> {
        self.participants.lock().await.remove(participant_id)
    }

    async fn get_participant(&self, participant_id: &ParticipantId) -> Option<Participant> {
        self.participants.lock().await.get(participant_id).cloned()
    }

    async fn list_available_drivers(&self) -> Vec<Participant> {
        let participants = self.participants.lock().await;
        let mut drivers: Vec<Participant> = participants
            .values()
            .filter(|p| p.is_available_driver())
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.id.cmp(&b.id));
        drivers
    }

    async fn set_availability(
        &self,
        participant_id: &ParticipantId,
        available: bool,
    ) -> Result<Participant, RepositoryError> {
        let mut participants = self.participants.lock().await;
        let participant = participants
            .get_mut(participant_id)
            .ok_or_else(|| not_found(participant_id))?;
        participant.available = available;
        Ok(participant.clone())
    }

    async fn claim_driver(&self, participant_id: &ParticipantId) -> Result<bool, RepositoryError> {
        let mut participants = self.participants.lock().await;
        let participant = participants
            .get_mut(participant_id)
            .ok_or_else(|| not_found(participant_id))?;
        if !participant.is_available_driver() {
            return Ok(false);
        }
        participant.available = false;
        Ok(true)
    }

    async fn release_driver(&self, participant_id: &ParticipantId) -> bool {
        let mut participants = self.participants.lock().await;
        match participants.get_mut(participant_id) {
            Some(participant) if participant.is_driver() => {
                participant.available = true;
                true
            }
            _ => false,
        }
    }

    async fn update_location(
        &self,
        participant_id: &ParticipantId,
        location: DriverLocation,
    ) -> Result<(), RepositoryError> {
        let mut participants = self.participants.lock().await;
        let participant = participants
            .get_mut(participant_id)
            .ok_or_else(|| not_found(participant_id))?;
        participant.location = Some(location);
        Ok(())
    }

    async fn count_connected(&self) -> usize {
        self.participants.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, Timestamp};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryParticipantRepository の追加・削除・検索
    // - ドライバーの受付状態（claim / release）
    //
    // 【なぜこのテストが必要か】
    // - 一人のドライバーが同時に二つの配車を引き受けないことは claim_driver に依存する
    // - 二重接続の拒否が Repository でも守られることを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 参加者追加と二重追加の拒否
    // 2. 受付可能なドライバーの一覧（学生と受付停止中は除外、ID 順）
    // 3. claim_driver は一度だけ成功する
    // 4. release_driver で再び受付可能になる
    // 5. 存在しない参加者の更新（エラーケース）
    // ========================================

    fn pid(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn participant(id: &str, role: Role) -> Participant {
        Participant::new(pid(id), role, id.to_uppercase(), Timestamp::new(1_000))
    }

    #[tokio::test]
    async fn test_add_participant_rejects_duplicate() {
        // テスト項目: 同じ identity の参加者は追加できない
        // given (前提条件):
        let repo = InMemoryParticipantRepository::new();
        repo.add_participant(participant("stu-1", Role::Student))
            .await
            .unwrap();

        // when (操作):
        let result = repo
            .add_participant(participant("stu-1", Role::Student))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::DuplicateParticipant("stu-1".to_string()))
        );
        assert_eq!(repo.count_connected().await, 1);
    }

    #[tokio::test]
    async fn test_list_available_drivers() {
        // テスト項目: 受付可能なドライバーだけが ID 順に返る
        // given (前提条件):
        let repo = InMemoryParticipantRepository::new();
        repo.add_participant(participant("drv-2", Role::Driver))
            .await
            .unwrap();
        repo.add_participant(participant("drv-1", Role::Driver))
            .await
            .unwrap();
        repo.add_participant(participant("drv-3", Role::Driver))
            .await
            .unwrap();
        repo.add_participant(participant("stu-1", Role::Student))
            .await
            .unwrap();
        repo.set_availability(&pid("drv-3"), false).await.unwrap();

        // when (操作):
        let drivers = repo.list_available_drivers().await;

        // then (期待する結果):
        let ids: Vec<_> = drivers.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![pid("drv-1"), pid("drv-2")]);
    }

    #[tokio::test]
    async fn test_claim_driver_succeeds_once() {
        // テスト項目: claim_driver は受付可能なときだけ成功し、受付停止にする
        // given (前提条件):
        let repo = InMemoryParticipantRepository::new();
        repo.add_participant(participant("drv-1", Role::Driver))
            .await
            .unwrap();

        // when (操作):
        let first = repo.claim_driver(&pid("drv-1")).await;
        let second = repo.claim_driver(&pid("drv-1")).await;

        // then (期待する結果):
        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert!(repo.list_available_drivers().await.is_empty());
    }

    #[tokio::test]
    async fn test_release_driver() {
        // テスト項目: release_driver でドライバーが受付可能に戻り、学生には作用しない
        // given (前提条件):
        let repo = InMemoryParticipantRepository::new();
        repo.add_participant(participant("drv-1", Role::Driver))
            .await
            .unwrap();
        repo.add_participant(participant("stu-1", Role::Student))
            .await
            .unwrap();
        repo.claim_driver(&pid("drv-1")).await.unwrap();

        // when (操作):
        let released = repo.release_driver(&pid("drv-1")).await;
        let student = repo.release_driver(&pid("stu-1")).await;
        let missing = repo.release_driver(&pid("nobody")).await;

        // then (期待する結果):
        assert!(released);
        assert!(!student);
        assert!(!missing);
        assert_eq!(repo.list_available_drivers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_participant_fails() {
        // テスト項目: 存在しない参加者の更新は NotFound
        // given (前提条件):
        let repo = InMemoryParticipantRepository::new();

        // when (操作):
        let availability = repo.set_availability(&pid("nobody"), true).await;
        let claim = repo.claim_driver(&pid("nobody")).await;
        let location = repo
            .update_location(
                &pid("nobody"),
                DriverLocation {
                    lat: 0.0,
                    lng: 0.0,
                    address: "Hostel".to_string(),
                },
            )
            .await;

        // then (期待する結果):
        assert!(matches!(availability, Err(RepositoryError::NotFound { .. })));
        assert!(matches!(claim, Err(RepositoryError::NotFound { .. })));
        assert!(matches!(location, Err(RepositoryError::NotFound { .. })));
    }
}
