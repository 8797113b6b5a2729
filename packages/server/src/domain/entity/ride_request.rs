//! 配車リクエスト

use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use crate::domain::value_object::{Fare, ParticipantId, Place, RideRequestId, Timestamp};

/// 配車リクエストのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::Declined => "declined",
            RideStatus::Expired => "expired",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    /// これ以上ステータスが変化しない状態
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RideStatus::Declined
                | RideStatus::Expired
                | RideStatus::Completed
                | RideStatus::Cancelled
        )
    }

    /// 許可されている遷移
    ///
    /// - `pending` → `accepted` / `declined` / `expired` / `cancelled`
    /// - `accepted` → `completed` / `cancelled`
    pub fn can_transition_to(&self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (
                RideStatus::Pending,
                RideStatus::Accepted
                    | RideStatus::Declined
                    | RideStatus::Expired
                    | RideStatus::Cancelled
            ) | (
                RideStatus::Accepted,
                RideStatus::Completed | RideStatus::Cancelled
            )
        )
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 配信モード
///
/// どちらのモードでもリクエストは候補ドライバー集合を持つ。
/// Targeted は候補が 1 人だけの場合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    Broadcast,
    Targeted,
}

/// 新規リクエストの作成に必要な値
#[derive(Debug, Clone, PartialEq)]
pub struct NewRideRequest {
    pub requester: ParticipantId,
    pub requester_name: String,
    pub mode: DispatchMode,
    pub candidates: BTreeSet<ParticipantId>,
    pub pickup: Place,
    pub destination: Place,
    pub quoted_fare: Fare,
    pub distance_km: f64,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRequest {
    pub id: RideRequestId,
    pub requester: ParticipantId,
    pub requester_name: String,
    pub mode: DispatchMode,
    /// リクエスト作成時に通知したドライバー
    pub candidates: BTreeSet<ParticipantId>,
    /// 辞退したドライバー（候補の部分集合）
    pub declined_by: BTreeSet<ParticipantId>,
    /// 受諾したドライバー
    pub driver: Option<ParticipantId>,
    pub pickup: Place,
    pub destination: Place,
    pub quoted_fare: Fare,
    pub distance_km: f64,
    pub final_fare: Option<Fare>,
    pub status: RideStatus,
    pub created_at: Timestamp,
    /// 最後にステータスが変化した時刻
    pub updated_at: Timestamp,
    /// accepted のサブ状態「走行中」の開始時刻
    pub started_at: Option<Timestamp>,
    pub expires_at: Timestamp,
}

impl RideRequest {
    /// `pending` 状態の新しいリクエストを作成
    pub fn new(id: RideRequestId, new: NewRideRequest) -> Self {
        Self {
            id,
            requester: new.requester,
            requester_name: new.requester_name,
            mode: new.mode,
            candidates: new.candidates,
            declined_by: BTreeSet::new(),
            driver: None,
            pickup: new.pickup,
            destination: new.destination,
            quoted_fare: new.quoted_fare,
            distance_km: new.distance_km,
            final_fare: None,
            status: RideStatus::Pending,
            created_at: new.created_at,
            updated_at: new.created_at,
            started_at: None,
            expires_at: new.expires_at,
        }
    }

    pub fn is_candidate(&self, driver: &ParticipantId) -> bool {
        self.candidates.contains(driver)
    }

    pub fn has_declined(&self, driver: &ParticipantId) -> bool {
        self.declined_by.contains(driver)
    }

    /// まだオファーが有効な候補（辞退していない候補）
    pub fn open_candidates(&self) -> Vec<ParticipantId> {
        self.candidates
            .iter()
            .filter(|id| !self.declined_by.contains(*id))
            .cloned()
            .collect()
    }

    /// 候補が 1 人以上いて、全員が辞退した
    pub fn all_candidates_declined(&self) -> bool {
        !self.candidates.is_empty() && self.candidates.iter().all(|id| self.declined_by.contains(id))
    }

    pub fn is_assigned_to(&self, driver: &ParticipantId) -> bool {
        self.driver.as_ref() == Some(driver)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == RideStatus::Accepted && self.started_at.is_some()
    }

    pub fn is_overdue(&self, now: Timestamp) -> bool {
        self.status == RideStatus::Pending && self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::RideRequestIdFactory;

    fn pid(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn create_test_request(candidates: &[&str]) -> RideRequest {
        RideRequest::new(
            RideRequestIdFactory::generate(),
            NewRideRequest {
                requester: pid("stu-1"),
                requester_name: "Nadia".to_string(),
                mode: DispatchMode::Broadcast,
                candidates: candidates.iter().map(|c| pid(c)).collect(),
                pickup: Place::new("Main Gate".to_string()).unwrap(),
                destination: Place::new("Library".to_string()).unwrap(),
                quoted_fare: Fare::new(25),
                distance_km: 0.8,
                created_at: Timestamp::new(1_000),
                expires_at: Timestamp::new(31_000),
            },
        )
    }

    #[test]
    fn test_allowed_transitions() {
        // テスト項目: pending からは 4 つの状態へ、accepted からは completed / cancelled へのみ遷移できる
        // given (前提条件):
        let pending = RideStatus::Pending;
        let accepted = RideStatus::Accepted;

        // when (操作) / then (期待する結果):
        assert!(pending.can_transition_to(RideStatus::Accepted));
        assert!(pending.can_transition_to(RideStatus::Declined));
        assert!(pending.can_transition_to(RideStatus::Expired));
        assert!(pending.can_transition_to(RideStatus::Cancelled));
        assert!(!pending.can_transition_to(RideStatus::Completed));
        assert!(accepted.can_transition_to(RideStatus::Completed));
        assert!(accepted.can_transition_to(RideStatus::Cancelled));
        assert!(!accepted.can_transition_to(RideStatus::Expired));
        assert!(!accepted.can_transition_to(RideStatus::Accepted));
    }

    #[test]
    fn test_terminal_statuses_never_transition() {
        // テスト項目: 終端ステータスからはどこにも遷移できない
        // given (前提条件):
        let terminals = [
            RideStatus::Declined,
            RideStatus::Expired,
            RideStatus::Completed,
            RideStatus::Cancelled,
        ];
        let all = [
            RideStatus::Pending,
            RideStatus::Accepted,
            RideStatus::Declined,
            RideStatus::Expired,
            RideStatus::Completed,
            RideStatus::Cancelled,
        ];

        // when (操作) / then (期待する結果):
        for from in terminals {
            assert!(from.is_terminal());
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_new_request_is_pending_with_open_candidates() {
        // テスト項目: 新規リクエストは pending で、全候補のオファーが有効
        // given (前提条件):
        let request = create_test_request(&["drv-1", "drv-2"]);

        // when (操作):
        let open = request.open_candidates();

        // then (期待する結果):
        assert_eq!(request.status, RideStatus::Pending);
        assert_eq!(request.updated_at, request.created_at);
        assert_eq!(open, vec![pid("drv-1"), pid("drv-2")]);
        assert!(!request.all_candidates_declined());
    }

    #[test]
    fn test_all_candidates_declined() {
        // テスト項目: 全候補が辞退した場合のみ all_candidates_declined が true
        // given (前提条件):
        let mut request = create_test_request(&["drv-1", "drv-2"]);

        // when (操作):
        request.declined_by.insert(pid("drv-1"));
        let after_one = request.all_candidates_declined();
        request.declined_by.insert(pid("drv-2"));
        let after_two = request.all_candidates_declined();

        // then (期待する結果):
        assert!(!after_one);
        assert!(after_two);
        assert!(request.open_candidates().is_empty());
    }

    #[test]
    fn test_request_without_candidates_is_never_all_declined() {
        // テスト項目: 候補がいないリクエストは「全員辞退」とみなさない
        // given (前提条件):
        let request = create_test_request(&[]);

        // when (操作):
        let result = request.all_candidates_declined();

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_is_overdue() {
        // テスト項目: 期限を過ぎた pending リクエストのみ overdue と判定される
        // given (前提条件):
        let mut request = create_test_request(&["drv-1"]);

        // when (操作) / then (期待する結果):
        assert!(!request.is_overdue(Timestamp::new(30_999)));
        assert!(request.is_overdue(Timestamp::new(31_000)));
        request.status = RideStatus::Accepted;
        assert!(!request.is_overdue(Timestamp::new(99_000)));
    }
}
