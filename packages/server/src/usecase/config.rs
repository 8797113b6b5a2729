//! 配車マッチングの設定値

use std::time::Duration;

/// 受諾待ちの期限（作成から 30 秒）
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// 期限切れリクエストを掃除する間隔
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
/// 通知の保持期間（7 日）
pub const DEFAULT_NOTIFICATION_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// 終了したリクエストを保持する期間（1 日）
pub const DEFAULT_RIDE_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);
/// 古い通知と終了したリクエストを削除する間隔
pub const DEFAULT_RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingConfig {
    pub request_timeout: Duration,
    pub sweep_interval: Duration,
    pub notification_retention: Duration,
    /// 終了状態になってから `get_ride` で参照できる期間
    pub ride_retention: Duration,
    pub retention_sweep_interval: Duration,
}

impl MatchingConfig {
    pub fn request_timeout_millis(&self) -> i64 {
        duration_to_millis(self.request_timeout)
    }

    pub fn notification_retention_millis(&self) -> i64 {
        duration_to_millis(self.notification_retention)
    }

    pub fn ride_retention_millis(&self) -> i64 {
        duration_to_millis(self.ride_retention)
    }
}

/// 日数を `Duration` に変換する（大きすぎる値は上限で止める）
pub fn days(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(24 * 60 * 60))
}

/// 時間数を `Duration` に変換する（大きすぎる値は上限で止める）
pub fn hours(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(60 * 60))
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            notification_retention: DEFAULT_NOTIFICATION_RETENTION,
            ride_retention: DEFAULT_RIDE_RETENTION,
            retention_sweep_interval: DEFAULT_RETENTION_SWEEP_INTERVAL,
        }
    }
}

fn duration_to_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: デフォルトの期限は 30 秒、通知の保持期間は 7 日
        // given (前提条件):
        let config = MatchingConfig::default();

        // when (操作):
        let timeout = config.request_timeout_millis();
        let retention = config.notification_retention_millis();

        // then (期待する結果):
        assert_eq!(timeout, 30_000);
        assert_eq!(retention, 604_800_000);
        assert_eq!(config.ride_retention_millis(), 86_400_000);
    }

    #[test]
    fn test_day_and_hour_conversion_saturates() {
        // テスト項目: 日数・時間数の変換は桁あふれせず上限で止まる
        // given (前提条件):
        let huge = u64::MAX;

        // when (操作):
        let week = days(7);
        let saturated_days = days(huge);
        let saturated_hours = hours(huge);

        // then (期待する結果):
        assert_eq!(week, DEFAULT_NOTIFICATION_RETENTION);
        assert_eq!(hours(24), DEFAULT_RIDE_RETENTION);
        assert_eq!(saturated_days, Duration::from_secs(u64::MAX));
        assert_eq!(saturated_hours, Duration::from_secs(u64::MAX));
        let config = MatchingConfig {
            notification_retention: saturated_days,
            ..MatchingConfig::default()
        };
        assert_eq!(config.notification_retention_millis(), i64::MAX);
    }
}
