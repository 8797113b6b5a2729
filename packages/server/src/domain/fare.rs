//! 運賃見積もりのインターフェース

use async_trait::async_trait;

use super::{Fare, Place};

/// 運賃と距離の見積もり結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareQuote {
    pub fare: Fare,
    pub distance_km: f64,
}

/// 乗車地と目的地から運賃を見積もる外部コンポーネント
///
/// 見積もりは対称（A→B と B→A は同じ値）で、未知の組み合わせにも必ず値を返す。
#[async_trait]
pub trait FareEstimator: Send + Sync {
    async fn estimate_fare(&self, pickup: &Place, destination: &Place) -> FareQuote;
}
