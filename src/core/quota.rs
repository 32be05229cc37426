use crate::domain::model::Plan;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const FREE_DAILY: u32 = 3;
pub const PLUS_DAILY: u32 = 30;
pub const PRO_DAILY: u32 = 200;

/// 每個方案的每日預測次數上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub free: u32,
    pub plus: u32,
    pub pro: u32,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            free: FREE_DAILY,
            plus: PLUS_DAILY,
            pro: PRO_DAILY,
        }
    }
}

impl PlanLimits {
    pub fn daily_limit(&self, plan: Plan) -> u32 {
        match plan {
            Plan::Free => self.free,
            Plan::Plus => self.plus,
            Plan::Pro => self.pro,
        }
    }
}

/// Midnight UTC of the day containing `now`.
pub fn day_start_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed { remaining: u32 },
    Exceeded { limit: u32 },
}

impl QuotaDecision {
    pub fn check(used: u32, limit: u32) -> Self {
        if used >= limit {
            QuotaDecision::Exceeded { limit }
        } else {
            QuotaDecision::Allowed {
                remaining: limit - used,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_limits() {
        let limits = PlanLimits::default();
        assert_eq!(limits.daily_limit(Plan::Free), 3);
        assert_eq!(limits.daily_limit(Plan::Plus), 30);
        assert_eq!(limits.daily_limit(Plan::Pro), 200);
    }

    #[test]
    fn test_day_start_utc() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 17, 45, 12).unwrap();
        let start = day_start_utc(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_quota_decision_boundary() {
        assert_eq!(
            QuotaDecision::check(2, 3),
            QuotaDecision::Allowed { remaining: 1 }
        );
        assert_eq!(QuotaDecision::check(3, 3), QuotaDecision::Exceeded { limit: 3 });
        assert_eq!(QuotaDecision::check(7, 3), QuotaDecision::Exceeded { limit: 3 });
    }
}
