use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// One weekday's trading session, in the exchange's local time. `open > close` (or
/// either side missing) expresses an overnight or boundary session, matching a real
/// futures exchange's near-continuous schedule.
#[derive(Debug, Clone, Copy)]
pub struct DaySession {
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
}

impl DaySession {
    pub const CLOSED: DaySession = DaySession { open: None, close: None };

    pub fn is_trading_time(&self, time: NaiveTime) -> bool {
        match (self.open, self.close) {
            (Some(open), Some(close)) if close > open => time >= open && time < close,
            (Some(open), Some(close)) => time >= open || time < close,
            (Some(open), None) => time >= open,
            (None, Some(close)) => time < close,
            (None, None) => false,
        }
    }
}

/// A full weekly schedule plus an optional extended-hours overlay, grounded on a real
/// exchange's calendar. `is_market_open` answers the regular session only; callers that
/// accept extended hours (per `SubscriptionDataConfig::extended_market_hours`) should
/// check `is_extended_open` as well.
#[derive(Clone, Debug)]
pub struct TradingHours {
    pub timezone: Tz,
    pub sunday: DaySession,
    pub monday: DaySession,
    pub tuesday: DaySession,
    pub wednesday: DaySession,
    pub thursday: DaySession,
    pub friday: DaySession,
    pub saturday: DaySession,
    pub extended_sunday: DaySession,
    pub extended_monday: DaySession,
    pub extended_tuesday: DaySession,
    pub extended_wednesday: DaySession,
    pub extended_thursday: DaySession,
    pub extended_friday: DaySession,
    pub extended_saturday: DaySession,
}

impl TradingHours {
    fn session_for(&self, weekday: Weekday) -> &DaySession {
        match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        }
    }

    fn extended_session_for(&self, weekday: Weekday) -> &DaySession {
        match weekday {
            Weekday::Sun => &self.extended_sunday,
            Weekday::Mon => &self.extended_monday,
            Weekday::Tue => &self.extended_tuesday,
            Weekday::Wed => &self.extended_wednesday,
            Weekday::Thu => &self.extended_thursday,
            Weekday::Fri => &self.extended_friday,
            Weekday::Sat => &self.extended_saturday,
        }
    }

    pub fn is_market_open(&self, current_time: DateTime<Utc>) -> bool {
        let market_time = current_time.with_timezone(&self.timezone);
        self.session_for(market_time.weekday()).is_trading_time(market_time.time())
    }

    pub fn is_extended_open(&self, current_time: DateTime<Utc>) -> bool {
        let market_time = current_time.with_timezone(&self.timezone);
        let weekday = market_time.weekday();
        let time = market_time.time();
        self.session_for(weekday).is_trading_time(time) || self.extended_session_for(weekday).is_trading_time(time)
    }

    /// Whether `current_time` is tradable under the given subscription's extended-hours
    /// flag — the single call site fill-forward and the synchronizer use.
    pub fn is_open_for(&self, current_time: DateTime<Utc>, extended_market_hours: bool) -> bool {
        if extended_market_hours {
            self.is_extended_open(current_time)
        } else {
            self.is_market_open(current_time)
        }
    }

    pub fn seconds_until_close(&self, current_time: DateTime<Utc>) -> Option<i64> {
        let market_time = current_time.with_timezone(&self.timezone);
        let current_time_naive = market_time.time();
        let current_session = self.session_for(market_time.weekday());

        match (current_session.open, current_session.close) {
            (Some(open), Some(close)) if close > open => {
                if current_time_naive >= open && current_time_naive < close {
                    Some(close.num_seconds_from_midnight() as i64 - current_time_naive.num_seconds_from_midnight() as i64)
                } else {
                    None
                }
            }
            (Some(open), Some(close)) => {
                if current_time_naive >= open || current_time_naive < close {
                    let current_secs = current_time_naive.num_seconds_from_midnight() as i64;
                    let close_secs = close.num_seconds_from_midnight() as i64;
                    let until_close = if current_time_naive < close {
                        close_secs - current_secs
                    } else {
                        (86400 - current_secs) + close_secs
                    };
                    Some(until_close)
                } else {
                    None
                }
            }
            (Some(_), None) => None,
            (None, Some(close)) => {
                if current_time_naive < close {
                    Some(close.num_seconds_from_midnight() as i64 - current_time_naive.num_seconds_from_midnight() as i64)
                } else {
                    None
                }
            }
            (None, None) => None,
        }
    }

    /// The next instant at or after `from` that the regular session is open. Walks
    /// forward a minute at a time, capped at two weeks, which is generous for any
    /// weekday/weekend/holiday-free calendar (holiday closures are a distinct, explicit
    /// per-date list the corporate-actions layer consults separately, not modeled here).
    pub fn next_market_open(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = from;
        let step = Duration::minutes(1);
        let limit = from + Duration::weeks(2);
        if self.is_market_open(candidate) {
            return Some(candidate);
        }
        while candidate < limit {
            candidate = candidate + step;
            if self.is_market_open(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Chicago;

    fn cme_hours() -> TradingHours {
        TradingHours {
            timezone: Chicago,
            sunday: DaySession { open: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()), close: None },
            monday: DaySession { open: None, close: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()) },
            tuesday: DaySession {
                open: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
                close: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
            },
            wednesday: DaySession {
                open: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
                close: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
            },
            thursday: DaySession {
                open: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
                close: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
            },
            friday: DaySession { open: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()), close: None },
            saturday: DaySession::CLOSED,
            extended_sunday: DaySession::CLOSED,
            extended_monday: DaySession::CLOSED,
            extended_tuesday: DaySession::CLOSED,
            extended_wednesday: DaySession::CLOSED,
            extended_thursday: DaySession::CLOSED,
            extended_friday: DaySession::CLOSED,
            extended_saturday: DaySession::CLOSED,
        }
    }

    #[test]
    fn sunday_monday_cycle() {
        let trading_hours = cme_hours();
        let test_time = Chicago.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap().to_utc();
        assert!(trading_hours.is_market_open(test_time));
        assert_eq!(trading_hours.seconds_until_close(test_time), Some(25200));

        let test_time = Chicago.with_ymd_and_hms(2024, 1, 8, 16, 0, 0).unwrap().to_utc();
        assert!(!trading_hours.is_market_open(test_time));
        assert_eq!(trading_hours.seconds_until_close(test_time), None);
    }

    #[test]
    fn saturday_is_always_closed() {
        let trading_hours = cme_hours();
        let test_time = Chicago.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap().to_utc();
        assert!(!trading_hours.is_market_open(test_time));
    }

    #[test]
    fn next_market_open_skips_weekend() {
        let trading_hours = cme_hours();
        let saturday_noon = Chicago.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap().to_utc();
        let opened = trading_hours.next_market_open(saturday_noon).expect("should find an open");
        assert!(trading_hours.is_market_open(opened));
        assert!(opened > saturday_noon);
    }
}
