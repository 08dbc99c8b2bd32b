use chrono::{NaiveTime, TimeZone, Utc};
use feed_engine::calendar::{DaySession, TradingHours};
use feed_engine::data::base_data::{BaseDataEnum, Tick};
use feed_engine::data::resolution::{Resolution, SecurityType, TickType};
use feed_engine::data::subscription_config::{BaseDataType, SubscriptionDataConfig};
use feed_engine::data::symbol::Symbol;
use feed_engine::feed::DataFeed;
use rust_decimal_macros::dec;

/// Open all day every weekday, closed on the weekend, no extended session. Enough to
/// exercise the fill-forward gate without chasing a real exchange's exact hours.
fn weekday_hours() -> TradingHours {
    let open_all_day = DaySession { open: Some(NaiveTime::MIN), close: None };
    TradingHours {
        timezone: chrono_tz::America::Chicago,
        sunday: DaySession::CLOSED,
        monday: open_all_day,
        tuesday: open_all_day,
        wednesday: open_all_day,
        thursday: open_all_day,
        friday: open_all_day,
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

fn tick(symbol: &Symbol, time: chrono::DateTime<Utc>, price: rust_decimal::Decimal) -> BaseDataEnum {
    BaseDataEnum::Tick(Tick {
        symbol: symbol.clone(),
        price,
        quantity: dec!(1),
        tick_type: TickType::Trade,
        time,
        suspicious: false,
    })
}

/// Two symbols, one minute-bar subscription each, that both go quiet after a single
/// print. The synchronizer must keep their frontiers in step, and once the next
/// period elapses with nothing new, fill-forward must carry each one's last close
/// forward rather than let the subscription silently stall.
#[test]
fn frontier_orders_slices_and_fill_forward_covers_a_quiet_period() {
    // 2024-01-02 is a Tuesday.
    let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
    let mut feed = DataFeed::new(t0, 10);

    let a = Symbol::new("AAA", SecurityType::Equity, "NASDAQ");
    let b = Symbol::new("BBB", SecurityType::Equity, "NASDAQ");
    feed.register_calendar(a.clone(), weekday_hours());
    feed.register_calendar(b.clone(), weekday_hours());

    let a_config = SubscriptionDataConfig::new(a.clone(), BaseDataType::TradeBars, Resolution::Minutes(1), TickType::Trade);
    let b_config = SubscriptionDataConfig::new(b.clone(), BaseDataType::TradeBars, Resolution::Minutes(1), TickType::Trade);
    feed.add_subscription(a_config.clone()).unwrap();
    feed.add_subscription(b_config.clone()).unwrap();

    feed.ingest(&tick(&a, t0, dec!(100)), &a_config);
    feed.ingest(&tick(&b, t0, dec!(50)), &b_config);

    // Neither symbol prints again: the period boundary alone closes minute 0 for both.
    feed.advance_time(t0 + chrono::Duration::minutes(1));
    let first = feed.pull_slice().unwrap().unwrap();
    assert_eq!(first.utc_time, Some(t0 + chrono::Duration::minutes(1)));
    let a_last = first.get(&a).and_then(|bars| bars.last()).expect("A's minute-0 bar should be ready");
    let b_last = first.get(&b).and_then(|bars| bars.last()).expect("B's minute-0 bar should be ready");
    match (a_last, b_last) {
        (BaseDataEnum::TradeBar(a_bar), BaseDataEnum::TradeBar(b_bar)) => {
            assert_eq!(a_bar.close, dec!(100));
            assert_eq!(b_bar.close, dec!(50));
        }
        other => panic!("expected trade bars, got {:?}", other),
    }

    // Still quiet: fill-forward synthesizes a flat bar for minute 1 internally, but it
    // isn't queued until the boundary after it closes — so nothing is ready yet.
    feed.advance_time(t0 + chrono::Duration::minutes(2));
    assert!(feed.pull_slice().unwrap().is_none());

    // That synthetic minute-1 bar now closes and reaches both subscriptions, flat at
    // each one's last real close, since the market never stopped being open.
    feed.advance_time(t0 + chrono::Duration::minutes(3));
    let second = feed.pull_slice().unwrap().unwrap();
    assert_eq!(second.utc_time, Some(t0 + chrono::Duration::minutes(3)));
    match second.get(&a).and_then(|bars| bars.last()) {
        Some(BaseDataEnum::TradeBar(bar)) => {
            assert!(bar.is_fill_forward);
            assert_eq!(bar.close, dec!(100));
        }
        other => panic!("expected a fill-forward trade bar for A, got {:?}", other),
    }
    match second.get(&b).and_then(|bars| bars.last()) {
        Some(BaseDataEnum::TradeBar(bar)) => {
            assert!(bar.is_fill_forward);
            assert_eq!(bar.close, dec!(50));
        }
        other => panic!("expected a fill-forward trade bar for B, got {:?}", other),
    }
}

/// A weekend boundary must not synthesize a fill-forward bar: the quiet period is the
/// market being closed, not a feed outage, so the subscription should simply have
/// nothing ready rather than a flat bar stamped through Saturday.
#[test]
fn fill_forward_does_not_bridge_a_market_closure() {
    // 2024-01-05 is a Friday; trading stops at midnight local (Chicago) under our
    // all-day weekday session, so the Saturday boundary is genuinely closed.
    let friday_close = Utc.with_ymd_and_hms(2024, 1, 6, 5, 59, 0).unwrap();
    let mut feed = DataFeed::new(friday_close, 10);

    let symbol = Symbol::new("AAA", SecurityType::Equity, "NASDAQ");
    feed.register_calendar(symbol.clone(), weekday_hours());
    let config = SubscriptionDataConfig::new(symbol.clone(), BaseDataType::TradeBars, Resolution::Minutes(1), TickType::Trade);
    feed.add_subscription(config.clone()).unwrap();

    feed.ingest(&tick(&symbol, friday_close, dec!(100)), &config);
    // Closes the last bar of the week.
    feed.advance_time(friday_close + chrono::Duration::minutes(1));
    let last_friday_slice = feed.pull_slice().unwrap().unwrap();
    assert!(last_friday_slice.get(&symbol).is_some());

    // The next minute boundary falls on Saturday in Chicago (the market's calendar),
    // which is closed all day: no fill-forward bar should appear for it.
    feed.advance_time(friday_close + chrono::Duration::minutes(2));
    let weekend_slice = feed.pull_slice().unwrap();
    assert!(weekend_slice.map(|s| s.is_empty()).unwrap_or(true));
}

/// `go_live` is one-way: once a feed has switched off warmup, the synchronizer starts
/// consulting the wall clock instead of only the subscriptions' own frontier.
#[test]
fn go_live_switches_the_clock_irreversibly() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
    let mut feed = DataFeed::new(t0, 10);
    assert!(!feed.is_live());
    feed.go_live();
    assert!(feed.is_live());
}
