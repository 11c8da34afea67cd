//! Deterministic demo input.
//!
//! Random-walk prices, weekly distributions and sentiment for a handful of
//! tickers, seeded from BLAKE3(ticker, seed). Same options, same input.
//! Clearly fake: meant for trying the engine without a data feed.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use incomelab_core::domain::{DatedValue, InstrumentSnapshot, SentimentScore};
use incomelab_core::portfolio::Holding;
use incomelab_core::CycleInput;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fewest trading days the demo will generate; the 28-day average needs them.
const MIN_DAYS: usize = 28;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub tickers: Vec<String>,
    pub benchmark: String,
    pub seed: u64,
    pub as_of: NaiveDate,
    /// Trading days of history per series.
    pub days: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            tickers: ["QDTE", "XDTE", "RDTE", "YMAX"].map(String::from).to_vec(),
            benchmark: "SPY".into(),
            seed: 42,
            as_of: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap_or_default(),
            days: 60,
        }
    }
}

fn rng_for(name: &str, seed: u64) -> StdRng {
    let seed_bytes = blake3::hash(format!("{name}:{seed}").as_bytes());
    StdRng::from_seed(*seed_bytes.as_bytes())
}

/// The last `n` weekdays up to and including `as_of`, oldest first.
fn trading_days(as_of: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut current = as_of;
    while days.len() < n {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current -= Duration::days(1);
    }
    days.reverse();
    days
}

fn random_walk(rng: &mut StdRng, dates: &[NaiveDate], start: f64, drift: f64, step: f64) -> Vec<DatedValue> {
    let mut price = start;
    dates
        .iter()
        .map(|&date| {
            let point = DatedValue::new(date, price);
            price *= 1.0 + drift + rng.gen_range(-step..step);
            point
        })
        .collect()
}

fn trailing_mean(series: &[DatedValue], n: usize) -> f64 {
    let tail = &series[series.len().saturating_sub(n)..];
    tail.iter().map(|p| p.value).sum::<f64>() / tail.len().max(1) as f64
}

fn sentiment_label(score: f64) -> &'static str {
    if score > 0.15 {
        "positive"
    } else if score < -0.15 {
        "negative"
    } else {
        "neutral"
    }
}

/// Build a complete demo cycle input.
pub fn generate_demo_input(opts: &DemoOptions) -> CycleInput {
    let dates = trading_days(opts.as_of, opts.days.max(MIN_DAYS));
    let mut input = CycleInput {
        as_of: Some(opts.as_of),
        ..Default::default()
    };
    let mut invested = 0.0;

    for ticker in &opts.tickers {
        let mut rng = rng_for(ticker, opts.seed);

        let start = rng.gen_range(15.0..60.0);
        let drift = rng.gen_range(-0.004..0.003);
        let prices = random_walk(&mut rng, &dates, start, drift, 0.02);

        let mut payout = start * rng.gen_range(0.008..0.015);
        let income_trend = rng.gen_range(-0.04..0.03);
        let dividends: Vec<DatedValue> = dates
            .iter()
            .filter(|d| d.weekday() == Weekday::Fri)
            .map(|&date| {
                let point = DatedValue::new(date, payout);
                payout *= 1.0 + income_trend + rng.gen_range(-0.03..0.03);
                point
            })
            .collect();

        let shares = rng.gen_range(50.0_f64..300.0).round();
        let last_payout = dividends.last().map_or(0.0, |d| d.value);
        let last_price = prices.last().map_or(start, |p| p.value);

        let snapshot = InstrumentSnapshot::new(
            ticker.clone(),
            trailing_mean(&prices, 14),
            trailing_mean(&prices, 28),
        )
        .with_monthly_income(last_payout * shares * 52.0 / 12.0)
        .with_prices(prices)
        .with_dividends(dividends);

        let score: f64 = rng.gen_range(-0.6..0.8);
        input.sentiment.insert(
            ticker.clone(),
            SentimentScore::new(score, sentiment_label(score)),
        );
        input.holdings.push(Holding {
            ticker: ticker.clone(),
            shares,
            weekly_dividend_per_share: last_payout,
            price: last_price,
        });
        invested += shares * start;
        input.instruments.push(snapshot);
    }

    let mut rng = rng_for(&opts.benchmark, opts.seed);
    input.benchmark = random_walk(&mut rng, &dates, 500.0, 0.0003, 0.012);
    input.total_invested = (!opts.tickers.is_empty()).then_some(invested);

    tracing::debug!(
        tickers = opts.tickers.len(),
        days = dates.len(),
        seed = opts.seed,
        "demo input generated"
    );
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_is_deterministic() {
        let opts = DemoOptions::default();
        assert_eq!(generate_demo_input(&opts), generate_demo_input(&opts));
    }

    #[test]
    fn seed_changes_the_data() {
        let a = generate_demo_input(&DemoOptions::default());
        let b = generate_demo_input(&DemoOptions {
            seed: 7,
            ..Default::default()
        });
        assert_ne!(a.instruments, b.instruments);
    }

    #[test]
    fn trading_days_skip_weekends() {
        // 2026-01-05 is a Monday
        let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let days = trading_days(monday, 3);
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
                monday,
            ]
        );
    }

    #[test]
    fn instruments_keep_requested_order() {
        let opts = DemoOptions {
            tickers: vec!["ZZZ".into(), "AAA".into()],
            ..Default::default()
        };
        let input = generate_demo_input(&opts);
        let tickers: Vec<_> = input.instruments.iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(tickers, ["ZZZ", "AAA"]);
        assert_eq!(input.holdings.len(), 2);
        assert!(input.instruments.iter().all(|i| i.prices.len() == 60));
    }

    #[test]
    fn short_history_is_padded_to_the_minimum() {
        let input = generate_demo_input(&DemoOptions {
            days: 5,
            ..Default::default()
        });
        assert!(input.instruments.iter().all(|i| i.prices.len() == MIN_DAYS));
    }
}
