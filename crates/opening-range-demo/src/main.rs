// File: crates/opening-range-demo/src/main.rs
// Summary: Demo loads intraday OHLC CSV, runs the opening range study and renders it to PNG.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use log::{info, warn};

use opening_range_core::style;
use opening_range_core::types::MS_PER_MINUTE;
use opening_range_core::{
    Bar, BarSeries, BarSize, DataContext, OpeningRangeConfig, OpeningRangeStudy, Study, ValueKey, ValueStore,
};
use opening_range_render_skia::{Frame, RenderOptions};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // usage: opening-range-demo [bars.csv|-] [config.toml|-] [dark|light]
    let mut args = std::env::args().skip(1);
    let csv_arg = args.next().filter(|a| a != "-");
    let config_arg = args.next().filter(|a| a != "-");
    let theme = style::find(args.next().as_deref().unwrap_or("dark"));
    let config = match config_arg {
        Some(p) => OpeningRangeConfig::load_with_theme(&p, &theme).with_context(|| format!("loading config '{p}'"))?,
        None => OpeningRangeConfig::with_theme(&theme),
    };
    let instrument = config.instrument()?;

    let (minutes, stem) = match &csv_arg {
        Some(raw) => {
            let path = PathBuf::from(raw);
            let bars = load_ohlc_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
            (bars, path.file_stem().and_then(|s| s.to_str()).unwrap_or("bars").to_string())
        }
        None => {
            info!("no CSV given, generating 10 days of synthetic minute bars");
            (synthetic_minutes(10)?, "synthetic".to_string())
        }
    };
    if minutes.is_empty() {
        anyhow::bail!("no bars loaded; check headers/delimiter.");
    }
    info!("loaded {} bars for {}", minutes.len(), instrument.symbol);

    let days = minutes.resample(BarSize::DAY, &instrument);
    let opening = minutes.resample(config.opening_period, &instrument);
    info!("{} day bars, {} {} bars", days.len(), opening.len(), config.opening_period.label());

    let study = OpeningRangeStudy::new(config);
    let mut values = ValueStore::new();
    let mut ctx = DataContext {
        day_series: &days,
        opening_series: &opening,
        primary: &opening,
        instrument: &instrument,
        values: &mut values,
    };
    study.on_bar_close(&mut ctx);

    match study.latest_range() {
        Some(r) => info!(
            "{}: {} high {} low {} ({} figures)",
            study.label(),
            r.day_key,
            instrument.format(r.high),
            instrument.format(r.low),
            study.figure_count()
        ),
        None => warn!("no opening range could be computed"),
    }
    if let Some(last) = opening.last_index() {
        for key in [ValueKey::OpenHigh, ValueKey::OpenLow] {
            if let Some(v) = values.get(last, key) {
                info!("{} = {}", key.label(), instrument.format(v));
            }
        }
    }

    let frame = Frame { study: &study, bars: &opening, instrument: &instrument };
    let opts = RenderOptions { theme, ..Default::default() };
    let out = out_path(&stem);
    frame.render_to_png(&opts, &out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

/// target/out/opening_range_<stem>.png
fn out_path(stem: &str) -> PathBuf {
    let mut out = PathBuf::from("target/out");
    out.push(format!("opening_range_{stem}.png"));
    out
}

/// Load OHLC rows (time, open, high, low, close) into a bar series.
/// Bar length is the smallest gap between consecutive rows.
fn load_ohlc_csv(path: &Path) -> Result<BarSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    log::debug!("headers: {:?}", headers);
    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]).context("no time column")?;
    let i_open = idx(&["open", "o"]).context("no open column")?;
    let i_high = idx(&["high", "h"]).context("no high column")?;
    let i_low = idx(&["low", "l"]).context("no low column")?;
    let i_close = idx(&["close", "c", "adj_close", "close_price"]).context("no close column")?;

    let mut rows: Vec<(i64, [f64; 4])> = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let num = |i: usize| rec.get(i).and_then(|s| s.trim().parse::<f64>().ok());
        let t = rec.get(i_time).and_then(parse_time_ms);
        match (t, num(i_open), num(i_high), num(i_low), num(i_close)) {
            (Some(t), Some(o), Some(h), Some(l), Some(c)) => rows.push((t, [o, h, l, c])),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} unparseable rows");
    }
    rows.sort_by_key(|(t, _)| *t);
    rows.dedup_by_key(|(t, _)| *t);

    let step = rows
        .windows(2)
        .map(|w| w[1].0 - w[0].0)
        .filter(|d| *d > 0)
        .min()
        .unwrap_or(MS_PER_MINUTE);

    let mut series = BarSeries::new();
    for (t, [o, h, l, c]) in rows {
        match Bar::try_new(t, t + step, o, h, l, c) {
            Ok(bar) => series.push(bar)?,
            Err(e) => warn!("dropping row at {t}: {e}"),
        }
    }
    Ok(series)
}

/// Epoch seconds or milliseconds, RFC 3339, or "YYYY-MM-DD HH:MM[:SS]" in UTC.
fn parse_time_ms(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms vs sec
        return Some(if n > 10_i64.pow(12) { n } else { n * 1000 });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Deterministic minute bars with a daily drift, starting 2024-03-04 00:00Z.
fn synthetic_minutes(days: usize) -> Result<BarSeries> {
    const START: i64 = 1_709_510_400_000;
    let mut series = BarSeries::new();
    let mut price = 100.0_f64;
    for m in 0..(days * 1440) {
        let t = START + m as i64 * MS_PER_MINUTE;
        let x = m as f64;
        let step = (x * 0.37).sin() * 0.08 + (x / 1440.0 * 2.1).cos() * 0.02;
        let open = price;
        let close = price + step;
        let wick = ((x * 0.91).sin().abs() + 0.2) * 0.05;
        let bar = Bar::try_new(t, t + MS_PER_MINUTE, open, open.max(close) + wick, open.min(close) - wick, close)?;
        series.push(bar)?;
        price = close;
    }
    Ok(series)
}
