use egostrategy_growth::config::Config;
use egostrategy_growth::data_provider::SnapshotProvider;
use egostrategy_growth::models::growth::GrowthSnapshot;
use egostrategy_growth::services::data_service::DataService;

use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = App::new("GrowthTracker")
        .version(env!("CARGO_PKG_VERSION"))
        .author("EgoStrategy Team")
        .about("Cumulative growth of tracked A-share stocks since the baseline date")
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Per-request timeout in seconds")
                .takes_value(true)
                .default_value("15"),
        )
        .arg(
            Arg::with_name("concurrency")
                .long("concurrency")
                .value_name("N")
                .help("Maximum number of concurrent history requests")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Fetch once and print growth cards")
                .arg(
                    Arg::with_name("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .takes_value(false),
                )
                .arg(
                    Arg::with_name("history")
                        .long("history")
                        .value_name("DAYS")
                        .help("Also print the last N daily observations per stock")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("watch")
                .about("Refresh periodically, keeping only the newest result")
                .arg(
                    Arg::with_name("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECS")
                        .help("Seconds between refreshes")
                        .takes_value(true)
                        .default_value("60"),
                ),
        )
        .get_matches();

    let config = build_config(&matches)?;
    let service = Arc::new(DataService::eastmoney(config));

    match matches.subcommand() {
        Some(("watch", sub)) => {
            let interval = sub.value_of("interval").unwrap_or("60").parse::<u64>()?;
            watch(service, Duration::from_secs(interval.max(1))).await;
        }
        Some(("show", sub)) => {
            let history = sub.value_of("history").map(str::parse::<usize>).transpose()?;
            let snapshot = service.refresh().await?;
            if sub.is_present("json") {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot, history.unwrap_or(0));
            }
        }
        _ => {
            let snapshot = service.refresh().await?;
            print_snapshot(&snapshot, 0);
        }
    }

    Ok(())
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let timeout = matches.value_of("timeout").unwrap_or("15").parse::<u64>()?;
    let mut config = Config::new().with_request_timeout(Duration::from_secs(timeout));
    if let Some(concurrency) = matches.value_of("concurrency") {
        config = config.with_max_concurrency(concurrency.parse::<usize>()?);
    }
    info!("Baseline {}, timeout {:?}, concurrency {}",
          config.baseline_date, config.request_timeout, config.max_concurrency);
    Ok(config)
}

/// 定时刷新；每次刷新独立运行，只有代次最新的结果会被展示
async fn watch(service: Arc<DataService>, interval: Duration) {
    let provider = Arc::new(SnapshotProvider::new());
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let service = service.clone();
                let provider = provider.clone();
                tokio::spawn(async move {
                    match service.refresh().await {
                        Ok(snapshot) => {
                            if provider.apply(snapshot) {
                                if let Some(latest) = provider.latest() {
                                    print_snapshot(&latest, 0);
                                }
                            }
                        }
                        Err(e) => error!("Refresh failed: {}", e),
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping after generation {}", service.current_generation());
                break;
            }
        }
    }
}

fn print_snapshot(snapshot: &GrowthSnapshot, history: usize) {
    println!("{:-<64}", "");
    println!("累计涨幅（基准日起）  刷新时间 {}  #{}",
             snapshot.refreshed_at.format("%Y-%m-%d %H:%M:%S"), snapshot.generation);
    if snapshot.is_simulated() {
        println!("!! 行情接口不可用，以下为模拟数据");
    }
    println!("{:-<64}", "");
    println!("{:<10} {:<8} {:>10} {:<12} {:>10}", "名称", "代码", "最新价", "日期", "累计涨幅");

    for instrument in snapshot.ranked() {
        println!("{:<10} {:<8} {:>10.3} {:<12} {:>+9.2}%",
                 instrument.display_name, instrument.symbol, instrument.latest_price,
                 instrument.latest_date, instrument.total_growth_pct);

        let skip = instrument.history.len().saturating_sub(history);
        for day in instrument.history.iter().skip(skip) {
            println!("    {} {:>10.3} {:>+8.2}% {:>+8.2}%",
                     day.date, day.price, day.daily_growth_pct, day.cumulative_growth_pct);
        }
    }
}
