use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use nestsweep::dom::browser;
use nestsweep::dom::cdp::CdpPage;
use nestsweep::{audit_html, load_config, KeywordSet, SweepOptions, SweepSession};

fn flag_value(args: &[String], name: &str) -> Option<String> {
    let mut iter = args.iter();
    while let Some(a) = iter.next() {
        if a == name {
            if let Some(v) = iter.next() {
                return Some(v.clone());
            }
        } else if let Some(rest) = a.strip_prefix(&format!("{}=", name)) {
            return Some(rest.to_string());
        }
    }
    None
}

fn usage() -> &'static str {
    "nestsweep — bulk-unfollow engine for your own following list\n\
     \n\
     USAGE:\n\
       nestsweep run [--port 9222 | --ws <url> | --launch <url>] [options]\n\
       nestsweep audit <page.html> [--json]\n\
     \n\
     RUN OPTIONS:\n\
       --port <n>           attach to a browser started with --remote-debugging-port=<n>\n\
       --ws <url>           attach to an explicit devtools websocket URL\n\
       --launch <url>       launch a headful browser on <url>, start after Enter\n\
       --page <substring>   drive the first open page whose URL contains <substring>\n\
       --max-actions <n>    override the per-session action limit\n\
       --min-delay-ms <n>   override the minimum inter-action delay\n\
       --max-delay-ms <n>   override the maximum inter-action delay\n\
       --json               print the final report as JSON\n\
     \n\
     Config file: nestsweep.json (cwd, parent dir, or NESTSWEEP_CONFIG).\n"
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("run") => run_sweep(&args).await,
        Some("audit") => run_audit(&args).await,
        _ => {
            eprint!("{}", usage());
            std::process::exit(2);
        }
    }
}

async fn run_audit(args: &[String]) -> Result<()> {
    let path = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow!("usage: nestsweep audit <page.html> [--json]"))?;
    let html = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read {}: {}", path, e))?;

    let keywords = KeywordSet::from_config(&load_config());
    let report = audit_html(&html, &keywords).await?;

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_table());
    }
    Ok(())
}

async fn run_sweep(args: &[String]) -> Result<()> {
    let cfg = load_config();

    let mut settings = cfg.settings();
    if let Some(n) = flag_value(args, "--max-actions").and_then(|v| v.parse().ok()) {
        settings.max_actions = n;
    }
    if let Some(n) = flag_value(args, "--min-delay-ms").and_then(|v| v.parse().ok()) {
        settings.min_delay_ms = n;
    }
    if let Some(n) = flag_value(args, "--max-delay-ms").and_then(|v| v.parse().ok()) {
        settings.max_delay_ms = n;
    }
    if settings.min_delay_ms > settings.max_delay_ms {
        return Err(anyhow!(
            "min delay ({}) exceeds max delay ({})",
            settings.min_delay_ms,
            settings.max_delay_ms
        ));
    }

    let keywords = KeywordSet::from_config(&cfg);
    let opts = SweepOptions {
        confirm_timeout: Duration::from_millis(cfg.resolve_confirm_timeout_ms()),
        ..SweepOptions::default()
    };

    // Connect before claiming the session so a connection failure leaves no
    // state behind.
    let launch_url = flag_value(args, "--launch");
    let (browser_session, page, launched) = if let Some(url) = &launch_url {
        let (session, page) = browser::launch_headful(url).await?;
        println!(
            "Log in if needed, open your following list, scroll until the rows you want cleaned are loaded, then press Enter to start."
        );
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        (session, page, true)
    } else if let Some(ws) = flag_value(args, "--ws") {
        let session = browser::attach_ws(&ws).await?;
        let page =
            browser::select_page(&session.browser, flag_value(args, "--page").as_deref()).await?;
        (session, page, false)
    } else {
        let port = flag_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .unwrap_or(9222);
        let session = browser::attach_port(port).await?;
        let page =
            browser::select_page(&session.browser, flag_value(args, "--page").as_deref()).await?;
        (session, page, false)
    };

    let sweep = SweepSession::start(settings, keywords, opts)?;
    let handle = sweep.handle();

    // First Ctrl-C is the cooperative stop intent; the second aborts.
    let stop_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("stop requested; the in-flight cell will finish first (Ctrl-C again to abort)");
            stop_handle.request_stop();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });

    // Periodic panel-style progress line.
    let progress_handle = handle.clone();
    let progress_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        ticker.tick().await; // immediate first tick is noise
        loop {
            ticker.tick().await;
            let view = progress_handle.view();
            info!(
                "{} unfollowed, {} skipped, {}% complete{}",
                view.processed,
                view.skipped,
                view.percent_complete,
                view.current_identity
                    .map(|u| format!(" (at @{})", u))
                    .unwrap_or_default()
            );
        }
    });

    let dom = CdpPage::new(page);
    let report = sweep.run(&dom).await?;
    progress_task.abort();

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_table());
    }

    browser_session.shutdown(launched).await;
    Ok(())
}
