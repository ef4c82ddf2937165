use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use feedhush_common::models::{NodeId, PageNode, Selector};
use feedhush_common::traits::FeedPage;
use feedhush_core::cache::DEFAULT_CACHE_CAPACITY;
use feedhush_core::eventbus::RescanPolicy;
use feedhush_core::scanner::{DEFAULT_CONTAINER_TAG, DEFAULT_POST_SELECTOR};
use feedhush_core::store::JsonFileOptionStore;
use feedhush_core::{
    DecisionCache, DecisionEngine, DecisionStrategy, FeedFilter, MemoryPage, PageEventBus, ScanReport, Scanner,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "feedhush")]
#[command(author, version, about = "feedhush - hides feed posts an LLM says you would not want to see")]
struct Args {
    /// JSON object holding apiUrl, apiKey, model, prompt_template,
    /// prompt_instructions and hide_threshold
    #[arg(long, default_value = "options.json")]
    options: PathBuf,

    /// JSON snapshot of the page body (a tree of {tag, attributes, text, children})
    #[arg(long)]
    page: PathBuf,

    /// Selector for post text elements
    #[arg(long, default_value = DEFAULT_POST_SELECTOR)]
    selector: String,

    /// Tag of the container hidden for each post
    #[arg(long, default_value = DEFAULT_CONTAINER_TAG)]
    container: String,

    /// "contains-no" or "logprob-threshold"
    #[arg(long, default_value = "contains-no")]
    strategy: String,

    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    /// Keep running and append nodes read from stdin (one JSON node per line)
    #[arg(long, short = 'w', default_value = "false")]
    watch: bool,

    /// Coalesce bursts of new nodes into one scan after this quiet period
    #[arg(long)]
    debounce_ms: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("feedhush=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).with_writer(std::io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "feedhush starting. page={}, strategy={}, watch={}",
        args.page.display(),
        args.strategy,
        args.watch
    );

    if let Err(e) = run(args).await {
        error!("feedhush error: {:?}", e);
        return Err(e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let strategy: DecisionStrategy = args.strategy.parse()?;
    let selector = Selector::parse(&args.selector)?;

    let snapshot = tokio::fs::read_to_string(&args.page)
        .await
        .with_context(|| format!("reading page snapshot {}", args.page.display()))?;
    let root: PageNode = serde_json::from_str(&snapshot).context("parsing page snapshot")?;
    let page = Arc::new(MemoryPage::from_snapshot(root));

    let store = JsonFileOptionStore::new(&args.options);
    let engine = Arc::new(DecisionEngine::new(
        Arc::new(DecisionCache::new(args.cache_capacity)),
        strategy,
    ));
    let scanner = Scanner::new(selector).with_container_tag(args.container.clone());

    let policy = match args.debounce_ms {
        Some(ms) => RescanPolicy::Debounce(Duration::from_millis(ms)),
        None => RescanPolicy::Immediate,
    };
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let filter = FeedFilter::new(page.clone(), engine, scanner)
        .with_rescan_policy(policy)
        .with_report_sink(report_tx);

    let bus = PageEventBus::new();
    let running = filter.start(&store, &bus).await?;
    print_hidden(page.as_ref(), &running.initial);

    if !args.watch {
        bus.shutdown();
        let _ = running.watcher.await;
        return Ok(());
    }

    let printer = {
        let page = page.clone();
        tokio::spawn(print_reports(page, report_rx))
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let node: PageNode = match serde_json::from_str(line) {
            Ok(node) => node,
            Err(e) => {
                warn!("Skipping malformed node: {}", e);
                continue;
            }
        };
        let record = page.append_child(page.root(), node)?;
        bus.publish_mutations(vec![record]).await;
    }

    info!("stdin closed, shutting down");
    bus.shutdown();
    let _ = running.watcher.await;
    // The printer ends once the last report sender is gone.
    drop(filter);
    let _ = printer.await;
    Ok(())
}

async fn print_reports(page: Arc<MemoryPage>, mut reports: mpsc::UnboundedReceiver<ScanReport>) {
    while let Some(report) = reports.recv().await {
        print_hidden(page.as_ref(), &report);
    }
}

fn print_hidden(page: &MemoryPage, report: &ScanReport) {
    for node in &report.hidden {
        println!("{}", display_id(page, *node));
    }
}

fn display_id(page: &MemoryPage, node: NodeId) -> String {
    page.attribute(node, "id").unwrap_or_else(|| node.to_string())
}
