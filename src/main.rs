use std::path::PathBuf;
use tpt_return_matcher::batch::{self, JobOutcome};
use tpt_return_matcher::config::OutputFormat;
use tpt_return_matcher::AppConfig;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let mut config = AppConfig::load()?;

    // 第一个参数可覆盖输入文件
    if let Some(input) = std::env::args().nth(1) {
        config.runner.input = PathBuf::from(input);
    }

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_max_level(config.logging.level_filter())
        .init();

    info!("Starting matcher with config: {:?}", config);

    if config.runner.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.runner.workers)
            .build_global()?;
    }

    let jobs = batch::load_jobs(&config.runner.input)?;
    info!("Loaded {} charge versions from {}", jobs.len(), config.runner.input.display());

    let outcomes = batch::run_jobs(&jobs);

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, JobOutcome::Failed { .. }))
        .count();
    let gated = outcomes
        .iter()
        .filter(|o| matches!(o, JobOutcome::Matched { report, .. } if !report.is_ready()))
        .count();

    match config.runner.format {
        OutputFormat::Json => batch::export_to_json(&outcomes, &config.runner.output)?,
        OutputFormat::Csv => batch::export_to_csv(&outcomes, &config.runner.output)?,
    }

    info!(
        "匹配完成: 总计: {}, 退回不完整: {}, 失败: {}, 输出: {}",
        outcomes.len(),
        gated,
        failed,
        config.runner.output.display()
    );

    Ok(())
}
