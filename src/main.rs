use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use heuristic_eval::cli::Cli;
use heuristic_eval::utils::logging;
use heuristic_eval::{App, AppResult, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 先初始化日志，配置加载时的提示才能输出
    let log = logging::init(cli.verbose);

    // 加载配置
    let config = Config::load();
    if let Ok(config) = &config {
        log.set_verbose(cli.verbose || config.verbose_logging);
    }

    match run(cli, config).await {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {}", e);
            eprintln!("❌ {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppResult<Config>) -> AppResult<String> {
    let config = config?;
    logging::log_startup(&config);

    // 初始化并运行应用
    let mut app = App::initialize(config)?;
    app.run(cli.command).await
}
