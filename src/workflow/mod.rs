use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::report::ReportRenderer;
use crate::research::prompts::BASELINE_SYSTEM_PROMPT;
use crate::research::{ResearchOrchestrator, ResearchServices};

const BASELINE_MAX_TOKENS: u32 = 500;
const BASELINE_TEMPERATURE: f64 = 0.7;

/// 演示模式依次运行的问题
pub const DEMO_QUERIES: [&str; 4] = [
    "Build a team of all bug type Pokemon.",
    "What is an easy Pokemon to train in Pokemon Red?",
    "I have a team of 5 Pikachus. What Pokemon should I add next to my party?",
    "I want to find a unique Pokemon that lives by the sea.",
];

const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// 单次研究的输出选项
#[derive(Debug, Clone, Default)]
pub struct ResearchOptions {
    /// 同时输出模型直接回答以便对比
    pub compare: bool,
    /// 输出每只宝可梦的详细发现
    pub verbose: bool,
    /// 保存markdown报告的路径
    pub output: Option<PathBuf>,
}

fn build_orchestrator(config: &Config) -> Result<ResearchOrchestrator> {
    let services = ResearchServices::from_config(config)?;
    Ok(ResearchOrchestrator::new(services))
}

/// 研究单个问题并输出结果
pub async fn launch_research(config: &Config, query: &str, options: &ResearchOptions) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    run_query(&orchestrator, query, options).await
}

/// 交互模式：逐行读取问题，直到输入退出命令或标准输入结束
pub async fn launch_interactive(config: &Config) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    println!("🎮 交互模式，输入 quit / exit / q 退出");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("\n❓ What would you like to know about Pokemon?");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let query = line.trim();
        if is_exit_command(query) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        if let Err(e) = run_query(&orchestrator, query, &ResearchOptions::default()).await {
            eprintln!("❌ 研究失败: {}", e);
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

/// 演示模式：依次研究预置问题，并附带对比回答
pub async fn launch_demo(config: &Config) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let options = ResearchOptions {
        compare: true,
        ..Default::default()
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    for (index, query) in DEMO_QUERIES.iter().enumerate() {
        println!("\n🎯 Demo {}/{}: {}", index + 1, DEMO_QUERIES.len(), query);
        println!("{}", "-".repeat(60));

        if let Err(e) = run_query(&orchestrator, query, &options).await {
            eprintln!("❌ Demo {} 失败: {}", index + 1, e);
        }

        if index + 1 < DEMO_QUERIES.len() {
            println!("\n⏎ 按回车继续下一个演示...");
            lines.next_line().await?;
        }
    }

    Ok(())
}

async fn run_query(
    orchestrator: &ResearchOrchestrator,
    query: &str,
    options: &ResearchOptions,
) -> Result<()> {
    let start = Instant::now();
    let report = orchestrator.conduct_research(query).await;

    println!("\n{}", ReportRenderer::render_markdown(&report));

    if options.compare {
        println!("⚖️ 生成对比回答...");
        let baseline = fetch_baseline(orchestrator.services(), query).await;
        println!("{}", ReportRenderer::render_comparison(&report, &baseline));
    }

    if options.verbose {
        println!("📊 详细发现\n{}", ReportRenderer::render_findings(&report));
    }

    if let Some(path) = &options.output {
        ReportRenderer::save(&report, path)?;
    }

    println!("⏱️ 耗时 {:.2} 秒", start.elapsed().as_secs_f64());
    Ok(())
}

/// 不经过研究流程，直接询问模型，失败时返回错误说明
pub async fn fetch_baseline(services: &ResearchServices, query: &str) -> String {
    match services
        .llm
        .complete(
            BASELINE_SYSTEM_PROMPT,
            query,
            BASELINE_MAX_TOKENS,
            BASELINE_TEMPERATURE,
        )
        .await
    {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!("Error getting baseline response: {}", e);
            format!("Error getting baseline response: {}", e)
        }
    }
}

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&input.as_str())
}
