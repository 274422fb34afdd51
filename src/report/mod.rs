//! 研究报告的文本呈现与落盘

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::research::ResearchReport;

/// Markdown报告生成器
pub struct ReportRenderer;

impl ReportRenderer {
    /// 生成完整的markdown报告
    pub fn render_markdown(report: &ResearchReport) -> String {
        let mut content = String::new();

        content.push_str("# Pokemon Research Report\n\n");
        content.push_str(&format!("**Query**: {}\n\n", report.query));
        content.push_str(&format!(
            "**Research ID**: `{}`  \n**Generated at**: {}  \n**Confidence**: {:.0}%\n\n",
            report.research_id,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.confidence_score * 100.0
        ));

        content.push_str("## Executive Summary\n\n");
        content.push_str(&report.executive_summary);
        content.push_str("\n\n");

        push_list(&mut content, "Recommendations", &report.recommendations);
        push_list(&mut content, "Limitations", &report.limitations);
        push_list(&mut content, "Sources", &report.sources);

        content.push_str("## Research Steps\n\n");
        for (index, step) in report.research_steps.iter().enumerate() {
            let status = if step.success { "✅" } else { "❌" };
            content.push_str(&format!(
                "{}. {} [{}] {}",
                index + 1,
                status,
                step.step_type,
                step.description
            ));
            if let Some(error) = &step.error_message {
                content.push_str(&format!(" ({})", error));
            }
            content.push('\n');
        }

        content
    }

    /// 详细模式下额外输出的发现：每只宝可梦的基础信息与分析结论
    pub fn render_findings(report: &ResearchReport) -> String {
        let mut content = String::new();

        for (key, value) in &report.detailed_findings {
            let Some(name) = key.strip_prefix("pokemon_") else {
                continue;
            };
            if name == "to_research" {
                continue;
            }
            content.push_str(&format!("🔍 {}\n", name));
            if let Some(types) = value.get("types").and_then(Value::as_array) {
                let types: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
                content.push_str(&format!("   Types: {}\n", types.join(", ")));
            }
            if let Some(chain) = value.get("evolution_chain").and_then(Value::as_array) {
                if !chain.is_empty() {
                    let chain: Vec<&str> = chain.iter().filter_map(Value::as_str).collect();
                    content.push_str(&format!("   Evolution: {}\n", chain.join(" → ")));
                }
            }
            if let Some(description) = value.get("description").and_then(Value::as_str) {
                content.push_str(&format!("   {}\n", description));
            }
        }

        let key_findings = report
            .detailed_findings
            .get("analysis")
            .and_then(|a| a.get("key_findings"))
            .and_then(Value::as_array);
        if let Some(findings) = key_findings {
            content.push_str("💡 Key findings:\n");
            for finding in findings.iter().filter_map(Value::as_str) {
                content.push_str(&format!("   - {}\n", finding));
            }
        }

        content
    }

    /// 研究结果与模型直接回答的对比
    pub fn render_comparison(report: &ResearchReport, baseline: &str) -> String {
        format!(
            "## Direct LLM Answer\n\n{}\n\n## Research Assistant Answer\n\n{}\n\n\
             Research used {} steps and {} sources (confidence {:.0}%).\n",
            baseline.trim(),
            report.executive_summary,
            report.research_steps.len(),
            report.sources.len(),
            report.confidence_score * 100.0
        )
    }

    /// 将markdown报告写入文件，自动创建父目录
    pub fn save(report: &ResearchReport, path: &Path) -> Result<()> {
        if let Some(parent_dir) = path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir).with_context(|| {
                    format!("Failed to create directory: {}", parent_dir.display())
                })?;
            }
        }

        fs::write(path, Self::render_markdown(report))
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        println!("💾 已保存报告: {}", path.display());
        Ok(())
    }
}

fn push_list(content: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    content.push_str(&format!("## {}\n\n", title));
    for item in items {
        content.push_str(&format!("- {}\n", item));
    }
    content.push('\n');
}
