/// 从模型输出中取出JSON正文
///
/// 模型偶尔会把JSON包在markdown代码块里，这里只剥掉外层围栏，不做其它修复。
pub fn extract_json_payload(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // 跳过围栏上的语言标记，例如 ```json
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
