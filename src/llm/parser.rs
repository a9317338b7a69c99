//! Response parsing for LLM outputs.
//!
//! Completion services are asked for a JSON object, but models drift. The
//! parser accepts, in order: a JSON object with a `sql` field, a fenced code
//! block, or the bare text.

use serde::Deserialize;

/// Result of parsing an LLM response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResponse {
    /// Candidate SQL, if any was found. Still untrusted.
    pub sql: Option<String>,
    /// Optional natural-language explanation.
    pub explanation: Option<String>,
}

impl ParsedResponse {
    fn with_sql(sql: &str, explanation: Option<String>) -> Self {
        let sql = sql.trim();
        Self {
            sql: (!sql.is_empty()).then(|| sql.to_string()),
            explanation: explanation
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StructuredResponse {
    #[serde(default)]
    sql: String,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parses an LLM response into candidate SQL and an optional explanation.
pub fn parse_llm_response(response: &str) -> ParsedResponse {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return ParsedResponse::default();
    }

    if let Some(parsed) = parse_structured(trimmed) {
        return parsed;
    }

    // A JSON object wrapped in a ```json fence.
    if let Some(block) = extract_code_block(trimmed, "json") {
        if let Some(parsed) = parse_structured(block.trim()) {
            return parsed;
        }
    }

    if let Some(sql) = extract_code_block(trimmed, "sql") {
        return ParsedResponse::with_sql(sql, prose_around_block(trimmed));
    }

    if let Some(sql) = extract_code_block(trimmed, "") {
        return ParsedResponse::with_sql(sql, prose_around_block(trimmed));
    }

    ParsedResponse::with_sql(trimmed, None)
}

fn parse_structured(text: &str) -> Option<ParsedResponse> {
    if !text.starts_with('{') {
        return None;
    }
    let structured: StructuredResponse = serde_json::from_str(text).ok()?;
    Some(ParsedResponse::with_sql(
        &structured.sql,
        structured.explanation,
    ))
}

/// Extracts the body of the first fenced block tagged `lang`.
///
/// An empty `lang` matches only untagged fences.
fn extract_code_block<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find("```") {
        let fence = search_from + offset;
        let after_fence = fence + 3;
        let line_end = text[after_fence..].find('\n')? + after_fence;
        let tag = text[after_fence..line_end].trim();

        let body_start = line_end + 1;
        let body_len = text[body_start..].find("```")?;

        if tag.eq_ignore_ascii_case(lang) {
            return Some(&text[body_start..body_start + body_len]);
        }
        search_from = body_start + body_len + 3;
    }
    None
}

/// Text outside the first fenced block, used as the explanation.
fn prose_around_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let body_end = text[start + 3..].find("```")? + start + 3;
    let before = text[..start].trim();
    let after = text[body_end + 3..].trim();
    let prose = match (before.is_empty(), after.is_empty()) {
        (true, true) => return None,
        (false, true) => before.to_string(),
        (true, false) => after.to_string(),
        (false, false) => format!("{} {}", before, after),
    };
    Some(prose)
}
