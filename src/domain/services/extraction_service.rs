// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::domain::models::candidate::{FieldCandidate, SOURCE_EXTRACTION};
use crate::domain::models::profile::fields;
use crate::utils::url_utils::resolve_url;

/// 结构化元数据（JSON-LD）的规则置信度
pub const CONFIDENCE_STRUCTURED: f64 = 0.95;
/// meta/og标签的规则置信度
pub const CONFIDENCE_META: f64 = 0.85;
/// 标题/选择器启发式的规则置信度
pub const CONFIDENCE_HEURISTIC: f64 = 0.6;
/// 正文正则模式的规则置信度
pub const CONFIDENCE_TEXT_PATTERN: f64 = 0.5;
/// 关键词命中的规则置信度
pub const CONFIDENCE_KEYWORD: f64 = 0.4;

static EMPLOYEE_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:,\d{3})*)\s*(?:employees?|staff|people|team members?)")
        .expect("employee count regex")
});

static FUNDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$(\d+(?:\.\d+)?)\s*(million|billion|[MBk])\b").expect("funding regex")
});

static FOUNDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:founded in|since|established in|started in)\s+(\d{4})")
        .expect("founded year regex")
});

static CITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+,\s*[A-Z]{2}\b").expect("city regex"));

const INDUSTRY_KEYWORDS: [&str; 17] = [
    "technology", "software", "fintech", "healthcare", "biotech", "e-commerce", "retail",
    "manufacturing", "consulting", "marketing", "advertising", "real estate", "education",
    "automotive", "aerospace", "energy", "telecommunications",
];

const TECH_KEYWORDS: [&str; 17] = [
    "python", "javascript", "react", "nodejs", "java", "rust", "kubernetes", "docker", "aws",
    "azure", "gcp", "postgresql", "mongodb", "redis", "elasticsearch", "kafka", "spark",
];

const BENEFIT_KEYWORDS: [&str; 12] = [
    "health insurance", "dental", "vision", "401k", "retirement", "remote work",
    "flexible hours", "unlimited pto", "equity", "stock options", "gym membership", "free lunch",
];

const CULTURE_KEYWORDS: [&str; 11] = [
    "innovative", "collaborative", "fast-paced", "startup culture", "work-life balance",
    "diversity", "inclusion", "agile", "remote-first", "mission-driven", "customer-focused",
];

/// 由长到短，避免“seed”吞掉“pre-seed”
const FUNDING_STAGES: [&str; 10] = [
    "pre-seed", "series a", "series b", "series c", "series d", "acquired", "public", "angel",
    "seed", "ipo",
];

const EMPLOYEE_RANGES: [(&str, &[&str]); 6] = [
    ("1-10", &["1-10", "startup", "small team"]),
    ("11-50", &["11-50", "small company"]),
    ("51-200", &["51-200", "medium company"]),
    ("201-500", &["201-500", "growing company"]),
    ("501-1000", &["501-1000", "large company"]),
    ("1000+", &["1000+", "enterprise", "large corporation"]),
];

const TITLE_SUFFIXES: [&str; 6] = [
    " - Careers", " - Jobs", " | Careers", " | Jobs", " Careers", " Jobs",
];

/// 内容提取服务
///
/// 将一页HTML解析一次，按固定优先级跑一组相互独立的提取规则：
/// 结构化元数据 → meta标签 → 标题/文本启发式 → 链接/关键词启发式。
/// 单条规则在畸形输入上失败只会被跳过，提取本身从不硬失败。
pub struct ExtractionService;

impl ExtractionService {
    /// 从HTML中提取候选字段，按规则优先级排列
    pub fn extract(html: &str, base_url: &Url) -> Vec<FieldCandidate> {
        let document = Html::parse_document(html);
        let mut out = Vec::new();

        Self::extract_json_ld(&document, &mut out);
        Self::extract_meta_tags(&document, &mut out);
        Self::extract_title_heuristics(&document, &mut out);
        Self::extract_section_heuristics(&document, &mut out);
        Self::extract_social_links(&document, &mut out);
        Self::extract_logo(&document, base_url, &mut out);

        let text = Self::page_text(&document);
        Self::extract_text_patterns(&text, &mut out);
        Self::extract_keyword_lists(&text, &mut out);

        // The page itself vouches for the website field
        let origin = format!(
            "{}://{}",
            base_url.scheme(),
            base_url.host_str().unwrap_or_default()
        );
        out.push(FieldCandidate::text(
            fields::WEBSITE,
            origin,
            SOURCE_EXTRACTION,
            CONFIDENCE_HEURISTIC,
        ));

        debug!("Extraction produced {} candidate(s)", out.len());
        out
    }

    /// 可见文本，跳过script/style/noscript
    fn page_text(document: &Html) -> String {
        let mut text = String::new();
        for node in document.tree.nodes() {
            let Some(fragment) = node.value().as_text() else {
                continue;
            };
            let skip = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name().to_ascii_lowercase()))
                .map_or(false, |name| {
                    matches!(name.as_str(), "script" | "style" | "noscript")
                });
            if !skip {
                text.push_str(fragment);
                text.push(' ');
            }
        }
        text
    }

    fn extract_json_ld(document: &Html, out: &mut Vec<FieldCandidate>) {
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return;
        };

        for script in document.select(&selector) {
            let raw = script.text().collect::<String>();
            let Ok(value) = serde_json::from_str::<Value>(&raw) else {
                // Malformed JSON-LD is skipped, never fatal
                continue;
            };
            if let Some(org) = find_organization(&value) {
                Self::emit_organization(org, out);
            }
        }
    }

    fn emit_organization(org: &Value, out: &mut Vec<FieldCandidate>) {
        fn text_field(field: &str, value: Option<&str>, out: &mut Vec<FieldCandidate>) {
            if let Some(v) = value {
                out.push(FieldCandidate::text(
                    field,
                    v.trim(),
                    SOURCE_EXTRACTION,
                    CONFIDENCE_STRUCTURED,
                ));
            }
        }

        text_field(fields::NAME, org.get("name").and_then(Value::as_str), out);
        text_field(
            fields::DESCRIPTION,
            org.get("description").and_then(Value::as_str),
            out,
        );
        text_field(fields::WEBSITE, org.get("url").and_then(Value::as_str), out);

        match org.get("logo") {
            Some(Value::String(logo)) => text_field(fields::LOGO_URL, Some(logo), out),
            Some(Value::Object(obj)) => {
                text_field(fields::LOGO_URL, obj.get("url").and_then(Value::as_str), out)
            }
            _ => {}
        }

        if let Some(date) = org.get("foundingDate").and_then(Value::as_str) {
            if let Ok(year) = date.chars().take(4).collect::<String>().parse::<i64>() {
                if (1800..=2100).contains(&year) {
                    out.push(FieldCandidate::integer(
                        fields::FOUNDED_YEAR,
                        year,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_STRUCTURED,
                    ));
                }
            }
        }

        match org.get("address") {
            Some(Value::String(addr)) => text_field(fields::HEADQUARTERS, Some(addr), out),
            Some(Value::Object(addr)) => {
                let parts: Vec<&str> = ["addressLocality", "addressRegion", "addressCountry"]
                    .iter()
                    .filter_map(|k| addr.get(*k).and_then(Value::as_str))
                    .collect();
                if !parts.is_empty() {
                    text_field(fields::HEADQUARTERS, Some(&parts.join(", ")), out);
                }
            }
            _ => {}
        }

        if let Some(links) = org.get("sameAs").and_then(Value::as_array) {
            for link in links.iter().filter_map(Value::as_str) {
                if link.contains("linkedin.com") {
                    text_field(fields::LINKEDIN_URL, Some(link), out);
                } else if link.contains("twitter.com") || link.contains("x.com") {
                    text_field(fields::TWITTER_URL, Some(link), out);
                }
            }
        }

        match org.get("numberOfEmployees") {
            Some(Value::Number(n)) => {
                if let Some(count) = n.as_i64() {
                    out.push(FieldCandidate::integer(
                        fields::EMPLOYEE_COUNT,
                        count,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_STRUCTURED,
                    ));
                }
            }
            Some(Value::Object(obj)) => {
                if let Some(count) = obj.get("value").and_then(Value::as_i64) {
                    out.push(FieldCandidate::integer(
                        fields::EMPLOYEE_COUNT,
                        count,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_STRUCTURED,
                    ));
                }
                if let (Some(min), Some(max)) = (
                    obj.get("minValue").and_then(Value::as_i64),
                    obj.get("maxValue").and_then(Value::as_i64),
                ) {
                    out.push(FieldCandidate::text(
                        fields::EMPLOYEE_COUNT_RANGE,
                        format!("{}-{}", min, max),
                        SOURCE_EXTRACTION,
                        CONFIDENCE_STRUCTURED,
                    ));
                }
            }
            _ => {}
        }
    }

    fn extract_meta_tags(document: &Html, out: &mut Vec<FieldCandidate>) {
        let meta_content = |selector: &str| -> Option<String> {
            let sel = Selector::parse(selector).ok()?;
            document
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(site_name) = meta_content(r#"meta[property="og:site_name"]"#) {
            out.push(FieldCandidate::text(
                fields::NAME,
                site_name,
                SOURCE_EXTRACTION,
                CONFIDENCE_META,
            ));
        }

        for selector in [r#"meta[name="description"]"#, r#"meta[property="og:description"]"#] {
            if let Some(desc) = meta_content(selector) {
                if desc.len() > 50 {
                    out.push(FieldCandidate::text(
                        fields::DESCRIPTION,
                        desc,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_META,
                    ));
                }
            }
        }

        if let Some(title) = meta_content(r#"meta[property="og:title"]"#) {
            out.push(FieldCandidate::text(
                fields::NAME,
                strip_title_suffixes(&title),
                SOURCE_EXTRACTION,
                CONFIDENCE_HEURISTIC,
            ));
        }
    }

    fn extract_title_heuristics(document: &Html, out: &mut Vec<FieldCandidate>) {
        if let Ok(sel) = Selector::parse("title") {
            if let Some(title) = document.select(&sel).next() {
                let text = title.text().collect::<String>();
                let cleaned = strip_title_suffixes(text.trim());
                if !cleaned.is_empty() {
                    out.push(FieldCandidate::text(
                        fields::NAME,
                        cleaned,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_HEURISTIC,
                    ));
                }
            }
        }

        if let Ok(sel) = Selector::parse("h1") {
            for h1 in document.select(&sel) {
                let text = h1.text().collect::<String>().trim().to_string();
                // Reasonable company name length
                if !text.is_empty() && text.len() < 100 {
                    out.push(FieldCandidate::text(
                        fields::NAME,
                        text,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_HEURISTIC,
                    ));
                    break;
                }
            }
        }
    }

    fn extract_section_heuristics(document: &Html, out: &mut Vec<FieldCandidate>) {
        let about_selectors = [
            ".about", ".company-description", ".overview", r#"[class*="about"]"#,
            r#"[class*="description"]"#, r#"[class*="overview"]"#,
        ];
        if let Some(text) = first_matching_text(document, &about_selectors, |t| t.len() > 100) {
            let truncated: String = text.chars().take(500).collect();
            out.push(FieldCandidate::text(
                fields::DESCRIPTION,
                truncated,
                SOURCE_EXTRACTION,
                CONFIDENCE_HEURISTIC,
            ));
        }

        let address_selectors = [
            ".address", ".location", ".headquarters", r#"[class*="address"]"#,
            r#"[class*="location"]"#, r#"[class*="office"]"#,
        ];
        if let Some(text) =
            first_matching_text(document, &address_selectors, |t| !t.is_empty() && t.len() < 200)
        {
            out.push(FieldCandidate::text(
                fields::HEADQUARTERS,
                text,
                SOURCE_EXTRACTION,
                CONFIDENCE_HEURISTIC,
            ));
        }
    }

    fn extract_social_links(document: &Html, out: &mut Vec<FieldCandidate>) {
        let Ok(selector) = Selector::parse("a[href]") else {
            return;
        };
        for link in document.select(&selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if href.contains("linkedin.com") {
                out.push(FieldCandidate::text(
                    fields::LINKEDIN_URL,
                    href,
                    SOURCE_EXTRACTION,
                    CONFIDENCE_HEURISTIC,
                ));
            } else if href.contains("twitter.com") {
                out.push(FieldCandidate::text(
                    fields::TWITTER_URL,
                    href,
                    SOURCE_EXTRACTION,
                    CONFIDENCE_HEURISTIC,
                ));
            }
        }
    }

    fn extract_logo(document: &Html, base_url: &Url, out: &mut Vec<FieldCandidate>) {
        let selectors = [
            r#"img[class*="logo"]"#, r#"img[alt*="logo"]"#, ".logo img", "header img",
        ];
        for selector in selectors {
            let Ok(sel) = Selector::parse(selector) else {
                continue;
            };
            let Some(src) = document
                .select(&sel)
                .next()
                .and_then(|img| img.value().attr("src"))
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            if let Ok(resolved) = resolve_url(base_url, src) {
                out.push(FieldCandidate::text(
                    fields::LOGO_URL,
                    resolved.to_string(),
                    SOURCE_EXTRACTION,
                    CONFIDENCE_HEURISTIC,
                ));
                return;
            }
        }
    }

    fn extract_text_patterns(text: &str, out: &mut Vec<FieldCandidate>) {
        // Largest employee figure on the page is the most likely to be real
        let employee_count = EMPLOYEE_COUNT_RE
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().replace(',', "").parse::<i64>().ok())
            .max();
        if let Some(count) = employee_count {
            out.push(FieldCandidate::integer(
                fields::EMPLOYEE_COUNT,
                count,
                SOURCE_EXTRACTION,
                CONFIDENCE_TEXT_PATTERN,
            ));
        }

        if let Some(caps) = FUNDING_RE.captures(text) {
            if let (Some(amount), Some(unit)) = (caps.get(1), caps.get(2)) {
                if let Ok(value) = amount.as_str().parse::<f64>() {
                    let millions = match unit.as_str().to_lowercase().as_str() {
                        "billion" | "b" => Some(value * 1000.0),
                        "million" | "m" => Some(value),
                        "k" => Some(value / 1000.0),
                        _ => None,
                    };
                    if let Some(millions) = millions {
                        out.push(FieldCandidate::float(
                            fields::TOTAL_FUNDING,
                            millions,
                            SOURCE_EXTRACTION,
                            CONFIDENCE_TEXT_PATTERN,
                        ));
                    }
                }
            }
        }

        if let Some(caps) = FOUNDED_RE.captures(text) {
            if let Some(year) = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok()) {
                if (1800..=2100).contains(&year) {
                    out.push(FieldCandidate::integer(
                        fields::FOUNDED_YEAR,
                        year,
                        SOURCE_EXTRACTION,
                        CONFIDENCE_TEXT_PATTERN,
                    ));
                }
            }
        }

        let cities: Vec<String> = CITY_RE
            .find_iter(text)
            .take(5)
            .map(|m| m.as_str().to_string())
            .collect();
        if !cities.is_empty() {
            out.push(FieldCandidate::list(
                fields::LOCATIONS,
                cities,
                SOURCE_EXTRACTION,
                CONFIDENCE_TEXT_PATTERN,
            ));
        }
    }

    fn extract_keyword_lists(text: &str, out: &mut Vec<FieldCandidate>) {
        let lower = text.to_lowercase();

        if let Some(industry) = INDUSTRY_KEYWORDS.iter().find(|k| lower.contains(*k)) {
            out.push(FieldCandidate::text(
                fields::INDUSTRY,
                title_case(industry),
                SOURCE_EXTRACTION,
                CONFIDENCE_KEYWORD,
            ));
        }

        if let Some(stage) = FUNDING_STAGES.iter().find(|k| lower.contains(*k)) {
            out.push(FieldCandidate::text(
                fields::FUNDING_STAGE,
                title_case(stage),
                SOURCE_EXTRACTION,
                CONFIDENCE_KEYWORD,
            ));
        }

        if let Some((range, _)) = EMPLOYEE_RANGES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        {
            out.push(FieldCandidate::text(
                fields::EMPLOYEE_COUNT_RANGE,
                *range,
                SOURCE_EXTRACTION,
                CONFIDENCE_KEYWORD,
            ));
        }

        let keyword_list = |field: &str, keywords: &[&str], out: &mut Vec<FieldCandidate>| {
            let found: Vec<String> = keywords
                .iter()
                .filter(|k| lower.contains(*k))
                .map(|k| title_case(k))
                .collect();
            if !found.is_empty() {
                out.push(FieldCandidate::list(
                    field,
                    found,
                    SOURCE_EXTRACTION,
                    CONFIDENCE_KEYWORD,
                ));
            }
        };

        keyword_list(fields::TECH_STACK, &TECH_KEYWORDS, out);
        keyword_list(fields::BENEFITS, &BENEFIT_KEYWORDS, out);
        keyword_list(fields::CULTURE_KEYWORDS, &CULTURE_KEYWORDS, out);
    }
}

fn first_matching_text(
    document: &Html,
    selectors: &[&str],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    for selector in selectors {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&sel) {
            let text = element_text(&element);
            if accept(&text) {
                return Some(text);
            }
        }
    }
    None
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_title_suffixes(title: &str) -> String {
    let mut cleaned = title.trim();
    for suffix in TITLE_SUFFIXES {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            cleaned = stripped.trim_end();
            break;
        }
    }
    cleaned.to_string()
}

fn title_case(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 在JSON-LD值中（含@graph与数组）寻找Organization对象
fn find_organization(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(obj) => {
            let is_org = obj.get("@type").map_or(false, |t| match t {
                Value::String(s) => s == "Organization",
                Value::Array(items) => items.iter().any(|i| i.as_str() == Some("Organization")),
                _ => false,
            });
            if is_org {
                return Some(value);
            }
            if let Some(graph) = obj.get("@graph") {
                return find_organization(graph);
            }
            None
        }
        Value::Array(items) => items.iter().find_map(find_organization),
        _ => None,
    }
}
