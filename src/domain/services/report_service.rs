// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Datelike, Utc};

use crate::domain::models::outcome::EnrichmentError;
use crate::domain::models::profile::CompanyProfile;

/// Markdown分析报告生成器
///
/// 纯字符串拼接，只依赖画像与评分结果。
pub struct ReportService;

impl ReportService {
    /// 渲染完整的Markdown报告
    pub fn render(
        profile: &CompanyProfile,
        completeness_score: f64,
        confidence_score: f64,
        enrichment_sources: &[String],
        enrichment_errors: &[EnrichmentError],
    ) -> String {
        let mut lines: Vec<String> = Vec::new();

        let company_name = profile.name.as_deref().unwrap_or("Unknown Company");
        lines.push(format!("# {} - Company Analysis Report", company_name));
        lines.push(format!(
            "*Generated on {} UTC*",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(String::new());

        lines.push("## Executive Summary".to_string());
        lines.push(Self::executive_summary(profile));
        lines.push(String::new());

        if profile.description.is_some() || profile.industry.is_some() || profile.founded_year.is_some()
        {
            lines.push("## Company Overview".to_string());
            if let Some(description) = &profile.description {
                lines.push(format!("**Description:** {}", description));
                lines.push(String::new());
            }
            if let Some(industry) = &profile.industry {
                lines.push(format!("**Industry:** {}", industry));
            }
            if let Some(year) = profile.founded_year {
                lines.push(format!("**Founded:** {}", year));
            }
            if let Some(website) = &profile.website {
                lines.push(format!("**Website:** {}", website));
            }
            lines.push(String::new());
        }

        if profile.employee_count.is_some()
            || profile.employee_count_range.is_some()
            || profile.funding_stage.is_some()
            || profile.total_funding.is_some()
        {
            lines.push("## Size & Funding".to_string());
            if let Some(count) = profile.employee_count {
                lines.push(format!("**Employee Count:** {}", group_thousands(count)));
            } else if let Some(range) = &profile.employee_count_range {
                lines.push(format!("**Employee Range:** {}", range));
            }
            if let Some(stage) = &profile.funding_stage {
                lines.push(format!("**Funding Stage:** {}", stage));
            }
            if let Some(funding) = profile.total_funding {
                lines.push(format!("**Total Funding:** ${:.1}M", funding));
            }
            lines.push(String::new());
        }

        if profile.headquarters.is_some() || !profile.locations.is_empty() {
            lines.push("## Location".to_string());
            if let Some(hq) = &profile.headquarters {
                lines.push(format!("**Headquarters:** {}", hq));
            }
            if !profile.locations.is_empty() {
                lines.push("**Other Locations:**".to_string());
                for location in &profile.locations {
                    lines.push(format!("- {}", location));
                }
            }
            lines.push(String::new());
        }

        if !profile.tech_stack.is_empty()
            || !profile.benefits.is_empty()
            || !profile.culture_keywords.is_empty()
        {
            lines.push("## Technology & Culture".to_string());
            if !profile.tech_stack.is_empty() {
                lines.push("**Technology Stack:**".to_string());
                for tech in &profile.tech_stack {
                    lines.push(format!("- {}", tech));
                }
                lines.push(String::new());
            }
            if !profile.benefits.is_empty() {
                lines.push("**Benefits & Perks:**".to_string());
                for benefit in &profile.benefits {
                    lines.push(format!("- {}", benefit));
                }
                lines.push(String::new());
            }
            if !profile.culture_keywords.is_empty() {
                lines.push("**Culture Keywords:**".to_string());
                lines.push(profile.culture_keywords.join(", "));
                lines.push(String::new());
            }
        }

        if profile.linkedin_url.is_some() || profile.twitter_url.is_some() {
            lines.push("## Social Presence".to_string());
            if let Some(linkedin) = &profile.linkedin_url {
                lines.push(format!("**LinkedIn:** {}", linkedin));
            }
            if let Some(twitter) = &profile.twitter_url {
                lines.push(format!("**Twitter:** {}", twitter));
            }
            lines.push(String::new());
        }

        lines.push("## Analysis Quality".to_string());
        lines.push(format!(
            "**Data Completeness:** {:.1}%",
            completeness_score * 100.0
        ));
        lines.push(format!(
            "**Confidence Score:** {:.1}%",
            confidence_score * 100.0
        ));
        if !enrichment_sources.is_empty() {
            lines.push(format!(
                "**Enrichment Sources:** {}",
                enrichment_sources.join(", ")
            ));
        }
        if !enrichment_errors.is_empty() {
            lines.push("**Enrichment Issues:**".to_string());
            for error in enrichment_errors {
                lines.push(format!("- {}: {}", error.provider, error.message));
            }
        }
        lines.push(String::new());

        lines.push("---".to_string());
        lines.push(
            "*This report was generated automatically. Data accuracy may vary.*".to_string(),
        );

        lines.join("\n")
    }

    fn executive_summary(profile: &CompanyProfile) -> String {
        let company_name = profile.name.as_deref().unwrap_or("This company");
        let mut parts: Vec<String> = Vec::new();

        match &profile.description {
            Some(description) => parts.push(description.clone()),
            None => parts.push(format!("{} is a company", company_name)),
        }

        let mut details: Vec<String> = Vec::new();
        if let Some(industry) = &profile.industry {
            details.push(format!("in the {} industry", industry.to_lowercase()));
        }
        if let Some(year) = profile.founded_year {
            let age = Utc::now().year() - year;
            details.push(format!("founded {} years ago ({})", age, year));
        }
        if let Some(hq) = &profile.headquarters {
            details.push(format!("headquartered in {}", hq));
        }
        if !details.is_empty() {
            parts.push(details.join(" "));
        }

        if let Some(count) = profile.employee_count {
            parts.push(format!(
                "The company has approximately {} employees",
                group_thousands(count)
            ));
        } else if let Some(range) = &profile.employee_count_range {
            parts.push(format!("The company has {} employees", range));
        }

        match (&profile.funding_stage, profile.total_funding) {
            (Some(stage), Some(funding)) => parts.push(format!(
                "and has raised ${:.1}M in {} funding",
                funding,
                stage.to_lowercase()
            )),
            (Some(stage), None) => {
                parts.push(format!("and is at the {} stage", stage.to_lowercase()))
            }
            (None, Some(funding)) => {
                parts.push(format!("and has raised ${:.1}M in funding", funding))
            }
            (None, None) => {}
        }

        format!("{}.", parts.join(". "))
    }
}

/// 千位分隔，如 12345 -> "12,345"
fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
