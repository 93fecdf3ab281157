use crate::error::{Result, SummaryError};
use crate::format::{avg2, num0};
use crate::payload::{CategoryBreakdown, NetworkSummary, SummaryPayload};
use incident_protocol::{ChatPrompt, DerivedStat};
use std::fmt::Write;

pub const SUMMARY_SYSTEM_PROMPT: &str = "As an expert analyst in financial application's incident management, provide a structured and concise summary for the selected categories, focusing on:

1. **Overall Summary:**
   - Identify overall problematic categories, along with groups, sites, and time frames (only top 2 or 3).
   - Highlight categories, groups, sites, and time frames which are significantly beyond the threshold duration (only top 2 or 3).

2. **Analysis:**
   - Narrate a story flow linking categories, groups, sites, and time frames in 4 key points under the subheading 'Analysis'.

3. **Recommendations:**
   - Highlight connections with other categories or subcategories that might have impacted the problematic categories.
   - Provide specific recommendations based on the current data provided.

Include both incident data and network data in your analysis.

Present the information concisely using bullet points under each section. Ensure that the summary is directly based on the data provided and is actionable.";

pub const ASK_SYSTEM_PROMPT: &str = "As an expert analyst in financial application's incident management,
answer the user's question based on the data provided.
Provide examples from both the incident data and network data to support your answer.
Present the information concisely and ensure that the answer is directly based on the data provided and is actionable.";

/// Renders a [`SummaryPayload`] into the text-generation request.
pub struct PromptComposer;

impl PromptComposer {
    pub fn summarize(payload: &SummaryPayload) -> ChatPrompt {
        let mut message = format!(
            "Selected Categories:\n{}\n\nOverall Summary:\n",
            payload.selected_categories.join(", ")
        );

        message.push_str(&top_stats("Problematic categories", &payload.top_categories));
        message.push_str(&top_stats("Problematic groups", &payload.top_groups));
        message.push_str(&top_stats("Problematic sites", &payload.top_sites));
        message.push_str(&top_stats("Problematic time frames", &payload.top_time_frames));

        let _ = write!(message, "\nNetwork Data Summary:\n{}\n", network(&payload.network));

        for breakdown in &payload.categories {
            let _ = write!(message, "\nCategory: {}\n", breakdown.category);
            message.push_str(&category_stats(breakdown));
        }

        ChatPrompt::new(SUMMARY_SYSTEM_PROMPT, message)
    }

    /// Question answering over the same payload; a blank question is refused
    pub fn ask(question: &str, payload: &SummaryPayload) -> Result<ChatPrompt> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SummaryError::EmptyQuestion);
        }

        let mut message = format!("User Question:\n{question}\n\nData Summary:\n");

        for stat in &payload.category_stats {
            let _ = writeln!(
                message,
                "- Category {}: {} incidents, Avg Duration: {} hours",
                stat.key,
                num0(stat.count as f64),
                avg2(stat.avg_hours)
            );
        }

        for breakdown in &payload.categories {
            let _ = write!(message, "\nCategory: {}\n", breakdown.category);
            message.push_str(&category_stats(breakdown));
        }

        let _ = write!(message, "\nNetwork Data Summary:\n{}\n", network(&payload.network));

        Ok(ChatPrompt::new(ASK_SYSTEM_PROMPT, message))
    }
}

fn stat_lines(stats: &[DerivedStat]) -> String {
    stats
        .iter()
        .map(|stat| {
            format!(
                "  {}: {} incidents (Avg {} hrs)",
                stat.key,
                num0(stat.count as f64),
                avg2(stat.avg_hours)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn top_stats(title: &str, stats: &[DerivedStat]) -> String {
    if stats.is_empty() {
        return String::new();
    }
    format!("- {title}:\n{}\n\n", stat_lines(stats))
}

fn category_stats(breakdown: &CategoryBreakdown) -> String {
    let mut out = String::new();
    for (title, stats) in [
        ("Problematic time frames", &breakdown.time_frames),
        ("Problematic sites", &breakdown.sites),
        ("Problematic groups", &breakdown.groups),
    ] {
        if !stats.is_empty() {
            let _ = write!(out, "- {title}:\n{}\n", stat_lines(stats));
        }
    }

    let _ = write!(
        out,
        "- Impacting connections:\n  {}\n",
        joined_or_none(&breakdown.related)
    );
    out
}

fn network(summary: &NetworkSummary) -> String {
    let mut out = String::new();
    for entry in &summary.connections {
        let _ = writeln!(
            out,
            "- {} connections: {}",
            entry.category,
            joined_or_none(&entry.connections)
        );
    }

    if !summary.related_subcategories.is_empty() {
        out.push_str("\nRelated Subcategories:\n");
        for sub in &summary.related_subcategories {
            let _ = writeln!(out, "- {sub}");
        }
    }
    out
}

fn joined_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}
