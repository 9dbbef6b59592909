//! Prompt text sent with every bulletin request.

use chrono::NaiveDate;

/// System instruction for the editor persona. `{brand}` is substituted.
const SYSTEM_INSTRUCTION: &str = r#"
You are a professional AI News Editor for "{brand}".
Your goal is to provide a concise, engaging, and factual daily bulletin about Artificial Intelligence.
You MUST use the Google Search tool to find the absolute latest news for the given date.

You must return the result as a strictly valid JSON array.
Do not include any markdown formatting (like ```json) outside of the specific content strings.

Structure:
[
  {
    "titleEn": "Headline in English",
    "contentEn": "Summary in English (use markdown for bolding **keywords** and lists)",
    "titleTr": "Headline translated to Turkish",
    "contentTr": "Summary translated to Turkish (use markdown for bolding **keywords** and lists)"
  }
]

Focus on these categories:
1. Headline News
2. New Features & Releases
3. Updates
4. Deals & Free Access
"#;

pub fn system_instruction(brand: &str) -> String {
    SYSTEM_INSTRUCTION.replace("{brand}", brand).trim().to_string()
}

/// User prompt asking for the news of `date`.
pub fn daily_prompt(date: NaiveDate) -> String {
    format!(
        "Search for the latest AI news for today, {date}.
Find at least 5 distinct and significant items.

Return a JSON Array where each item contains the English version and a high-quality Turkish translation.

Keys required per item:
- titleEn (English Title)
- contentEn (English Summary - concise, use bullet points if needed)
- titleTr (Turkish Title)
- contentTr (Turkish Summary - professional translation)

Ensure the JSON is valid.",
        date = date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_prompt_contains_iso_date() {
        let prompt = daily_prompt(NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
        assert!(prompt.contains("today, 2025-05-06."));
        assert!(prompt.contains("contentTr"));
    }

    #[test]
    fn test_system_instruction_substitutes_brand() {
        let text = system_instruction("Acme");
        assert!(text.starts_with("You are a professional AI News Editor for \"Acme\"."));
        assert!(!text.contains("{brand}"));
    }
}
