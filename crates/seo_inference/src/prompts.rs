use serde_json::{json, Value};
use seo_core::AnalysisResult;

pub fn optimize_prompt(article_text: &str) -> String {
    let mut prompt = String::with_capacity(article_text.len() + 1500);
    prompt.push_str(
        "You are a senior SEO strategist and content engineer. Rewrite the text below into an \
authoritative pillar article of at least 1200 words.\n\n\
TAXONOMY AND METADATA:\n\
1. Tags: 10-15 highly relevant long-tail keywords, technical terms or entities named in the text. \
Avoid generic tags such as \"Technology\" or \"News\". Return them separated only by commas.\n\
2. Categories: 3-5 hierarchical, professional categories for an editorial site, comma separated.\n\
3. SEO meta: title of at most 60 characters, meta description of at most 155 characters, and a \
URL-friendly slug.\n\n\
CONTENT RULES:\n\
- Use Google Search to find the official sites, documentation and download pages of the products \
mentioned.\n\
- Put official links inline in the HTML (<a href=\"...\" target=\"_blank\">), never as a source list \
at the end.\n\
- Use semantic HTML5: H1, H2, H3, tables where useful, lists and bold text.\n\
- Fill seoChecklist with pass, fail or manual_action items and readability with good, ok or \
needs_improvement findings.\n\
- Write all output in the same language as the source article.\n\n\
Article to process:\n",
    );
    prompt.push_str(article_text);
    prompt
}

pub fn deepen_prompt(current: &AnalysisResult) -> String {
    let mut prompt = String::with_capacity(current.html_content.len() + 800);
    prompt.push_str(
        "Expand the existing article to maximise its informational value (E-E-A-T).\n\n\
INSTRUCTIONS:\n\
1. Use Google Search to find new statistics, technical specifications or official download links \
not already present.\n\
2. Add new HTML sections (H2/H3) with the enriched content.\n\
3. Update and extend the tags and categories to cover the new topics, with at least 15 tags in \
total.\n\
- Write all output in the same language as the current content.\n\n\
CURRENT CONTENT:\n",
    );
    prompt.push_str(&current.html_content);
    prompt
}

/// The structured-output schema sent with every request.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "keyPhrase": { "type": "STRING" },
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "slug": { "type": "STRING" },
            "htmlContent": { "type": "STRING" },
            "tags": { "type": "STRING" },
            "categories": { "type": "STRING" },
            "socialMediaPost": { "type": "STRING" },
            "seoChecklist": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "item": { "type": "STRING" },
                        "status": { "type": "STRING", "enum": ["pass", "fail", "manual_action"] },
                        "details": { "type": "STRING" }
                    },
                    "required": ["item", "status", "details"]
                }
            },
            "readability": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "criteria": { "type": "STRING" },
                        "status": { "type": "STRING", "enum": ["good", "ok", "needs_improvement"] },
                        "score": { "type": "STRING" },
                        "message": { "type": "STRING" }
                    },
                    "required": ["criteria", "status", "score", "message"]
                }
            }
        },
        "required": [
            "keyPhrase", "title", "description", "slug", "htmlContent", "tags",
            "categories", "seoChecklist", "socialMediaPost", "readability"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_content() {
        assert!(optimize_prompt("Rust 1.80 released").ends_with("Rust 1.80 released"));

        let current: AnalysisResult = serde_json::from_value(json!({
            "keyPhrase": "k", "title": "t", "description": "d", "slug": "s",
            "htmlContent": "<h1>Body</h1>", "tags": "a", "categories": "b",
            "socialMediaPost": "p", "seoChecklist": [], "readability": []
        }))
        .unwrap();
        assert!(deepen_prompt(&current).ends_with("<h1>Body</h1>"));
    }

    #[test]
    fn test_schema_requires_every_result_field() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 10);
        for field in required {
            assert!(schema["properties"].get(field.as_str().unwrap()).is_some());
        }
    }
}
