//! Prompt templates and response schemas, one pair per analysis operation.
//!
//! Schemas use the Generative Language API's OpenAPI-style type vocabulary
//! (`OBJECT`, `ARRAY`, `STRING`, `NUMBER`).

use crate::models::Article;
use serde_json::{json, Value};

pub fn compare_prompt(h1: &str, h2: &str) -> String {
    format!(
        "Compare these two news headlines for objective similarity, insights into their \
         perspectives, and key differences:\n1. {}\n2. {}",
        h1, h2
    )
}

pub fn compare_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "similarity": {"type": "NUMBER", "description": "Similarity score from 0 to 1"},
            "insights": {"type": "STRING"},
            "differences": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["similarity", "insights", "differences"]
    })
}

pub fn cluster_prompt(articles: &[Article]) -> String {
    let input = articles
        .iter()
        .map(|a| format!("- {} ({})", a.headline, a.url))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Group these articles into thematic clusters. For each cluster, provide a title, a \
         short summary, and the list of URLs of articles belonging to it:\n{}",
        input
    )
}

pub fn cluster_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {"type": "STRING"},
                "summary": {"type": "STRING"},
                "articleUrls": {"type": "ARRAY", "items": {"type": "STRING"}}
            },
            "required": ["title", "summary", "articleUrls"]
        }
    })
}

pub fn strategic_summary_prompt(articles: &[Article]) -> String {
    let input = headlines(articles);
    format!(
        "Provide a strategic high-level summary of these news trends, metrics (0-100) for \
         Stability, Economy, Security, and Tech, and 3-5 key takeaways:\n{}",
        input
    )
}

pub fn strategic_summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "metrics": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": {"type": "STRING"},
                        "value": {"type": "NUMBER"}
                    },
                    "required": ["category", "value"]
                }
            },
            "key_takeaways": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["summary", "metrics", "key_takeaways"]
    })
}

pub fn bias_prompt(articles: &[Article]) -> String {
    format!(
        "Analyze these headlines for editorial bias. Return an array of bias scores from 0 \
         (neutral) to 100 (extreme bias):\n{}",
        headlines(articles)
    )
}

pub fn bias_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "bias_score": {"type": "NUMBER"}
            },
            "required": ["bias_score"]
        }
    })
}

pub fn translate_prompt(text: &str, lang: &str) -> String {
    format!("Translate the following text to {}:\n\n{}", lang, text)
}

pub fn translate_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "translated_text": {"type": "STRING"}
        },
        "required": ["translated_text"]
    })
}

pub fn sentiment_prompt(text: &str) -> String {
    format!(
        "Analyze the sentiment of this text. Return label (positive, neutral, negative), a \
         score (0-1), and an explanation:\n\n{}",
        text
    )
}

pub fn sentiment_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "label": {"type": "STRING", "enum": ["positive", "neutral", "negative"]},
            "score": {"type": "NUMBER"},
            "explanation": {"type": "STRING"}
        },
        "required": ["label", "score", "explanation"]
    })
}

// Pipeline variants: same judgments, aggregated over a headline set

pub fn pipeline_summary_prompt(headlines: &str) -> String {
    format!(
        "Analyze these news headlines and provide a strategic summary and 3 key takeaways:\n{}",
        headlines
    )
}

pub fn pipeline_summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "takeaways": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["summary", "takeaways"]
    })
}

pub fn pipeline_sentiment_prompt(headlines: &str) -> String {
    format!("Analyze the overall sentiment of these headlines:\n{}", headlines)
}

pub fn pipeline_sentiment_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "label": {"type": "STRING", "enum": ["positive", "neutral", "negative"]},
            "score": {"type": "NUMBER"}
        },
        "required": ["label", "score"]
    })
}

pub fn pipeline_bias_prompt(headlines: &str) -> String {
    format!(
        "Detect editorial bias and propaganda score (0-100) for these headlines. Provide \
         evidence:\n{}",
        headlines
    )
}

pub fn pipeline_bias_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {"type": "NUMBER"},
            "label": {"type": "STRING"},
            "evidence": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["score", "label", "evidence"]
    })
}

pub fn headlines(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| a.headline.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(headline: &str, url: &str) -> Article {
        serde_json::from_value(serde_json::json!({
            "headline": headline,
            "url": url,
        }))
        .unwrap()
    }

    #[test]
    fn test_compare_prompt_includes_both_headlines() {
        let prompt = compare_prompt("Fed holds rates", "Central bank pauses hikes");
        assert!(prompt.contains("1. Fed holds rates"));
        assert!(prompt.contains("2. Central bank pauses hikes"));
    }

    #[test]
    fn test_cluster_prompt_lists_headline_and_url() {
        let articles = vec![
            article("Summit concludes", "https://e.com/1"),
            article("Trade deal signed", "https://e.com/2"),
        ];
        let prompt = cluster_prompt(&articles);
        assert!(prompt.contains("- Summit concludes (https://e.com/1)"));
        assert!(prompt.contains("- Trade deal signed (https://e.com/2)"));
    }

    #[test]
    fn test_sentiment_schema_constrains_labels() {
        let schema = sentiment_schema();
        let labels = schema["properties"]["label"]["enum"].as_array().unwrap();
        assert_eq!(labels.len(), 3);
        assert!(labels.contains(&serde_json::json!("neutral")));
    }

    #[test]
    fn test_bias_schema_is_array_of_scores() {
        let schema = bias_schema();
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(schema["items"]["required"][0], "bias_score");
    }

    #[test]
    fn test_cluster_schema_uses_wire_field_name() {
        let schema = cluster_schema();
        assert!(schema["items"]["properties"].get("articleUrls").is_some());
    }
}
