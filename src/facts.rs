// facts.rs — location facts from the hosted generative service
//
// Thin client around `models/{model}:generateContent` with a JSON response
// schema and google-search grounding. Everything here runs on a worker thread;
// any failure is logged and surfaced to the UI as "no data".

use anyhow::{anyhow, Context as _};
use serde::Deserialize;
use std::sync::mpsc::Sender;
use std::thread;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-3-flash-preview";

/// Structured record the service is asked to return.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub description: String,
    pub elevation: String,
    pub location: String,
    pub facts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

/// Grounding citation; chunks without a web reference are kept but unlinked.
#[derive(Debug, Clone, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone)]
pub struct LocationReport {
    pub info: LocationInfo,
    pub sources: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

pub fn api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
}

fn build_request_body(context: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{
                "text": format!(
                    "Provide detailed immersive facts for a 360 experience of: {context}. \
                     Include current real-world status like weather or recent news if applicable. \
                     Return structured data about the location including elevation and key facts."
                )
            }]
        }],
        "tools": [{ "googleSearch": {} }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "elevation": { "type": "STRING" },
                    "location": { "type": "STRING" },
                    "facts": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["name", "description", "elevation", "location", "facts"]
            }
        }
    })
}

fn parse_response(resp: GenerateResponse) -> anyhow::Result<LocationReport> {
    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("empty response: no candidates"))?;

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| anyhow!("candidate carries no text part"))?;

    let info: LocationInfo =
        serde_json::from_str(&text).context("candidate text is not the expected schema")?;

    let sources = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();

    Ok(LocationReport { info, sources })
}

pub fn fetch_location_facts(
    client: &reqwest::blocking::Client,
    api_key: &str,
    context: &str,
) -> anyhow::Result<LocationReport> {
    let url = format!("{API_BASE}/{MODEL}:generateContent");

    let resp = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(&build_request_body(context))
        .send()
        .context("facts request failed")?
        .error_for_status()
        .context("facts service returned an error status")?;

    let body: GenerateResponse = resp.json().context("facts response is not valid JSON")?;
    parse_response(body)
}

/// Fires a fetch on a background thread. Sends `None` on any failure so the
/// UI can fall back to "no data available".
pub fn spawn_fetch(context: String, tx: Sender<Option<LocationReport>>) {
    thread::spawn(move || {
        let Some(key) = api_key() else {
            log::warn!("GEMINI_API_KEY not set, skipping facts fetch");
            let _ = tx.send(None);
            return;
        };

        let client = match reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                log::warn!("failed to build HTTP client: {e}");
                let _ = tx.send(None);
                return;
            }
        };

        log::info!("fetching location facts for {context:?}");
        match fetch_location_facts(&client, &key, &context) {
            Ok(report) => {
                let _ = tx.send(Some(report));
            }
            Err(e) => {
                log::warn!("location facts unavailable: {e:#}");
                let _ = tx.send(None);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "candidates": [{
            "content": {
                "parts": [{
                    "text": "{\"name\":\"Mount Everest Base Camp\",\"description\":\"South base camp in Nepal.\",\"elevation\":\"5,364 m\",\"location\":\"Khumjung, Nepal\",\"facts\":[\"Trek takes about 12 days.\",\"Kala Patthar overlooks the camp.\"]}"
                }]
            },
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://example.org/ebc", "title": "Everest Base Camp" } },
                    { "retrievedContext": { "uri": "ignored" } }
                ]
            }
        }]
    }"#;

    #[test]
    fn parses_full_response() {
        let resp: GenerateResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = parse_response(resp).unwrap();
        assert_eq!(report.info.name, "Mount Everest Base Camp");
        assert_eq!(report.info.facts.len(), 2);
        assert_eq!(report.sources.len(), 2);
        assert_eq!(
            report.sources[0].web.as_ref().unwrap().uri,
            "https://example.org/ebc"
        );
        assert!(report.sources[1].web.is_none());
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(parse_response(resp).is_err());
    }

    #[test]
    fn missing_grounding_metadata_yields_no_sources() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [{ "text":
                    "{\"name\":\"x\",\"description\":\"d\",\"elevation\":\"e\",\"location\":\"l\",\"facts\":[]}"
                }] }
            }]
        }"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        let report = parse_response(resp).unwrap();
        assert!(report.sources.is_empty());
    }

    #[test]
    fn malformed_candidate_text_is_an_error() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "not json" }] }
            }]
        }"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert!(parse_response(resp).is_err());
    }

    #[test]
    fn request_body_pins_schema_and_search_tool() {
        let body = build_request_body("Mount Everest Base Camp");
        assert!(body["tools"][0].get("googleSearch").is_some());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let required = body["generationConfig"]["responseSchema"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 5);
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Mount Everest Base Camp"));
    }
}
