//! High-score persistence boundary
//!
//! Scores live behind a small HTTP API: `GET /scores` returns the ordered
//! list, `POST /scores` persists one entry. The simulation never waits on
//! either call; a failed POST is logged and the in-memory score stays
//! authoritative for the session.

use serde::{Deserialize, Serialize};

/// One row of the `GET /scores` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub points: u32,
    pub created_at: String,
}

/// Body of a `POST /scores` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: u32,
}

/// Local cache of the fetched score list, in server order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a `GET /scores` response body
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ScoreEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Highest score on the board (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.points).max()
    }
}

/// Fetch the current score list (WASM only)
#[cfg(target_arch = "wasm32")]
pub async fn fetch_scores() -> Result<ScoreBoard, wasm_bindgen::JsValue> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resp_value = JsFuture::from(window.fetch_with_str("/scores")).await?;
    let resp: web_sys::Response = resp_value.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!(
            "GET /scores failed: {}",
            resp.status()
        )));
    }
    let text = JsFuture::from(resp.text()?).await?;
    let json = text.as_string().unwrap_or_default();
    ScoreBoard::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Persist one score (WASM only). Called exactly once per game-over.
#[cfg(target_arch = "wasm32")]
pub async fn submit_score(points: u32) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let body = serde_json::to_string(&ScoreSubmission { score: points })
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let opts = web_sys::RequestInit::new();
    opts.set_method("POST");
    opts.set_body(&JsValue::from_str(&body));
    let request = web_sys::Request::new_with_str_and_init("/scores", &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: web_sys::Response = resp_value.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!(
            "POST /scores failed: {}",
            resp.status()
        )));
    }
    log::info!("Score {points} persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_list() {
        let json = r#"[
            {"id": 3, "points": 120, "created_at": "2026-08-29 10:00:00"},
            {"id": 1, "points": 80, "created_at": "2026-08-28 09:30:00"}
        ]"#;
        let board = ScoreBoard::from_json(json).unwrap();
        assert_eq!(board.len(), 2);
        // Server order is preserved
        assert_eq!(board.entries[0].points, 120);
        assert_eq!(board.top_score(), Some(120));
    }

    #[test]
    fn test_parse_empty_list() {
        let board = ScoreBoard::from_json("[]").unwrap();
        assert!(board.is_empty());
        assert_eq!(board.top_score(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ScoreBoard::from_json("not json").is_err());
    }

    #[test]
    fn test_submission_body_shape() {
        let body = serde_json::to_string(&ScoreSubmission { score: 40 }).unwrap();
        assert_eq!(body, r#"{"score":40}"#);
    }
}
