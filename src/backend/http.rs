//! Browser `fetch` client for the game server

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{PlayerStats, RoundSubmission, SkinSelection};
use crate::error::BackendError;
use crate::leaderboard::Leaderboard;
use crate::store::{self, SkinAction};

fn js_err(e: JsValue) -> BackendError {
    BackendError::Network(format!("{e:?}"))
}

/// Talks to the server the Mini App was loaded from
#[derive(Debug, Clone, Default)]
pub struct HttpBackend {
    /// Prefix for every endpoint; empty means same origin
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<String, BackendError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::SameOrigin);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let url = format!("{}{}", self.base_url, path);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_err)?;
        }

        let window = web_sys::window()
            .ok_or_else(|| BackendError::Network("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        if !response.ok() {
            return Err(BackendError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        text.as_string()
            .ok_or_else(|| BackendError::Network("response body is not text".to_string()))
    }

    /// `POST /save_stats`, then read back the updated totals
    pub async fn submit_round(
        &self,
        submission: &RoundSubmission,
    ) -> Result<PlayerStats, BackendError> {
        let body = serde_json::to_string(submission)?;
        self.request("POST", "/save_stats", Some(body)).await?;
        log::info!("Stats saved: {} m, {} beans", submission.score, submission.collected_beans);
        self.fetch_stats(submission.user_id).await
    }

    pub async fn fetch_stats(&self, user_id: i64) -> Result<PlayerStats, BackendError> {
        let text = self.request("GET", &format!("/stats/{user_id}"), None).await?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        if value.get("error").is_some() {
            return Err(BackendError::UnknownPlayer(user_id));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub async fn fetch_leaderboard(&self) -> Result<Leaderboard, BackendError> {
        let text = self.request("GET", "/leaderboard", None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply the purchase rules locally, then persist the new ownership
    pub async fn select_skin(
        &self,
        user_id: i64,
        stats: &mut PlayerStats,
        skin_id: &str,
    ) -> Result<SkinAction, BackendError> {
        let action = store::select_skin(stats, skin_id)?;
        let selection = SkinSelection {
            user_id,
            purchased_skins: stats.purchased_skins.clone(),
            current_skin: stats.current_skin.clone(),
        };
        self.request("POST", "/save_skins", Some(serde_json::to_string(&selection)?))
            .await?;
        Ok(action)
    }
}
