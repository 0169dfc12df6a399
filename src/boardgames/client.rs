//! HTTP client for the BoardGameGeek XML API v2.

use super::xml::{parse_game_details, parse_hot_games, parse_search_results};
use super::{BoardGame, BoardGameSearchResult, HotBoardGame};
use crate::error::ClientError;

const SERVICE: &str = "BoardGameGeek";

/// Fetches search results, game details and the trending list.
#[derive(Debug, Clone)]
pub struct BoardGameClient {
    http: reqwest::Client,
    base_url: String,
}

impl BoardGameClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_xml(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("BGG GET {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::warn!("BGG {} returned {}", path, status);
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }
        Ok(body)
    }

    /// Search board games by name.
    pub async fn search(&self, query: &str) -> Result<Vec<BoardGameSearchResult>, ClientError> {
        let xml = self
            .get_xml("/search", &[("query", query), ("type", "boardgame")])
            .await?;
        parse_search_results(&xml)
    }

    /// Full details (with rating statistics) for one game.
    pub async fn details(&self, id: &str) -> Result<BoardGame, ClientError> {
        let xml = self.get_xml("/thing", &[("id", id), ("stats", "1")]).await?;
        parse_game_details(id, &xml)
    }

    /// Currently trending games.
    pub async fn hot(&self) -> Result<Vec<HotBoardGame>, ClientError> {
        let xml = self.get_xml("/hot", &[("type", "boardgame")]).await?;
        parse_hot_games(&xml)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Router};

    use super::*;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fake_bgg() -> Router {
        Router::new()
            .route(
                "/search",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("type").map(String::as_str), Some("boardgame"));
                    format!(
                        r#"<items total="1"><item type="boardgame" id="13"><name type="primary" value="{}"/><yearpublished value="1995"/></item></items>"#,
                        q.get("query").cloned().unwrap_or_default()
                    )
                }),
            )
            .route(
                "/thing",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("stats").map(String::as_str), Some("1"));
                    if q.get("id").map(String::as_str) == Some("13") {
                        r#"<items><item type="boardgame" id="13"><name type="primary" value="CATAN"/><link type="boardgamecategory" id="1" value="Economic"/></item></items>"#
                    } else {
                        "<items></items>"
                    }
                }),
            )
            .route("/hot", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }))
    }

    #[tokio::test]
    async fn test_search_and_details() {
        let base = spawn(fake_bgg()).await;
        let client = BoardGameClient::new(reqwest::Client::new(), format!("{}/", base));

        let hits = client.search("Catan").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Catan");

        let game = client.details("13").await.unwrap();
        assert_eq!(game.name, "CATAN");
        assert_eq!(game.categories, vec!["Economic"]);

        let missing = client.details("404").await.unwrap_err();
        assert!(matches!(missing, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upstream_status_error() {
        let base = spawn(fake_bgg()).await;
        let client = BoardGameClient::new(reqwest::Client::new(), base);
        let err = client.hot().await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
    }
}
