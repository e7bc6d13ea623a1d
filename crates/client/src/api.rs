//! HTTP client for the review gateway

use anyhow::{anyhow, Context, Result};
use moviereview_common::domain::{Comment, NewComment, NewMovie};
use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Raw gateway answer
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode a successful body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("Unexpected response body: {}", self.body))
    }
}

/// The movie payload the gateway expects; comments always start empty
#[derive(Serialize)]
struct MoviePayload<'a> {
    #[serde(flatten)]
    movie: &'a NewMovie,
    comments: Vec<Comment>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("Invalid backend URL: {}", base_url));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    /// Join path segments onto the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Invalid backend URL: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Reply> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "Sending request");

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let status = response.status();
        let body = response.text().await?;

        Ok(Reply { status, body })
    }

    pub async fn list_movies(&self) -> Result<Reply> {
        self.send::<()>(Method::GET, &["movies", "get"], None).await
    }

    pub async fn add_movie(&self, movie: &NewMovie) -> Result<Reply> {
        let payload = MoviePayload { movie, comments: Vec::new() };
        self.send(Method::POST, &["movies", "add"], Some(&payload)).await
    }

    pub async fn delete_movie(&self, name: &str) -> Result<Reply> {
        self.send::<()>(Method::DELETE, &["movies", "delete", name], None).await
    }

    pub async fn add_comment(&self, comment: &NewComment) -> Result<Reply> {
        self.send(Method::POST, &["movies", "comments", "add"], Some(comment)).await
    }

    pub async fn delete_comment(&self, movie_name: &str, user_name: &str) -> Result<Reply> {
        self.send::<()>(
            Method::DELETE,
            &["movies", "comments", "delete", movie_name, user_name],
            None,
        )
        .await
    }

    pub async fn average_score(&self, movie_name: &str) -> Result<Reply> {
        self.send::<()>(
            Method::POST,
            &["movies", "comments", movie_name, "average_score"],
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://127.0.0.1:8000");
        let url = api
            .endpoint(&["movies", "comments", "Blade Runner", "average_score"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/movies/comments/Blade%20Runner/average_score"
        );

        let url = api.endpoint(&["movies", "delete", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/movies/delete/a%2Fb");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("http://localhost:9000/api/");
        let url = api.endpoint(&["movies", "get"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/movies/get");
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_movie_payload_carries_empty_comments() {
        let movie = NewMovie {
            name: "Dune".to_string(),
            director: "Villeneuve".to_string(),
            open_date: "2021-10-22".to_string(),
            genre: "SciFi".to_string(),
            poster_url: "http://x/p.jpg".to_string(),
        };
        let value = serde_json::to_value(MoviePayload { movie: &movie, comments: Vec::new() }).unwrap();
        assert_eq!(value["name"], "Dune");
        assert_eq!(value["comments"], serde_json::json!([]));
    }
}
