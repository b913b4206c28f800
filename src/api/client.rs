//! Instagram API HTTP client.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::session::{error_chain, SessionConfig};
use crate::api::shortcode::shortcode_to_media_id;
use crate::api::types::MediaInfoResponse;
use crate::api::PostFetcher;
use crate::error::{Error, Result};
use crate::media::{parse_media_info, MediaItem, Post};
use crate::output::create_download_bar;
use crate::source::PostReference;

/// Instagram private API base URL.
const API_BASE: &str = "https://i.instagram.com/api/v1";

/// Web app id expected in the `X-IG-App-ID` header.
const IG_APP_ID: &str = "936619743392459";

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Longest body excerpt kept in error messages.
const BODY_EXCERPT_LEN: usize = 300;

/// Instagram API client bound to one session.
pub struct InstagramApi {
    client: Client,
    csrf_token: Option<String>,
    authenticated: bool,
}

impl InstagramApi {
    /// Create a client from the session configuration.
    pub fn new(session: &SessionConfig) -> Result<Self> {
        Ok(Self {
            client: session.http_client()?,
            csrf_token: session.csrf_token().map(str::to_string),
            authenticated: session.is_authenticated(),
        })
    }

    /// Build common headers for API requests.
    fn build_headers(&self, referer: &str) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();

        headers.insert("x-ig-app-id", header::HeaderValue::from_static(IG_APP_ID));
        headers.insert(
            "x-requested-with",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if let Ok(value) = header::HeaderValue::from_str(referer) {
            headers.insert(header::REFERER, value);
        }

        if let Some(token) = &self.csrf_token {
            if let Ok(value) = header::HeaderValue::from_str(token) {
                headers.insert("x-csrftoken", value);
            }
        }

        headers
    }

    /// Fetch the media info of a post.
    pub async fn get_media_info(&self, shortcode: &str) -> Result<MediaInfoResponse> {
        let media_id = shortcode_to_media_id(shortcode)?;
        let url = format!("{}/media/{}/info/", API_BASE, media_id);
        let referer = format!("https://www.instagram.com/p/{}/", shortcode);

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.build_headers(&referer))
            .send()
            .await
            .map_err(|e| {
                Error::Fetch(format!("{}: request failed: {}", shortcode, error_chain(&e)))
            })?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        // Anonymous requests get bounced to the login page
        if response.url().path().starts_with("/accounts/login") {
            return Err(Error::AuthRequired(format!(
                "{}: redirected to login page",
                shortcode
            )));
        }

        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &text, shortcode, self.authenticated));
        }

        let media_info: MediaInfoResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Fetch(format!(
                "{}: failed to parse media info: {} - Response: {}",
                shortcode,
                e,
                excerpt(&text)
            ))
        })?;

        if media_info.status.as_deref() == Some("fail") {
            return Err(classify_failure(status, &text, shortcode, self.authenticated));
        }

        Ok(media_info)
    }

    /// Download a file from a URL.
    pub async fn download_file(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::RateLimited(format!("media download HTTP {}", status)));
            }
            return Err(Error::Fetch(format!(
                "Failed to download file: HTTP {}",
                status
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl PostFetcher for InstagramApi {
    async fn resolve(&self, reference: &PostReference) -> Result<Post> {
        let shortcode = reference.shortcode()?;
        let media_info = self.get_media_info(&shortcode).await?;
        parse_media_info(reference, &shortcode, media_info)
    }

    async fn download(&self, item: &MediaItem, dest: &Path) -> Result<u64> {
        let response = self.download_file(&item.url).await?;

        let content_length = response.content_length();
        let progress = content_length
            .filter(|len| *len > PROGRESS_THRESHOLD)
            .map(create_download_bar);

        // Stream to file
        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| Error::Fetch(format!("Stream error: {}", error_chain(&e))))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(downloaded)
    }
}

/// Map a failed media-info response to the per-post error taxonomy.
pub fn classify_failure(
    status: StatusCode,
    body: &str,
    shortcode: &str,
    authenticated: bool,
) -> Error {
    let envelope: MediaInfoResponse = serde_json::from_str(body).unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS || envelope.is_throttled() {
        return Error::RateLimited(format!("{}: HTTP {}", shortcode, status));
    }

    if envelope.requires_login() {
        return Error::AuthRequired(shortcode.to_string());
    }

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(shortcode.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if authenticated => Error::AuthRequired(
            format!("{}: session cookies were rejected (HTTP {})", shortcode, status),
        ),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthRequired(format!(
            "{}: HTTP {}, try again with --cookies",
            shortcode, status
        )),
        StatusCode::BAD_REQUEST
            if envelope
                .message
                .as_deref()
                .map(|m| {
                    let m = m.to_lowercase();
                    m.contains("not found") || m.contains("invalid media")
                })
                .unwrap_or(false) =>
        {
            Error::NotFound(shortcode.to_string())
        }
        _ => Error::Fetch(format!(
            "{}: HTTP {} - {}",
            shortcode,
            status,
            excerpt(body)
        )),
    }
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;
    use crate::api::session::CookieSet;
    use crate::media::MediaKind;

    fn session(timeout: Duration) -> SessionConfig {
        SessionConfig {
            cookies: CookieSet::default(),
            proxy: None,
            verify_ssl: true,
            user_agent: "instagram-downloader-test".to_string(),
            timeout,
        }
    }

    /// Serve one media response whose body is written in timed chunks.
    async fn serve_chunks(chunks: Vec<(Duration, &'static [u8])>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let total: usize = chunks.iter().map(|(_, chunk)| chunk.len()).sum();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\n\r\n",
                total
            );
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for (pause, chunk) in chunks {
                tokio::time::sleep(pause).await;
                if socket.write_all(chunk).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
            }
        });

        format!("http://{}/clip.mp4", addr)
    }

    #[tokio::test]
    async fn test_slow_download_outlasting_timeout_completes() {
        let pause = Duration::from_millis(700);
        let url = serve_chunks(vec![
            (pause, b"0123456789"),
            (pause, b"abcdefghij"),
            (pause, b"ABCDEFGHIJ"),
        ])
        .await;

        let api = InstagramApi::new(&session(Duration::from_secs(1))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("1.mp4");
        let item = MediaItem::new(MediaKind::Video, url, "mp4", 1);

        let written = api.download(&item, &dest).await.unwrap();

        assert_eq!(written, 30);
        assert_eq!(
            std::fs::read(&dest).unwrap(),
            b"0123456789abcdefghijABCDEFGHIJ"
        );
    }

    #[tokio::test]
    async fn test_stalled_download_fails() {
        let url = serve_chunks(vec![
            (Duration::ZERO, b"0123456789"),
            (Duration::from_secs(3), b"abcdefghij"),
        ])
        .await;

        let api = InstagramApi::new(&session(Duration::from_secs(1))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let item = MediaItem::new(MediaKind::Video, url, "mp4", 1);

        let err = api
            .download(&item, &dir.path().join("1.mp4"))
            .await
            .unwrap_err();
        match err {
            Error::Fetch(message) => assert!(message.contains("timed out"), "{}", message),
            other => panic!("expected a fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_status_and_body() {
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "", "ABC", false),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::BAD_REQUEST,
                r#"{"message": "Please wait a few minutes before you try again.", "status": "fail"}"#,
                "ABC",
                true
            ),
            Error::RateLimited(_)
        ));
    }

    #[test]
    fn test_login_required() {
        assert!(matches!(
            classify_failure(
                StatusCode::OK,
                r#"{"message": "login_required", "status": "fail"}"#,
                "ABC",
                false
            ),
            Error::AuthRequired(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::BAD_REQUEST,
                r#"{"require_login": true, "status": "fail"}"#,
                "ABC",
                false
            ),
            Error::AuthRequired(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "", "ABC", false),
            Error::AuthRequired(_)
        ));
    }

    #[test]
    fn test_not_found() {
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, "<html></html>", "ABC", false),
            Error::NotFound(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::BAD_REQUEST,
                r#"{"message": "Media not found or unavailable", "status": "fail"}"#,
                "ABC",
                true
            ),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_unknown_failure() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops", "ABC", true);
        assert!(matches!(err, Error::Fetch(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(BODY_EXCERPT_LEN + 10);
        assert_eq!(excerpt(&long).chars().count(), BODY_EXCERPT_LEN);
        assert_eq!(excerpt("short"), "short");
    }
}
