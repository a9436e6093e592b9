//! `reqwest`-backed implementation of the backend boundary, push stream
//! included.

use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, future::BoxFuture};
use reqwest::{Client, header::ACCEPT};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::state::{Track, VoteTally};

use super::{
    ApiError, ApiResult, JukeboxBackend, VoteStream,
    models::{ErrorBody, NowPlayingResponse, PlayedRequest, QueueResponse, VoteRequest},
};

/// HTTP client for the jukebox backend.
#[derive(Clone)]
pub struct HttpJukeboxApi {
    client: Client,
    stream_client: Client,
    base_url: Arc<str>,
}

impl HttpJukeboxApi {
    /// Build the client pair for `base_url`.
    ///
    /// `request_timeout` bounds every call except the push stream, which must
    /// stay open indefinitely and therefore only gets a connect timeout.
    pub fn new(base_url: &str, request_timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;
        let stream_client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;
        Ok(Self {
            client,
            stream_client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: String) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestStatus { path, status });
        }
        response
            .json()
            .await
            .map_err(|source| ApiError::DecodeResponse { path, source })
    }

    async fn post_json<B>(&self, path: String, body: &B) -> ApiResult<()>
    where
        B: Serialize,
    {
        let response = self
            .client
            .post(self.url(&path))
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.clone(),
                source,
            })?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        // the backend reports the cause in the body, not the status code
        let fallback = format!("status {status}");
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(ApiError::Rejected {
            message: body.into_message(&fallback),
        })
    }
}

impl JukeboxBackend for HttpJukeboxApi {
    fn fetch_now_playing(&self, owner_id: &str) -> BoxFuture<'static, ApiResult<Option<Track>>> {
        let api = self.clone();
        let path = format!("now-playing/{owner_id}");
        Box::pin(async move {
            let response: NowPlayingResponse = api.get_json(path).await?;
            Ok(response.item.map(Track::from))
        })
    }

    fn fetch_queue(&self, owner_id: &str) -> BoxFuture<'static, ApiResult<Vec<Track>>> {
        let api = self.clone();
        let path = format!("upcoming-tracks/{owner_id}");
        Box::pin(async move {
            let response: QueueResponse = api.get_json(path).await?;
            Ok(response.queue.into_iter().map(Track::from).collect())
        })
    }

    fn submit_vote(
        &self,
        owner_id: &str,
        track_id: &str,
        guest_id: &str,
    ) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        let owner_id = owner_id.to_string();
        let track_id = track_id.to_string();
        let guest_id = guest_id.to_string();
        Box::pin(async move {
            let body = VoteRequest {
                owner_id: &owner_id,
                track_id: &track_id,
                client_id: &guest_id,
            };
            api.post_json("jukebox/vote".into(), &body).await
        })
    }

    fn report_played(&self, owner_id: &str, track_id: &str) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        let owner_id = owner_id.to_string();
        let track_id = track_id.to_string();
        Box::pin(async move {
            let body = PlayedRequest {
                owner_id: &owner_id,
                track_id: &track_id,
            };
            api.post_json("jukebox/played".into(), &body).await
        })
    }

    fn subscribe_votes(&self, owner_id: &str) -> BoxFuture<'static, ApiResult<VoteStream>> {
        let client = self.stream_client.clone();
        let path = format!("topic/votes/{owner_id}");
        let url = self.url(&path);
        Box::pin(async move {
            let response = client
                .get(url)
                .header(ACCEPT, "text/event-stream")
                .send()
                .await
                .map_err(|source| ApiError::RequestSend {
                    path: path.clone(),
                    source,
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::RequestStatus { path, status });
            }

            let mut body = response.bytes_stream();
            let stream = async_stream::stream! {
                let mut parser = EventStreamParser::default();
                while let Some(chunk) = body.next().await {
                    match chunk {
                        Ok(chunk) => {
                            for payload in parser.push(&chunk) {
                                yield serde_json::from_str::<VoteTally>(&payload)
                                    .map_err(|source| ApiError::DecodeTally { source });
                            }
                        }
                        Err(source) => {
                            yield Err(ApiError::RequestSend { path: path.clone(), source });
                            return;
                        }
                    }
                }
                debug!(path = %path, "vote stream ended");
            };
            Ok(stream.boxed())
        })
    }
}

/// Incremental parser extracting `data:` payloads from an event-stream body.
///
/// Chunks split lines at arbitrary byte positions, so lines are buffered until
/// their newline arrives; an event's payload is complete at the first blank
/// line after its `data:` fields. Comment and `event:` lines are skipped.
#[derive(Default)]
struct EventStreamParser {
    buffer: String,
    data: Vec<String>,
}

impl EventStreamParser {
    /// Feed one chunk, returning every event payload it completed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut completed = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = line.strip_prefix("data:") {
                self.data.push(payload.trim_start().to_string());
            } else if line.is_empty() && !self.data.is_empty() {
                completed.push(self.data.join("\n"));
                self.data.clear();
            }
        }
        completed
    }
}
