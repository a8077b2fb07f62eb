//! QQ bot OpenAPI transport.
//!
//! Implements [`GenericTransport`] over HTTPS:
//! - Guild channel messages (JSON, or multipart when a local image is attached)
//! - Group media upload
//! - Group messages
//!
//! Access tokens are fetched from the app token endpoint and cached until
//! shortly before they expire.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{RequestBuilder, Response, header::AUTHORIZATION, multipart};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    error::RelayError,
    types::{MediaHandle, Res, Void},
};

use super::{ChannelTextRequest, GenericTransport, GroupMediaRequest, GroupMessageRequest, Transport};

/// Refresh the access token this long before the platform expires it.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

// Extra methods on `Transport` applied by the QQ implementation.

impl Transport {
    /// Creates a new QQ OpenAPI transport.
    pub fn qq(config: &Config) -> Res<Self> {
        let transport = QqTransport::new(config)?;
        Ok(Self { inner: Arc::new(transport) })
    }
}

impl From<QqTransport> for Transport {
    fn from(transport: QqTransport) -> Self {
        Self { inner: Arc::new(transport) }
    }
}

// Structs.

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[serde_as]
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    // The endpoint sends this as a string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    expires_in: i64,
}

/// QQ OpenAPI transport implementation.
pub struct QqTransport {
    client: reqwest::Client,
    api_base: String,
    token_url: String,
    app_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

impl QqTransport {
    /// Create a new QQ transport.
    #[instrument(name = "QqTransport::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.request_timeout_secs)).build()?;

        info!("Using QQ API base: {}", config.api_base());

        Ok(Self {
            client,
            api_base: config.api_base().to_string(),
            token_url: config.token_url.clone(),
            app_id: config.app_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        })
    }

    /// Get a valid access token, fetching a fresh one if the cached one is about to expire.
    async fn access_token(&self) -> Res<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref()
            && token.expires_at.checked_sub_signed(TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS)).is_some_and(|refresh_at| refresh_at > Utc::now())
        {
            return Ok(token.value.clone());
        }

        debug!("Fetching a new access token ...");

        let body = json!({ "appId": self.app_id, "clientSecret": self.client_secret });
        let response = self.client.post(&self.token_url).json(&body).send().await?;
        let response: TokenResponse = read_json(&self.token_url, response).await?;

        let expires_at = TimeDelta::try_seconds(response.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| anyhow::anyhow!("Token endpoint returned an out-of-range expiry: {}", response.expires_in))?;

        let value = response.access_token;
        *cached = Some(AccessToken { value: value.clone(), expires_at });

        Ok(value)
    }

    /// Attach the authorization headers to a request.
    async fn authorize(&self, builder: RequestBuilder) -> Res<RequestBuilder> {
        let token = self.access_token().await?;

        Ok(builder.header(AUTHORIZATION, format!("QQBot {token}")).header("X-Union-Appid", &self.app_id))
    }
}

#[async_trait]
impl GenericTransport for QqTransport {
    #[instrument(skip(self, request), fields(channel_id = %request.channel_id, msg_id = %request.msg_id))]
    async fn send_channel_text(&self, request: ChannelTextRequest) -> Void {
        let endpoint = format!("{}/channels/{}/messages", self.api_base, request.channel_id);

        let builder = match &request.file_image {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "image".to_string());

                let mut form = multipart::Form::new()
                    .text("content", request.content.clone())
                    .text("msg_id", request.msg_id.clone())
                    .part("file_image", multipart::Part::bytes(bytes).file_name(file_name));

                if let Some(url) = &request.image_url {
                    form = form.text("image", url.clone());
                }

                self.client.post(&endpoint).multipart(form)
            }
            None => self.client.post(&endpoint).json(&channel_message_body(&request)),
        };

        let response = self.authorize(builder).await?.send().await?;
        check(&endpoint, response).await?;

        Ok(())
    }

    #[instrument(skip(self, request), fields(group_openid = %request.group_openid))]
    async fn upload_group_media(&self, request: GroupMediaRequest) -> Res<MediaHandle> {
        let endpoint = format!("{}/v2/groups/{}/files", self.api_base, request.group_openid);

        let builder = self.client.post(&endpoint).json(&group_media_body(&request));
        let response = self.authorize(builder).await?.send().await?;

        read_json(&endpoint, response).await
    }

    #[instrument(skip(self, request), fields(group_openid = %request.group_openid, msg_seq = request.msg_seq))]
    async fn send_group_message(&self, request: GroupMessageRequest) -> Void {
        let endpoint = format!("{}/v2/groups/{}/messages", self.api_base, request.group_openid);

        let builder = self.client.post(&endpoint).json(&group_message_body(&request));
        let response = self.authorize(builder).await?.send().await?;
        check(&endpoint, response).await?;

        Ok(())
    }
}

// Helpers.

/// JSON body for a guild channel message without a local file.
fn channel_message_body(request: &ChannelTextRequest) -> Value {
    let mut body = json!({
        "content": request.content,
        "msg_id": request.msg_id,
    });

    if let Some(url) = &request.image_url {
        body["image"] = json!(url);
    }

    body
}

/// JSON body for a group media upload.
fn group_media_body(request: &GroupMediaRequest) -> Value {
    let mut body = json!({
        "file_type": request.file_type.code(),
        "srv_send_msg": false,
    });

    if let Some(url) = &request.url {
        body["url"] = json!(url);
    }

    if let Some(data) = &request.file_data {
        body["file_data"] = json!(data);
    }

    body
}

/// JSON body for a group message.
fn group_message_body(request: &GroupMessageRequest) -> Value {
    let mut body = json!({
        "content": request.content,
        "msg_type": request.msg_type.code(),
        "msg_id": request.msg_id,
        "msg_seq": request.msg_seq,
    });

    if let Some(media) = &request.media {
        body["media"] = json!({ "file_info": media.file_info });
    }

    body
}

/// Turn a non-success response into a [`RelayError::Api`].
async fn check(endpoint: &str, response: Response) -> Res<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(RelayError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    }
    .into())
}

async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Res<T> {
    let response = check(endpoint, response).await?;
    Ok(response.json::<T>().await?)
}

// Tests.
