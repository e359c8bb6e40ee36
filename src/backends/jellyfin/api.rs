use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::dto::{
    BaseItemDto, GetEpisodesRequest, GetGenresRequest, GetItemsRequest, GetNextUpRequest,
    GetPlaylistItemsRequest, GetProgramsRequest, GetResumeItemsRequest, GetSuggestionsRequest,
    QueryResult,
};
use super::errors::JellyfinApiError;
use crate::config::{NetworkConfig, ServerConfig};
use crate::constants::{CLIENT_NAME, CLIENT_VERSION, DEVICE_NAME};
use crate::models::{ImageRef, UserId};

pub type ApiResult<T> = Result<T, JellyfinApiError>;

/// Thin request/response client for the list endpoints of a Jellyfin server.
#[derive(Clone)]
pub struct JellyfinApi {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
    user_id: Option<UserId>,
    device_id: String,
}

impl std::fmt::Debug for JellyfinApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JellyfinApi")
            .field("base_url", &self.base_url.as_str())
            .field("user_id", &self.user_id)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl JellyfinApi {
    pub fn new(
        base_url: &str,
        access_token: impl Into<String>,
        user_id: Option<UserId>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(JellyfinApiError::from_reqwest)?;

        // Url::join drops the last path segment unless it ends with '/'
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
            user_id,
            device_id: Uuid::new_v4().simple().to_string(),
        })
    }

    pub fn from_config(server: &ServerConfig, network: &NetworkConfig) -> ApiResult<Self> {
        let user_id = (!server.user_id.is_empty()).then(|| UserId::new(server.user_id.clone()));
        Self::new(
            &server.url,
            server.access_token.clone().unwrap_or_default(),
            user_id,
            Duration::from_secs(network.connection_timeout),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    fn auth_header(&self) -> String {
        format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}", Token="{}""#,
            CLIENT_NAME, DEVICE_NAME, self.device_id, CLIENT_VERSION, self.access_token
        )
    }

    pub fn image_url(&self, image: &ImageRef<'_>, max_height: u32) -> ApiResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("Items/{}/Images/Primary", image.item_id))?;
        url.query_pairs_mut()
            .append_pair("tag", image.tag)
            .append_pair("maxHeight", &max_height.to_string());
        Ok(url)
    }

    async fn get_json<Q, R>(&self, path: &str, query: &Q) -> ApiResult<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Emby-Authorization", self.auth_header())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Jellyfin: {}", e);
                JellyfinApiError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Jellyfin request {} failed: {} - {}", path, status, body);
            return Err(JellyfinApiError::from_status(status.as_u16(), body));
        }

        let body = response.bytes().await.map_err(JellyfinApiError::from_reqwest)?;
        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", path, e);
            JellyfinApiError::from(e)
        })
    }

    /// Requests that leave `user_id` unset are scoped to the api's own user.
    fn with_user(&self, user_id: &Option<UserId>) -> Option<UserId> {
        user_id.clone().or_else(|| self.user_id.clone())
    }

    pub async fn get_items(&self, request: &GetItemsRequest) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        self.get_json("Items", &request).await
    }

    pub async fn get_resume_items(
        &self,
        request: &GetResumeItemsRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        self.get_json("UserItems/Resume", &request).await
    }

    pub async fn get_next_up(
        &self,
        request: &GetNextUpRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        self.get_json("Shows/NextUp", &request).await
    }

    pub async fn get_suggestions(
        &self,
        request: &GetSuggestionsRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        self.get_json("Items/Suggestions", &request).await
    }

    pub async fn get_playlist_items(
        &self,
        request: &GetPlaylistItemsRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        let path = format!("Playlists/{}/Items", request.playlist_id);
        self.get_json(&path, &request).await
    }

    pub async fn get_genres(
        &self,
        request: &GetGenresRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        self.get_json("Genres", &request).await
    }

    pub async fn get_programs(
        &self,
        request: &GetProgramsRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        self.get_json("LiveTv/Programs", &request).await
    }

    pub async fn get_episodes(
        &self,
        request: &GetEpisodesRequest,
    ) -> ApiResult<QueryResult<BaseItemDto>> {
        let mut request = request.clone();
        request.user_id = self.with_user(&request.user_id);
        let path = format!("Shows/{}/Episodes", request.series_id);
        self.get_json(&path, &request).await
    }
}
