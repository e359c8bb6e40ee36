//! Adapters between endpoint-specific request values and the pager's
//! `(start_index, limit, enable_total_record_count)` pagination contract.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::backends::jellyfin::dto::{
    BaseItemDto, GetEpisodesRequest, GetGenresRequest, GetItemsRequest, GetNextUpRequest,
    GetPlaylistItemsRequest, GetProgramsRequest, GetResumeItemsRequest, GetSuggestionsRequest,
    QueryResult,
};
use crate::backends::{JellyfinApi, JellyfinApiError};
use crate::constants::DEFAULT_PAGE_SIZE;

/// Knows how to page one remote list endpoint.
///
/// `prepare` never mutates its input; `execute` performs exactly one call
/// and hands back whatever the client returned, errors included.
#[async_trait]
pub trait RequestHandler<C>: Send + Sync + 'static
where
    C: Send + Sync + 'static,
{
    type Request: Clone + Send + Sync + Debug + 'static;

    fn prepare(
        &self,
        request: &Self::Request,
        start_index: u32,
        limit: u32,
        enable_total_record_count: bool,
    ) -> Self::Request;

    async fn execute(
        &self,
        client: &C,
        request: Self::Request,
    ) -> Result<QueryResult<BaseItemDto>, JellyfinApiError>;
}

/// Implements `RequestHandler<JellyfinApi>` for a request type whose
/// endpoint understands `enableTotalRecordCount`.
macro_rules! paged_handler {
    ($(#[$meta:meta])* $handler:ident, $request:ty, $method:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $handler;

        #[async_trait]
        impl RequestHandler<JellyfinApi> for $handler {
            type Request = $request;

            fn prepare(
                &self,
                request: &Self::Request,
                start_index: u32,
                limit: u32,
                enable_total_record_count: bool,
            ) -> Self::Request {
                let mut request = request.clone();
                request.start_index = Some(start_index);
                request.limit = Some(limit);
                request.enable_total_record_count = Some(enable_total_record_count);
                request
            }

            async fn execute(
                &self,
                client: &JellyfinApi,
                request: Self::Request,
            ) -> Result<QueryResult<BaseItemDto>, JellyfinApiError> {
                client.$method(&request).await
            }
        }
    };
}

paged_handler!(
    /// Library grids, search results, collections.
    ItemsRequestHandler,
    GetItemsRequest,
    get_items
);
paged_handler!(
    /// Continue watching.
    ResumeItemsRequestHandler,
    GetResumeItemsRequest,
    get_resume_items
);
paged_handler!(NextUpRequestHandler, GetNextUpRequest, get_next_up);
paged_handler!(GenresRequestHandler, GetGenresRequest, get_genres);
paged_handler!(ProgramsRequestHandler, GetProgramsRequest, get_programs);

/// Suggestions come back without a meaningful total, so the page length
/// stands in for it. A count request is answered with one page of up to
/// `DEFAULT_PAGE_SIZE` suggestions instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionsRequestHandler;

#[async_trait]
impl RequestHandler<JellyfinApi> for SuggestionsRequestHandler {
    type Request = GetSuggestionsRequest;

    fn prepare(
        &self,
        request: &Self::Request,
        start_index: u32,
        limit: u32,
        enable_total_record_count: bool,
    ) -> Self::Request {
        let mut request = request.clone();
        request.start_index = Some(start_index);
        request.limit = Some(limit);
        request.enable_total_record_count = Some(enable_total_record_count);
        request
    }

    async fn execute(
        &self,
        client: &JellyfinApi,
        request: Self::Request,
    ) -> Result<QueryResult<BaseItemDto>, JellyfinApiError> {
        let mut result = client.get_suggestions(&request).await?;
        if result.total_record_count == 0 {
            if request.limit == Some(0) {
                // A zero-limit count says nothing here; size the list from a real page
                let mut sized = request;
                sized.limit = Some(DEFAULT_PAGE_SIZE);
                result = client.get_suggestions(&sized).await?;
            }
            result.total_record_count = result.items.len() as u32;
        }
        Ok(result)
    }
}

/// Playlist items always report their total; the flag has no query parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistItemsRequestHandler;

#[async_trait]
impl RequestHandler<JellyfinApi> for PlaylistItemsRequestHandler {
    type Request = GetPlaylistItemsRequest;

    fn prepare(
        &self,
        request: &Self::Request,
        start_index: u32,
        limit: u32,
        _enable_total_record_count: bool,
    ) -> Self::Request {
        let mut request = request.clone();
        request.start_index = Some(start_index);
        request.limit = Some(limit);
        request
    }

    async fn execute(
        &self,
        client: &JellyfinApi,
        request: Self::Request,
    ) -> Result<QueryResult<BaseItemDto>, JellyfinApiError> {
        client.get_playlist_items(&request).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodesRequestHandler;

#[async_trait]
impl RequestHandler<JellyfinApi> for EpisodesRequestHandler {
    type Request = GetEpisodesRequest;

    fn prepare(
        &self,
        request: &Self::Request,
        start_index: u32,
        limit: u32,
        _enable_total_record_count: bool,
    ) -> Self::Request {
        let mut request = request.clone();
        request.start_index = Some(start_index);
        request.limit = Some(limit);
        request
    }

    async fn execute(
        &self,
        client: &JellyfinApi,
        request: Self::Request,
    ) -> Result<QueryResult<BaseItemDto>, JellyfinApiError> {
        client.get_episodes(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LibraryId, PlaylistId, SeriesId};

    #[test]
    fn test_prepare_leaves_original_untouched() {
        let original = GetItemsRequest {
            parent_id: Some(LibraryId::new("lib")),
            recursive: Some(true),
            ..Default::default()
        };

        let prepared = ItemsRequestHandler.prepare(&original, 100, 50, false);

        assert_eq!(original.start_index, None);
        assert_eq!(original.limit, None);
        assert_eq!(prepared.start_index, Some(100));
        assert_eq!(prepared.limit, Some(50));
        assert_eq!(prepared.enable_total_record_count, Some(false));
        assert_eq!(prepared.parent_id, original.parent_id);
        assert_eq!(prepared.recursive, Some(true));
    }

    #[test]
    fn test_probe_request_shape() {
        let probe = NextUpRequestHandler.prepare(&GetNextUpRequest::default(), 0, 0, true);
        assert_eq!(probe.start_index, Some(0));
        assert_eq!(probe.limit, Some(0));
        assert_eq!(probe.enable_total_record_count, Some(true));
    }

    #[test]
    fn test_path_handlers_keep_their_ids() {
        let playlist = PlaylistItemsRequestHandler.prepare(
            &GetPlaylistItemsRequest::new(PlaylistId::new("pl")),
            20,
            10,
            true,
        );
        assert_eq!(playlist.playlist_id, PlaylistId::new("pl"));
        assert_eq!(playlist.start_index, Some(20));

        let episodes = EpisodesRequestHandler.prepare(
            &GetEpisodesRequest::new(SeriesId::new("s")),
            0,
            25,
            false,
        );
        assert_eq!(episodes.series_id, SeriesId::new("s"));
        assert_eq!(episodes.limit, Some(25));
    }
}
