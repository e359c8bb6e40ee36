use tracing::debug;

use super::handler::{ItemsRequestHandler, RequestHandler};
use crate::backends::jellyfin::dto::GetItemsRequest;
use crate::backends::{JellyfinApi, JellyfinApiError};

/// Index of the first item sorting at or after `letter` in a name-sorted
/// items list, found with one zero-limit count of `NameLessThan=letter`
/// instead of walking the list.
///
/// Non-alphabetic letters (the "#" jump) map to the start of the list.
pub async fn letter_position(
    api: &JellyfinApi,
    request: &GetItemsRequest,
    letter: char,
) -> Result<usize, JellyfinApiError> {
    if !letter.is_alphabetic() {
        return Ok(0);
    }

    let mut probe = ItemsRequestHandler.prepare(request, 0, 0, true);
    probe.name_less_than = Some(letter.to_uppercase().to_string());

    let result = ItemsRequestHandler.execute(api, probe).await?;
    debug!(
        "{} items sort before '{}'",
        result.total_record_count, letter
    );
    Ok(result.total_record_count as usize)
}
