// Client identity sent in the MediaBrowser authorization header
pub const CLIENT_NAME: &str = "Wholphin";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEVICE_NAME: &str = "Rust";

// === Paging ===
// Rows on the home screen are short; library grids override this from config
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_CACHE_PAGES: usize = 8;
// One fetch at a time per pager keeps requests in scroll order
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 1;

// === Network ===
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Poster height requested for grid cards
pub const CARD_IMAGE_HEIGHT: u32 = 400;
