// Hotel search parameter core
// Normalizes URL-driven search state and builds the hotel-search API parameters

pub mod api_params;
pub mod guest_distribution;
pub mod query_string;
pub mod search_params;

// Re-export key types for convenience
pub use api_params::{ApiConfig, ApiParamsError, HotelSearchQuery, Occupancy, RoomSearchQuery};
pub use guest_distribution::{allocate, distribute, DistributionError, GuestRoomAllocation};
pub use query_string::{parse_query, to_query, QueryError};
pub use search_params::{
    normalize, DateRange, NormalizerConfig, SearchParams, SearchParamsNormalizer,
};
