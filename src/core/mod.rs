mod advice;
mod advisor;
mod engine;
mod summary;
mod types;
mod validate;

pub use advice::{CURRENCY_SYMBOL, allocation_line, format_money};
pub use advisor::{
    Advisor, EnrichedRecommendation, Enrichment, FundListing, RECOMMENDED_FUNDS,
    SEARCH_UNAVAILABLE_MESSAGE, WATCHLIST_TICKERS, render_enrichment,
};
pub use engine::{
    allocate, allocate_amount, recommend, recommend_by_age, recommend_by_goal, split_for_bracket,
    split_for_goal,
};
pub use summary::{
    FUND_SEARCH_SECTION, RECOMMENDATION_SECTION, SummaryContext, SummarySection, ask, summarize,
};
pub use types::{
    AllocationAmounts, AllocationLine, AllocationResult, AllocationSplit, AssetClass, Goal,
    RiskBracket, UserProfile,
};
pub use validate::{MIN_AGE, ProfileRequest};
