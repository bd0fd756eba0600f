pub mod indicators;
pub mod scoring;
pub mod sentiment;

pub use indicators::compute_indicators;
pub use scoring::{get_signal, potential_upside, setup_score, setup_type, social_bonus};
pub use sentiment::{extract_json_object, keyword_sentiment, regional_sentiment};
