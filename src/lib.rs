//! Overlayrank places text on images and ranks the resulting layouts.
//!
//! Saliency and contrast analysis describe the image, the zone catalog and an
//! optional asynchronous proposal source supply rough boxes per placement
//! strategy, the position validator repairs them, and a weighted set of
//! metrics scores each candidate. Parallel scoring is available via the
//! `rayon` feature and image decoding via `image-io`.

pub mod color;
pub mod image;
pub mod layout;
pub mod rank;
pub mod saliency;
pub mod scoring;
pub(crate) mod trace;
pub mod util;

pub use color::{Color, ContrastAnalyzer, ContrastConfig, ContrastDecision};
pub use image::{ImageView, OwnedImage, Scene};
pub use layout::{
    OverlayBox, OverlayElement, PositionValidator, Role, Strategy, ValidatorConfig,
    ZoneTemplateCatalog,
};
pub use rank::{
    LayoutRequest, ProposalSource, RankConfig, RankContext, RankOutput, Ranker, TextRequest,
};
pub use saliency::{SaliencyAnalyzer, SaliencyConfig, SaliencyMap};
pub use scoring::{CompositeScorer, ScoringConfig, ScoringMetric};
pub use util::{OverlayError, OverlayResult, ProposalError};
