//! Parking sign checker: a thin gateway that forwards parking-sign photos
//! to a vision model and a client that captures photos and shows the
//! verdict.

pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod page;
pub mod prompt;
pub mod render;
pub mod upstream;
pub mod verdict;

pub use capture::{Action, CaptureState, CapturedImage, ImageFile, Phase};
pub use client::GatewayClient;
pub use config::Config;
pub use error::AnalyzeError;
pub use gateway::{router, AppState};
pub use upstream::{OpenAiVision, ScriptedModel, VisionModel};
pub use verdict::AnalysisVerdict;
