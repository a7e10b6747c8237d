/*!
 * # castscript - Podcast episode transcripts
 *
 * A Rust library that imports WebVTT caption files for podcast episodes,
 * stores them as normalized cues and renders them in several formats.
 *
 * ## Features
 *
 * - All-or-nothing WebVTT parsing with speaker (voice) extraction
 * - Atomic per-episode cue replacement in SQLite
 * - Sticky voice-to-contributor assignments
 * - Rendering as:
 *   - WebVTT
 *   - XML
 *   - flat JSON, speaker-grouped JSON and the podcast index JSON schema
 * - Import from a remote transcript file
 * - Feed and player link generation
 * - JSON export and restore
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `webvtt`: Captions document parser
 * - `cue`: Normalized cue model
 * - `database`: SQLite persistence layer
 * - `directory`: Episode and contributor lookup traits
 * - `voice`: Voice label resolution
 * - `import`: Import pipeline
 * - `asset`: Remote transcript file fetching
 * - `render`: Output formats:
 *   - `render::webvtt`: WebVTT documents
 *   - `render::xml`: XML documents
 *   - `render::json`: JSON dialects
 * - `links`: Public transcript URLs and feed tags
 * - `backup`: Export and restore
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod asset;
pub mod backup;
pub mod cue;
pub mod database;
pub mod directory;
pub mod errors;
pub mod import;
pub mod links;
pub mod render;
pub mod voice;
pub mod webvtt;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use cue::Cue;
pub use database::Repository;
pub use directory::{ContributorDirectory, ContributorRef, EpisodeDirectory, EpisodeRef};
pub use errors::{AppError, AssetError, ImportError, ParseError};
pub use import::{ImportPipeline, ImportSummary};
pub use render::{RenderedTranscript, TranscriptFormat, TranscriptRenderer, TranscriptSnapshot};
pub use voice::VoiceResolver;
pub use webvtt::ParsedCue;
