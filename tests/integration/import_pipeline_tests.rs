/*!
 * Integration tests for the import pipeline against SQLite storage
 */

use anyhow::Result;
use std::sync::Arc;

use castscript::render::{TranscriptFormat, TranscriptRenderer};
use castscript::{ImportError, ImportPipeline, Repository, VoiceResolver};

use crate::common::mock_directory::{MockAsset, MockAssetFetcher, MockContributors};
use crate::common::{self, MALFORMED_VTT, SAMPLE_VTT, WITHOUT_ROGER_VTT};

fn pipeline(repo: &Repository) -> ImportPipeline {
    ImportPipeline::new(repo.clone(), Arc::new(repo.clone()))
}

#[tokio::test]
async fn test_import_withMalformedDocument_shouldLeaveStoredStateUntouched() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let pipeline = pipeline(&repo);
    pipeline.import(episode.id, SAMPLE_VTT.as_bytes()).await?;
    let cues_before = repo.get_cues(episode.id).await?;
    let assignments_before = repo.list_voice_assignments(episode.id).await?;

    let result = pipeline.import(episode.id, MALFORMED_VTT.as_bytes()).await;

    assert!(matches!(result, Err(ImportError::Parse(_))));
    assert_eq!(repo.get_cues(episode.id).await?, cues_before);
    assert_eq!(repo.list_voice_assignments(episode.id).await?, assignments_before);
    Ok(())
}

#[tokio::test]
async fn test_import_sameBytesTwice_shouldNotDuplicateCues() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let pipeline = pipeline(&repo);

    pipeline.import(episode.id, SAMPLE_VTT.as_bytes()).await?;
    let once = repo.get_cues(episode.id).await?;
    let second = pipeline.import(episode.id, SAMPLE_VTT.as_bytes()).await?;

    assert_eq!(repo.get_cues(episode.id).await?, once);
    assert_eq!(once.len(), 3);
    assert!(second.unchanged_source);
    assert!(second.new_assignments.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_reimport_withoutVoice_shouldKeepItsAssignment() -> Result<()> {
    common::init_logging();
    let repo = Repository::new_in_memory()?;
    let episode = repo.create_episode("ep-001").await?;
    let contributors = Arc::new(MockContributors::single(42, "roger", "Roger Bingham"));
    let pipeline = ImportPipeline::new(repo.clone(), contributors.clone());

    let first = pipeline.import(episode.id, SAMPLE_VTT.as_bytes()).await?;
    assert_eq!(first.new_assignments, vec!["roger".to_string()]);

    pipeline.import(episode.id, WITHOUT_ROGER_VTT.as_bytes()).await?;

    let assignment = repo.get_voice_assignment(episode.id, "roger").await?.unwrap();
    assert_eq!(assignment.contributor_id, 42);
    assert_eq!(repo.get_cues(episode.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_import_shouldMatchVoiceLabelsCaseSensitively() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let document = "WEBVTT\n\n00:00.000 --> 00:01.000\n<v Roger>Hi</v>\n";

    let summary = pipeline(&repo).import(episode.id, document.as_bytes()).await?;

    assert!(summary.new_assignments.is_empty());
    assert!(repo.get_voice_assignment(episode.id, "Roger").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_import_shouldNotLookUpAlreadyAssignedVoices() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    let episode = repo.create_episode("ep-001").await?;
    let contributors = Arc::new(MockContributors::single(42, "roger", "Roger Bingham"));
    let pipeline = ImportPipeline::new(repo.clone(), contributors.clone());
    repo.set_voice_assignment(episode.id, "roger", 7).await?;

    pipeline.import(episode.id, SAMPLE_VTT.as_bytes()).await?;

    // Only "Anna" needed a lookup
    assert_eq!(contributors.lookup_count(), 1);
    assert_eq!(repo.get_voice_assignment(episode.id, "roger").await?.unwrap().contributor_id, 7);
    Ok(())
}

#[tokio::test]
async fn test_import_withHeaderOnlyDocument_shouldClearCues() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let pipeline = pipeline(&repo);
    pipeline.import(episode.id, SAMPLE_VTT.as_bytes()).await?;

    let summary = pipeline.import(episode.id, b"WEBVTT\n").await?;

    assert_eq!(summary.cue_count, 0);
    assert!(!repo.has_transcript(episode.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_import_withLatin1Bytes_shouldReportEncodingError() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let mut bytes = b"WEBVTT\n\n00:00.000 --> 00:01.000\nCaf".to_vec();
    bytes.push(0xe9);

    let error = pipeline(&repo).import(episode.id, &bytes).await.unwrap_err();

    assert!(matches!(error, ImportError::Encoding(_)));
    assert!(repo.last_import(episode.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_importFromAsset_shouldMapFetcherFailures() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let pipeline = pipeline(&repo);

    let missing = MockAssetFetcher::with_asset("ep-001", MockAsset::Missing);
    let failing = MockAssetFetcher::with_asset("ep-001", MockAsset::Failing("timed out".to_string()));
    let unassigned = MockAssetFetcher::default();

    assert!(matches!(
        pipeline.import_from_asset(&episode, &missing).await,
        Err(ImportError::NotFound(_))
    ));
    assert!(matches!(
        pipeline.import_from_asset(&episode, &failing).await,
        Err(ImportError::Transport(ref message)) if message == "timed out"
    ));
    let error = pipeline.import_from_asset(&episode, &unassigned).await.unwrap_err();
    assert_eq!(error.public_message(), "No asset is assigned for transcripts yet");
    Ok(())
}

#[tokio::test]
async fn test_handleChangedAsset_shouldOnlyImportVttFiles() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let pipeline = pipeline(&repo);
    let fetcher = MockAssetFetcher::with_asset("ep-001", MockAsset::Bytes(SAMPLE_VTT.as_bytes().to_vec()));

    let skipped = pipeline.handle_changed_asset(&episode, "mp3", &fetcher).await?;
    assert!(skipped.is_none());
    assert_eq!(fetcher.fetch_count(), 0);

    let imported = pipeline.handle_changed_asset(&episode, "vtt", &fetcher).await?;
    assert_eq!(imported.map(|summary| summary.cue_count), Some(3));
    assert_eq!(fetcher.fetch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_concurrentImports_shouldLeaveOneCompleteCueSet() -> Result<()> {
    let (repo, episode) = common::seeded_repository().await?;
    let pipeline = pipeline(&repo);
    let renderer = TranscriptRenderer::new(repo.clone(), VoiceResolver::new(repo.clone(), Arc::new(repo.clone())));

    let episode_id = episode.id;
    let mut handles = Vec::new();
    for round in 0..8 {
        let pipeline = pipeline.clone();
        let document = if round % 2 == 0 { SAMPLE_VTT } else { WITHOUT_ROGER_VTT };
        handles.push(tokio::spawn(async move {
            pipeline.import(episode_id, document.as_bytes()).await
        }));
    }
    for _ in 0..8 {
        let count = renderer.snapshot(episode.id).await?.cues.len();
        assert!(count == 0 || count == 1 || count == 3);
    }
    for handle in handles {
        handle.await??;
    }

    let count = repo.get_cues(episode.id).await?.len();
    assert!(count == 1 || count == 3);
    let rendered = renderer.render(episode.id, TranscriptFormat::JsonFlat).await?;
    assert_eq!(rendered.content_type, "application/json");
    Ok(())
}
