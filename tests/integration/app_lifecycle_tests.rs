/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use castscript::app_config::{Config, FeedTranscripts};
use castscript::{AppError, Controller, ImportError, TranscriptFormat};

use crate::common::{self, MALFORMED_VTT, SAMPLE_VTT};

/// Controller on a database file inside `dir`
fn controller_in(dir: &std::path::Path, mut config: Config) -> Result<Controller> {
    config.database_path = Some(dir.join("castscript.db"));
    Ok(Controller::with_config(config)?)
}

#[tokio::test]
async fn test_controller_importAndRender_shouldServeEveryFormat() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_in(temp_dir.path(), Config::default())?;
    let vtt = common::create_test_file(temp_dir.path(), "captions.vtt", SAMPLE_VTT)?;

    controller.add_episode("ep-001").await?;
    controller.add_contributor("roger", Some("Roger Bingham")).await?;
    let summary = controller.import_file("ep-001", &vtt).await?;
    assert_eq!(summary.cue_count, 3);

    for format in TranscriptFormat::ALL {
        let rendered = controller.render("ep-001", format).await?;
        assert_eq!(rendered.content_type, format.content_type());
        assert!(!rendered.body.is_empty());
    }

    let podcastindex = controller.render("ep-001", TranscriptFormat::JsonPodcastIndex).await?;
    assert!(podcastindex.body.contains(r#""speaker":"Roger Bingham""#));
    Ok(())
}

#[tokio::test]
async fn test_controller_withMalformedFile_shouldSurfaceGenericMessage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_in(temp_dir.path(), Config::default())?;
    let vtt = common::create_test_file(temp_dir.path(), "broken.vtt", MALFORMED_VTT)?;
    controller.add_episode("ep-001").await?;

    let error = controller.import_file("ep-001", &vtt).await.unwrap_err();

    match error {
        AppError::Import(import_error @ ImportError::Parse(_)) => {
            assert_eq!(import_error.public_message(), "Error parsing webvtt file");
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_controller_links_shouldFollowFeedMode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.site.base_url = "https://pod.example.com".to_string();
    let controller = controller_in(temp_dir.path(), config)?;
    let vtt = common::create_test_file(temp_dir.path(), "captions.vtt", SAMPLE_VTT)?;
    controller.add_episode("ep-001").await?;

    let before = controller.links("ep-001").await?;
    assert!(before.feed.is_empty());
    assert!(before.player.is_none());
    assert_eq!(before.formats.len(), 5);

    controller.import_file("ep-001", &vtt).await?;
    let after = controller.links("ep-001").await?;
    assert_eq!(after.feed.len(), 2);
    assert_eq!(
        after.player.map(|url| url.to_string()),
        Some("https://pod.example.com/ep-001/?transcript=json".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_controller_exportRestore_shouldRoundTripThroughFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_in(temp_dir.path(), Config::default())?;
    let vtt = common::create_test_file(temp_dir.path(), "captions.vtt", SAMPLE_VTT)?;
    let export_path = temp_dir.path().join("export.json");
    controller.add_episode("ep-001").await?;
    controller.add_contributor("roger", None).await?;
    controller.import_file("ep-001", &vtt).await?;
    let before = controller.render("ep-001", TranscriptFormat::JsonFlat).await?;

    let export = controller.export(&export_path).await?;
    assert_eq!(export.transcripts.len(), 3);
    assert_eq!(export.voice_assignments.len(), 1);

    let empty = common::create_test_file(temp_dir.path(), "empty.vtt", "WEBVTT\n")?;
    controller.import_file("ep-001", &empty).await?;
    controller.restore(&export_path).await?;

    assert_eq!(controller.render("ep-001", TranscriptFormat::JsonFlat).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_controller_deleteEpisode_shouldRemoveTranscript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_in(temp_dir.path(), Config::default())?;
    let vtt = common::create_test_file(temp_dir.path(), "captions.vtt", SAMPLE_VTT)?;
    controller.add_episode("ep-001").await?;
    controller.import_file("ep-001", &vtt).await?;

    controller.delete_episode("ep-001").await?;

    assert!(matches!(
        controller.render("ep-001", TranscriptFormat::WebVtt).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(controller.stats()?.cue_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_controller_importAsset_shouldFetchFromTemplate() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ep-001.vtt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_VTT))
        .mount(&server)
        .await;

    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.assets.transcript_url_template = Some(format!("{}/{{episode}}.vtt", server.uri()));
    config.feed.transcripts = FeedTranscripts::Asset(format!("{}/{{episode}}.vtt", server.uri()));
    let controller = controller_in(temp_dir.path(), config)?;
    controller.add_episode("ep-001").await?;

    let summary = controller.import_asset("ep-001").await?;
    let links = controller.links("ep-001").await?;

    assert_eq!(summary.cue_count, 3);
    assert_eq!(links.feed[0].url, format!("{}/ep-001.vtt", server.uri()));
    Ok(())
}
