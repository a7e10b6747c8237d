/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;

use castscript::app_config::{Config, FeedTranscripts, LogLevel};

use crate::common;

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.site.base_url, "http://localhost");
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.assets, config.assets);
    Ok(())
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "database_path": "/tmp/castscript-test.db",
            "site": { "base_url": "https://pod.example.com" },
            "assets": { "transcript_url_template": "https://cdn.example.com/{episode}.vtt", "timeout_secs": 5 },
            "feed": { "transcripts": "none" },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.site.base_url, "https://pod.example.com");
    assert_eq!(config.assets.timeout_secs, 5);
    assert_eq!(config.feed.transcripts, FeedTranscripts::None);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withFeedTemplateMissingPlaceholder_shouldFail() {
    let mut config = Config::default();
    config.feed.transcripts = FeedTranscripts::Asset("https://cdn.example.com/all.vtt".to_string());

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnparsableBaseUrl_shouldFail() {
    let mut config = Config::default();
    config.site.base_url = "pod.example.com".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_logLevel_shouldMapToLevelFilter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
