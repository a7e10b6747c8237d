/*!
 * Tests for error types and conversions
 */

use castscript::errors::{AppError, AssetError, ImportError, PARSE_FAILURE_MESSAGE, ParseError};

#[test]
fn test_parseError_shouldDisplayLineAndReason() {
    let error = ParseError::new(12, "invalid start timestamp '1:00'");

    assert_eq!(error.to_string(), "line 12: invalid start timestamp '1:00'");
}

#[test]
fn test_importError_parse_shouldHideReasonInPublicMessage() {
    let error: ImportError = ParseError::new(3, "missing '-->' separator").into();

    assert_eq!(error.public_message(), PARSE_FAILURE_MESSAGE);
    assert!(error.to_string().contains("missing '-->' separator"));
    assert!(error.is_input_error());
}

#[test]
fn test_importError_encoding_shouldMentionUtf8() {
    let bytes = [0xffu8, 0xfe];
    let utf8_error = std::str::from_utf8(&bytes).unwrap_err();
    let error: ImportError = utf8_error.into();

    assert_eq!(error.public_message(), "Error parsing webvtt file: must be UTF-8 encoded");
    assert!(error.is_input_error());
}

#[test]
fn test_importError_fromAssetError_shouldMapVariants() {
    let not_assigned: ImportError = AssetError::NotAssigned.into();
    let missing: ImportError = AssetError::NotFound("https://cdn/ep.vtt".to_string()).into();
    let transport: ImportError = AssetError::Transport("connection reset".to_string()).into();

    assert!(matches!(not_assigned, ImportError::NotFound(_)));
    assert_eq!(not_assigned.public_message(), "No asset is assigned for transcripts yet");
    assert!(matches!(missing, ImportError::NotFound(_)));
    assert!(matches!(transport, ImportError::Transport(ref message) if message == "connection reset"));
    assert!(!transport.is_input_error());
}

#[test]
fn test_appError_fromImportError_shouldWrapCorrectly() {
    let import_error = ImportError::NotFound("Episode 'x'".to_string());
    let app_error: AppError = import_error.into();

    assert!(app_error.to_string().contains("Import error"));
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);

    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}

#[test]
fn test_appError_fromAnyhow_shouldWrapAsUnknown() {
    let app_error: AppError = anyhow::anyhow!("disk full").into();

    assert!(matches!(app_error, AppError::Unknown(ref message) if message == "disk full"));
}
