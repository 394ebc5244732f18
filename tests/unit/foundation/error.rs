use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LapseError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LapseError::encode("x").to_string().contains("encode error:"));
    assert!(LapseError::frame("x").to_string().contains("frame error:"));
    assert!(
        LapseError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(
        LapseError::NoFramesWritten.to_string(),
        "no frames were written to the encoder"
    );
}

#[test]
fn only_frame_errors_are_recoverable() {
    assert!(LapseError::frame("decode").is_recoverable());
    assert!(!LapseError::encode("spawn").is_recoverable());
    assert!(!LapseError::NoFramesWritten.is_recoverable());
    assert!(!LapseError::Cancelled.is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LapseError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
