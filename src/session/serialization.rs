// Serialization utilities for session files (RON)

use super::SessionResult;
use super::types::SessionConfig;
use ron::ser::PrettyConfig;
use std::fs;
use std::path::Path;

/// Parse a session from RON text
pub fn parse_session(ron_data: &str) -> SessionResult<SessionConfig> {
    Ok(ron::from_str(ron_data)?)
}

/// Serialize a session to pretty RON text
pub fn serialize_session(config: &SessionConfig) -> SessionResult<String> {
    Ok(ron::ser::to_string_pretty(config, PrettyConfig::default())?)
}

/// Load a session file
pub fn load_session(path: &Path) -> SessionResult<SessionConfig> {
    let ron_data = fs::read_to_string(path)?;
    let config = parse_session(&ron_data)?;
    log::info!(
        "Loaded session {:?}: {} BPM, {} tracks",
        path,
        config.bpm,
        config.tracks.len()
    );
    Ok(config)
}

/// Save a session file
pub fn save_session(path: &Path, config: &SessionConfig) -> SessionResult<()> {
    fs::write(path, serialize_session(config)?)?;
    Ok(())
}
