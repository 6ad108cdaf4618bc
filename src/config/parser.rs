use crate::config::types::Settings;
use crate::ConfigError;
use std::path::Path;

/// Loads scanner settings from a TOML file
///
/// Every field is optional; missing keys take their defaults. See
/// [`Settings`] for the full key list.
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded settings
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tapmap::config::load_settings;
///
/// let settings = load_settings(Path::new("tapmap.toml")).unwrap();
/// println!("User agent: {}", settings.user_agent);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}
