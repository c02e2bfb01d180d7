use crate::config;

/// Load and validate settings. Runs before logging exists, so problems go to
/// stderr, and the player starts with defaults instead.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("sonata: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            eprintln!("sonata: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
