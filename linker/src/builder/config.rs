//! Linker configuration options

/// Configuration options for the program builder
#[derive(Clone, Debug)]
pub struct LinkerConfig {
    pub debug_mode: bool,
    pub skip_jump: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            skip_jump: true,
        }
    }
}

impl LinkerConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the symbol table dump
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Enable or disable the jump over the main program's function bodies
    pub fn with_skip_jump(mut self, skip_jump: bool) -> Self {
        self.skip_jump = skip_jump;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkerConfig::new();
        assert!(!config.debug_mode);
        assert!(config.skip_jump);
    }

    #[test]
    fn test_builder_setters() {
        let config = LinkerConfig::default()
            .with_debug_mode(true)
            .with_skip_jump(false);
        assert!(config.debug_mode);
        assert!(!config.skip_jump);
    }
}
