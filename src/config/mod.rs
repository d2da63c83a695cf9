//! Translator configuration: machine layout and vmlower.toml.

pub mod machine;
pub mod project;

pub use machine::MachineConfig;
pub use project::Project;

/// When to emit the bootstrap sequence at the top of the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Bootstrap {
    /// Only for directory inputs (whole programs), never for a single file.
    #[default]
    Auto,
    Always,
    Never,
}

impl Bootstrap {
    pub fn parse(s: &str) -> Option<Bootstrap> {
        match s {
            "auto" => Some(Bootstrap::Auto),
            "always" => Some(Bootstrap::Always),
            "never" => Some(Bootstrap::Never),
            _ => None,
        }
    }

    /// Resolve against the kind of input being translated.
    pub fn enabled(self, is_directory: bool) -> bool {
        match self {
            Bootstrap::Auto => is_directory,
            Bootstrap::Always => true,
            Bootstrap::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_resolution() {
        assert!(Bootstrap::Auto.enabled(true));
        assert!(!Bootstrap::Auto.enabled(false));
        assert!(Bootstrap::Always.enabled(false));
        assert!(!Bootstrap::Never.enabled(true));
        assert_eq!(Bootstrap::parse("never"), Some(Bootstrap::Never));
        assert_eq!(Bootstrap::parse("Never"), None);
    }
}
