//! Tests for argument parsing and command setup.

#[cfg(test)]
mod cli_tests {
    use crate::cli::{Cli, CommandContext, Commands};
    use crate::config::GlobalConfig;
    use crate::upgrade::UpdateConfig;
    use crate::version::LocalVersion;
    use clap::Parser;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_cli_parsing() {
        assert!(Cli::try_parse_from(["liveupd", "--help"]).is_err());
        assert!(Cli::try_parse_from(["liveupd"]).is_err());
        assert!(Cli::try_parse_from(["liveupd", "check"]).is_ok());
        assert!(Cli::try_parse_from(["liveupd", "cleanup"]).is_ok());
        assert!(Cli::try_parse_from(["liveupd", "frobnicate"]).is_err());
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["liveupd", "--verbose", "check"]).unwrap();
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::try_parse_from(["liveupd", "check", "-q"]).unwrap();
        assert_eq!(cli.log_level(), "error");

        let cli = Cli::try_parse_from(["liveupd", "check"]).unwrap();
        assert_eq!(cli.log_level(), "info");

        assert!(Cli::try_parse_from(["liveupd", "-v", "-q", "check"]).is_err());
    }

    #[test]
    fn test_config_flag() {
        let cli =
            Cli::try_parse_from(["liveupd", "--config", "/tmp/liveupd.toml", "version"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/liveupd.toml")));
    }

    #[test]
    fn test_signal_arguments() {
        let cli = Cli::try_parse_from(["liveupd", "signal", "9f8e7d6", "20240611153000"]).unwrap();
        match cli.command {
            Commands::Signal(cmd) => {
                assert_eq!(cmd.revision, "9f8e7d6");
                assert_eq!(cmd.build, "20240611153000");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["liveupd", "signal", "", "20240611153000"]).unwrap();
        assert!(matches!(cli.command, Commands::Signal(cmd) if cmd.revision.is_empty()));

        assert!(Cli::try_parse_from(["liveupd", "signal", "9f8e7d6"]).is_err());
    }

    #[test]
    fn test_version_json_flag() {
        let cli = Cli::try_parse_from(["liveupd", "version", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Version(cmd) if cmd.json));
    }

    #[test]
    fn test_context_applies_project_override() {
        let local = LocalVersion::new("a1b2c3d", "20240101000000", "unconfigured");

        let context = CommandContext::new(GlobalConfig::default(), local.clone());
        assert!(!context.local_version().is_configured());

        let config = GlobalConfig {
            update: UpdateConfig {
                project_name: Some(" myapp ".to_string()),
                ..UpdateConfig::default()
            },
        };
        let context = CommandContext::new(config, local.clone());
        assert_eq!(context.local_version().project_name(), "myapp");
        assert_eq!(context.local_version().revision_tag(), "a1b2c3d");

        let config = GlobalConfig {
            update: UpdateConfig {
                project_name: Some("   ".to_string()),
                ..UpdateConfig::default()
            },
        };
        let context = CommandContext::new(config, local);
        assert_eq!(context.local_version().project_name(), "unconfigured");
    }

    #[test]
    fn test_executor_uses_configured_deadline() {
        let config = GlobalConfig {
            update: UpdateConfig {
                check_deadline_secs: 42,
                ..UpdateConfig::default()
            },
        };
        let context =
            CommandContext::new(config, LocalVersion::new("a1b2c3d", "20240101000000", "myapp"));
        let executor = context.executor().unwrap();
        assert_eq!(executor.local_version().project_name(), "myapp");
        assert_eq!(context.update_config().check_deadline(), Duration::from_secs(42));
    }

    #[test]
    fn test_watch_interval_resolution() {
        let cli = Cli::try_parse_from(["liveupd", "watch", "--interval", "30"]).unwrap();
        let Commands::Watch(cmd) = cli.command else {
            panic!("expected watch");
        };
        let context = CommandContext::new(
            GlobalConfig::default(),
            LocalVersion::new("a1b2c3d", "20240101000000", "myapp"),
        );
        assert_eq!(cmd.interval(&context), Some(Duration::from_secs(30)));

        let cli = Cli::try_parse_from(["liveupd", "watch"]).unwrap();
        let Commands::Watch(cmd) = cli.command else {
            panic!("expected watch");
        };
        // check_interval defaults to 0, which disables periodic checks.
        assert_eq!(cmd.interval(&context), None);
    }
}
