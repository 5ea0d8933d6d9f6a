// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, discovery, and SSH session settings.

use pairrun::config::*;
use pairrun::error::Error;
use pairrun::ssh::HostKeyPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.local.program, r".\pinkypi.exe");
        assert_eq!(config.local.args, vec!["-f", "27", "-sf", "0"]);
        assert_eq!(config.remote.user, "administrator");
        assert_eq!(config.remote.port, 22);
        assert_eq!(config.remote.key_path, PathBuf::from("~/.ssh/id_rsa"));
        assert_eq!(config.remote.host_key_policy, HostKeyPolicy::AcceptAny);
        assert!(config.remote.timeout.is_none());
        assert_eq!(
            config.remote.commands,
            vec![r"cd $home\pentan_cpu", r".\pinkypi.exe -f 23 -sf 27"]
        );
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
local:
  program: ./sim
  args: ["-f", "27", "-sf", "0"]
  working_dir: /opt/sim
  env:
    SIM_LOG: debug

remote:
  user: deploy
  port: 2222
  key_path: /keys/sim
  host_key_policy: trust-first-use
  known_hosts_path: /keys/known_hosts
  timeout: 10m
  commands:
    - cd ~/sim
    - ./sim -f 23 -sf 27
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.local.program, "./sim");
        assert_eq!(config.local.working_dir, Some(PathBuf::from("/opt/sim")));
        assert_eq!(config.local.env.get("SIM_LOG").map(String::as_str), Some("debug"));
        assert_eq!(config.remote.user, "deploy");
        assert_eq!(config.remote.port, 2222);
        assert_eq!(config.remote.host_key_policy, HostKeyPolicy::TrustFirstUse);
        assert_eq!(config.remote.timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.remote.commands.len(), 2);
    }

    #[test]
    fn command_shorthand_splits_on_spaces() {
        let yaml = r#"
local:
  command: .\pinkypi.exe -f 27 -sf 0
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.local.program, r".\pinkypi.exe");
        assert_eq!(config.local.args, vec!["-f", "27", "-sf", "0"]);
    }

    #[test]
    fn program_without_args_has_no_args() {
        let yaml = "local:\n  program: ./sim\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.local.args.is_empty());
    }

    #[test]
    fn command_and_program_together_is_error() {
        let yaml = "local:\n  command: ./sim -f 1\n  program: ./sim\n";
        assert!(matches!(Config::from_yaml(yaml), Err(Error::Yaml(_))));
    }

    #[test]
    fn unknown_host_key_policy_is_error() {
        let yaml = "remote:\n  host_key_policy: sometimes\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn unknown_field_is_error() {
        let yaml = "remote:\n  usr: typo\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn empty_commands_fail_validation() {
        let yaml = "remote:\n  commands: []\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(Error::InvalidConfig(msg)) if msg.contains("commands")
        ));
    }

    #[test]
    fn empty_user_fails_validation() {
        let yaml = "remote:\n  user: \"\"\n";
        assert!(matches!(Config::from_yaml(yaml), Err(Error::InvalidConfig(_))));
    }
}

mod command_script {
    use super::*;

    #[test]
    fn default_script_matches_literal() {
        assert_eq!(
            Config::default().remote.command_script(),
            "\ncd $home\\pentan_cpu\n.\\pinkypi.exe -f 23 -sf 27\n"
        );
    }

    #[test]
    fn script_starts_blank_and_terminates_every_line() {
        let yaml = "remote:\n  commands:\n    - echo one\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.remote.command_script(), "\necho one\n");
    }
}

mod remote_addr {
    use super::*;

    #[test]
    fn host_only() {
        let addr = RemoteAddr::parse("10.0.0.2").unwrap();
        assert_eq!(addr.host, "10.0.0.2");
        assert!(addr.port.is_none());
        assert!(addr.user.is_none());
    }

    #[test]
    fn user_host_port() {
        let addr = RemoteAddr::parse("admin@sim-b:2222").unwrap();
        assert_eq!(addr.user.as_deref(), Some("admin"));
        assert_eq!(addr.host, "sim-b");
        assert_eq!(addr.port, Some(2222));
        assert_eq!(addr.to_string(), "admin@sim-b:2222");
    }

    #[test]
    fn bracketed_ipv6_with_port() {
        let addr = RemoteAddr::parse("[fe80::1]:22").unwrap();
        assert_eq!(addr.host, "fe80::1");
        assert_eq!(addr.port, Some(22));
        assert_eq!(addr.to_string(), "[fe80::1]:22");
    }

    #[test]
    fn bare_ipv6_has_no_port() {
        let addr = RemoteAddr::parse("::1").unwrap();
        assert_eq!(addr.host, "::1");
        assert!(addr.port.is_none());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(RemoteAddr::parse("").is_err());
        assert!(RemoteAddr::parse("admin@").is_err());
        assert!(RemoteAddr::parse("@host").is_err());
        assert!(RemoteAddr::parse(":22").is_err());
        assert!(RemoteAddr::parse("host:notaport").is_err());
        assert!(RemoteAddr::parse("host:0").is_err());
        assert!(RemoteAddr::parse("[::1").is_err());
    }
}

mod session {
    use super::*;

    #[test]
    fn address_overrides_user_and_port() {
        let remote = RemoteConfig {
            key_path: PathBuf::from("/keys/id_rsa"),
            ..RemoteConfig::default()
        };
        let addr = RemoteAddr::parse("ops@sim-b:2200").unwrap();

        let session = remote.session_config(&addr).unwrap();
        assert_eq!(session.host, "sim-b");
        assert_eq!(session.user, "ops");
        assert_eq!(session.port, 2200);
        assert_eq!(session.key_path, PathBuf::from("/keys/id_rsa"));
    }

    #[test]
    fn configured_user_and_port_apply_without_override() {
        let remote = RemoteConfig {
            key_path: PathBuf::from("/keys/id_rsa"),
            port: 2022,
            host_key_policy: HostKeyPolicy::Strict,
            ..RemoteConfig::default()
        };
        let addr = RemoteAddr::parse("sim-b").unwrap();

        let session = remote.session_config(&addr).unwrap();
        assert_eq!(session.user, "administrator");
        assert_eq!(session.port, 2022);
        assert_eq!(session.host_key_policy, HostKeyPolicy::Strict);
    }

    #[test]
    fn default_key_expands_home() {
        temp_env::with_var("HOME", Some("/home/sim"), || {
            let addr = RemoteAddr::parse("sim-b").unwrap();
            let session = RemoteConfig::default().session_config(&addr).unwrap();
            assert_eq!(session.key_path, PathBuf::from("/home/sim/.ssh/id_rsa"));
        });
    }

    #[test]
    fn expand_home_leaves_other_paths_alone() {
        temp_env::with_var("HOME", Some("/home/sim"), || {
            assert_eq!(
                expand_home(Path::new("/etc/ssh/key")).unwrap(),
                PathBuf::from("/etc/ssh/key")
            );
            assert_eq!(
                expand_home(Path::new("~user/key")).unwrap(),
                PathBuf::from("~user/key")
            );
            assert_eq!(
                expand_home(Path::new("~/keys/a")).unwrap(),
                PathBuf::from("/home/sim/keys/a")
            );
        });
    }

    #[test]
    fn expand_home_without_home_is_error() {
        temp_env::with_vars_unset(["HOME", "USERPROFILE"], || {
            assert!(matches!(
                expand_home(Path::new("~/.ssh/id_rsa")),
                Err(Error::InvalidConfig(_))
            ));
        });
    }
}

mod discovery {
    use super::*;
    use std::fs;

    #[test]
    fn no_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::find(dir.path()).is_none());
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.remote.user, "administrator");
    }

    #[test]
    fn finds_alternate_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_ALT), "remote:\n  user: alt\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.remote.user, "alt");
    }

    #[test]
    fn finds_config_in_hidden_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".pairrun")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), "remote:\n  user: hidden\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.remote.user, "hidden");
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "remote:\n  user: found\n").unwrap();
        let explicit = dir.path().join("other.yml");
        fs::write(&explicit, "remote:\n  user: explicit\n").unwrap();

        let config = Config::resolve(Some(explicit.as_path()), dir.path()).unwrap();
        assert_eq!(config.remote.user, "explicit");
    }

    #[test]
    fn missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");

        assert!(matches!(
            Config::resolve(Some(missing.as_path()), dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
    }

    #[test]
    fn init_writes_loadable_template() {
        let dir = tempfile::tempdir().unwrap();

        let path = init_config(dir.path(), false).unwrap();
        assert_eq!(path, dir.path().join(CONFIG_FILENAME));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.local, Config::default().local);
        assert_eq!(config.remote.commands, Config::default().remote.commands);
    }

    #[test]
    fn init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "remote:\n  user: mine\n").unwrap();

        assert!(matches!(
            init_config(dir.path(), false),
            Err(Error::AlreadyExists(_))
        ));
        init_config(dir.path(), true).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.remote.user, "administrator");
    }
}
