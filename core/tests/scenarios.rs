use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use clidef_core::*;

/// `build` with required `threads` (1..=8) and `mode` (dev|prod), plus an
/// unscoped global `verbose` flag.
fn build_config() -> CliConfig {
    CliConfig::new("tool")
        .with_option("verbose", OptionSchema::flag().with_alias('v'))
        .with_command(
            "build",
            CommandDef::new()
                .with_option(
                    "threads",
                    OptionSchema::new(NumberOption::new().with_min(1.0).with_max(8.0)).required(),
                )
                .with_option("mode", OptionSchema::enumeration(["dev", "prod"]).required()),
        )
}

fn build(argv: &[&str]) -> Result<BuiltContext> {
    build_context_with_env(&build_config(), argv, BTreeMap::new())
}

#[test]
fn test_scenario_full_invocation() {
    let ctx = build(&["build", "--threads=4", "--mode=dev", "--verbose"])
        .unwrap()
        .context;

    let expected: OptionValues = [
        ("verbose".to_string(), OptionValue::Bool(true)),
        ("threads".to_string(), OptionValue::from(4)),
        ("mode".to_string(), OptionValue::from("dev")),
    ]
    .into_iter()
    .collect();
    assert_eq!(ctx.options.len(), 3);
    for (name, value) in expected.iter() {
        assert_eq!(ctx.options.get(name), Some(value), "option {name}");
    }
    assert!(ctx.args.is_empty());
}

#[test]
fn test_scenario_threads_below_min() {
    let err = build(&["build", "--threads=0", "--mode=dev"]).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::BelowMin { ref option, .. }) if option == "threads"
    ));
}

#[test]
fn test_scenario_required_enum_missing() {
    let err = build(&["build", "--threads=2"]).unwrap_err();
    assert_eq!(
        err,
        Error::Validation(ValidationError::RequiredMissing("mode".into()))
    );
}

#[test]
fn test_scenario_enum_value_not_in_choices() {
    let err = build(&["build", "--threads=2", "--mode=staging"]).unwrap_err();
    assert_eq!(
        err,
        Error::Parse(ParseError::NotInChoices {
            option: "mode".into(),
            value: "staging".into()
        })
    );
}

#[test]
fn test_scenario_unknown_option() {
    let err = build(&["build", "--unknown"]).unwrap_err();
    assert_eq!(err, Error::Parse(ParseError::UnknownOption("--unknown".into())));
}

#[test]
fn test_scenario_duplicate_option() {
    let err = build(&["build", "--verbose", "--verbose"]).unwrap_err();
    assert_eq!(err.code(), "E_PARSE");
    assert!(matches!(err, Error::Parse(ParseError::DuplicateOption(_))));
}

#[test]
fn test_scenario_empty_argv() {
    let empty: [&str; 0] = [];
    let err = build(&empty).unwrap_err();
    assert_eq!(
        err,
        Error::CommandNotFound {
            path: vec![EMPTY_PATH_MARKER.to_string()]
        }
    );
    assert_eq!(err.code(), "E_COMMAND_NOT_FOUND");
}

#[test]
fn test_resolution_takes_longest_registered_prefix() {
    let config = CliConfig::new("tool").with_command(
        "remote",
        CommandDef::new().with_command(
            "add",
            CommandDef::new().with_command("mirror", CommandDef::new()),
        ),
    );
    let cases: &[(&[&str], usize)] = &[
        (&["remote"], 1),
        (&["remote", "add"], 2),
        (&["remote", "add", "mirror"], 3),
        (&["remote", "add", "mirror", "extra"], 3),
        (&["remote", "add", "--", "mirror"], 2),
    ];
    for (argv, depth) in cases {
        let ctx = build_context_with_env(&config, argv, BTreeMap::new())
            .unwrap()
            .context;
        assert_eq!(ctx.command.path.len(), *depth, "argv {argv:?}");
    }
}

#[test]
fn test_flag_negation_and_presence() {
    for default in [true, false] {
        let mut schema = OptionRecord::new();
        schema.insert(
            "color",
            OptionSchema::new(FlagOption::new().with_default(default)),
        );
        let negated = parse_options(&["--no-color"], &schema).unwrap();
        assert_eq!(negated.get("color"), Some(&OptionValue::Bool(false)));
        let present = parse_options(&["--color"], &schema).unwrap();
        assert_eq!(present.get("color"), Some(&OptionValue::Bool(true)));
    }
}

#[test]
fn test_number_default_keeps_its_type() {
    let mut schema = OptionRecord::new();
    schema.insert("retries", OptionSchema::new(NumberOption::new().with_default(3)));
    schema.insert("ratio", OptionSchema::new(NumberOption::new().with_default(0.5)));

    let values = parse_options(&["--retries", "--ratio"], &schema).unwrap();
    assert!(matches!(
        values.get("retries"),
        Some(OptionValue::Number(Number::Integer(3)))
    ));
    assert!(matches!(
        values.get("ratio"),
        Some(OptionValue::Number(Number::Float(r))) if *r == 0.5
    ));
}

#[test]
fn test_normalization_is_idempotent() {
    let mut record = OptionRecord::new();
    record.insert(
        "verbose",
        OptionSchema::flag().with_alias('v').with_alias('V').with_alias('v'),
    );
    record.insert("mode", OptionSchema::enumeration(["a", "b"]));

    let once = normalize_option_record(&record);
    let twice = normalize_option_record(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_alias_shared_across_scopes() {
    let same_name = CliConfig::new("tool")
        .with_option("force", OptionSchema::flag().with_alias('f'))
        .with_command(
            "push",
            CommandDef::new().with_option("force", OptionSchema::flag().with_alias('f')),
        );
    assert!(Cli::new(same_name).is_ok());

    let other_name = CliConfig::new("tool")
        .with_option("force", OptionSchema::flag().with_alias('f'))
        .with_command(
            "push",
            CommandDef::new().with_option("file", OptionSchema::string().with_alias('f')),
        );
    assert_eq!(Cli::new(other_name).unwrap_err().code(), "E_OPTION_CONFLICT");
}

#[test]
fn test_relaxed_pass_rejects_duplicate_global() {
    let err = build(&["build", "--threads=2", "--mode=dev", "x", "-v", "-v"]).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::DuplicateOption(_))));
}

#[test]
fn test_yaml_config_drives_dispatch() {
    let yaml = r#"
name: deploy
version: 2.1.0
options:
  verbose:
    kind: flag
    alias: v
commands:
  release:
    description: Cut a release
    options:
      channel:
        kind: enum
        choices: [stable, beta]
        default: stable
      dry_run:
        kind: flag
"#;
    let config: CliConfig = serde_yaml::from_str(yaml).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = CommandHandler::new(move |ctx| {
        sink.lock().unwrap().push((
            ctx.command.display_path(),
            ctx.value_or_default("channel"),
            ctx.flag("verbose"),
            ctx.flag("dry_run"),
        ));
        Ok(Some(format!("released {}", ctx.args.join(" "))))
    });
    let cli = Cli::new(config.with_default_handler(handler)).unwrap();

    assert_eq!(
        cli.execute(&["release", "-v", "v2"]).unwrap(),
        Outcome::Completed(Some("released v2".into()))
    );
    assert_eq!(
        cli.execute(&["release", "--version"]).unwrap(),
        Outcome::Version("deploy 2.1.0".into())
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(
            "release".to_string(),
            Some(OptionValue::from("stable")),
            true,
            false
        )]
    );
}

#[test]
fn test_hooks_observe_dispatch() {
    struct Trace(Arc<Mutex<Vec<String>>>);

    impl Hook for Trace {
        fn name(&self) -> &str {
            "trace"
        }

        fn on_register(&self, config: &CliConfig) {
            self.0.lock().unwrap().push(format!("register {}", config.name));
        }

        fn on_parse(&self, argv: &[String]) {
            self.0.lock().unwrap().push(format!("parse {}", argv.len()));
        }

        fn before_run(&self, ctx: &ExecutionContext) {
            self.0
                .lock()
                .unwrap()
                .push(format!("before {}", ctx.command.display_path()));
        }

        fn after_run(&self, _ctx: &ExecutionContext, output: Option<&str>) {
            self.0
                .lock()
                .unwrap()
                .push(format!("after {}", output.unwrap_or("-")));
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let config = CliConfig::new("tool").with_command(
        "ping",
        CommandDef::new().with_handler(|_| Ok(Some("pong".to_string()))),
    );
    let mut cli = Cli::new(config).unwrap();
    cli.register_hook(Trace(Arc::clone(&log)));

    assert_eq!(cli.run(&["ping"]), 0);
    assert_eq!(cli.run(&["pong"]), 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["register tool", "parse 1", "before ping", "after pong", "parse 1"]
    );
}
