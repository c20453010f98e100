use super::*;

#[test]
fn collect_defaults_to_all_sources_and_table() {
    let cli = Cli::try_parse_from(["crowdpulse-cli", "collect"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Collect {
            source: SourceArg::All,
            trigger_time: None,
            max_posts: None,
            format: OutputFormat::Table,
        }
    ));
}

#[test]
fn collect_accepts_every_flag() {
    let cli = Cli::try_parse_from([
        "crowdpulse-cli",
        "collect",
        "--source",
        "xueqiu",
        "--trigger-time",
        "2026-03-02 15:00:00",
        "--max-posts",
        "20",
        "--format",
        "json",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Collect {
            source,
            trigger_time,
            max_posts,
            format,
        } => {
            assert_eq!(source, SourceArg::Xueqiu);
            assert_eq!(trigger_time.as_deref(), Some("2026-03-02 15:00:00"));
            assert_eq!(max_posts, Some(20));
            assert_eq!(format, OutputFormat::Json);
        }
        Commands::Targets { .. } => panic!("expected collect"),
    }
}

#[test]
fn unknown_source_is_rejected() {
    assert!(Cli::try_parse_from(["crowdpulse-cli", "collect", "--source", "weibo"]).is_err());
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["crowdpulse-cli"]).is_err());
}

#[test]
fn targets_parses_source() {
    let cli = Cli::try_parse_from(["crowdpulse-cli", "targets", "--source", "eastmoney"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Targets {
            source: SourceArg::Eastmoney
        }
    ));
}

#[test]
fn source_arg_expands_to_source_types() {
    assert_eq!(SourceArg::All.sources(), SourceType::ALL.to_vec());
    assert_eq!(
        SourceArg::Eastmoney.sources(),
        vec![SourceType::EastmoneyCommunity]
    );
}

#[test]
fn default_trigger_time_is_second_precision_local_time() {
    let ts = collect::default_trigger_time();
    assert!(
        chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").is_ok(),
        "unexpected trigger time {ts}"
    );
}

#[test]
fn config_maps_onto_fetch_and_pipeline() {
    let mut vars = std::collections::HashMap::new();
    vars.insert("CROWDPULSE_MAX_IN_FLIGHT", "3");
    vars.insert("CROWDPULSE_PACING_MIN_MS", "10");
    vars.insert("CROWDPULSE_PACING_MAX_MS", "20");
    vars.insert("CROWDPULSE_RUN_TIMEOUT_SECS", "90");
    let config = crowdpulse_core::build_app_config(|key| {
        vars.get(key)
            .map(|v| (*v).to_string())
            .ok_or(std::env::VarError::NotPresent)
    })
    .expect("valid config");

    let fetch = collect::fetch_config(&config);
    assert_eq!(fetch.max_in_flight, 3);
    assert_eq!(fetch.pacing, crowdpulse_fetch::Pacing::new(10, 20));

    let pipeline = collect::pipeline_config(&config, Some(7));
    assert_eq!(pipeline.max_posts, 7);
    assert_eq!(pipeline.max_concurrent_targets, 3);
    assert_eq!(pipeline.run_timeout, Some(std::time::Duration::from_secs(90)));
}

#[test]
fn adapters_follow_configured_targets() {
    let config = crowdpulse_core::build_app_config(|_| Err(std::env::VarError::NotPresent))
        .expect("valid config");
    let targets = crowdpulse_core::TargetsFile::default();

    let eastmoney = collect::build_adapter(SourceType::EastmoneyCommunity, &targets, &config);
    assert_eq!(eastmoney.enumerate_targets().len(), 20);

    let xueqiu = collect::build_adapter(SourceType::XueqiuCommunity, &targets, &config);
    assert_eq!(xueqiu.enumerate_targets().len(), 4);
    assert_eq!(xueqiu.pages_per_target(), 5);
}
