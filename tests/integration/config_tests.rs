use dupsift::config::{Settings, SettingsError};
use dupsift::duplicates::{DuplicateFinder, FinderConfig};
use dupsift::output::OutputFormat;
use dupsift::scanner::DigestAlgorithm;
use figment::Jail;
use std::path::Path;

#[test]
fn test_settings_drive_a_scan() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "dupsift.toml",
            r#"
            output = "csv"

            [hashing]
            digest = "sha256"

            [walk]
            exclude = ["ignored/"]
            "#,
        )?;
        jail.create_dir("data")?;
        jail.create_dir("data/ignored")?;
        jail.create_file("data/a.txt", "same")?;
        jail.create_file("data/b.txt", "same")?;
        jail.create_file("data/ignored/c.txt", "same")?;

        let settings = Settings::load(Some(Path::new("dupsift.toml"))).unwrap();
        assert_eq!(settings.output, OutputFormat::Csv);

        let config = FinderConfig::default()
            .with_hashing(settings.hashing.clone())
            .with_walker_config(settings.walker_config());
        let finder = DuplicateFinder::new(config).unwrap();
        let (groups, _) = finder.find_duplicates(&jail.directory().join("data")).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].files.len(), 2);
        assert_eq!(groups[0].algorithm, DigestAlgorithm::Sha256);
        Ok(())
    });
}

#[test]
fn test_env_layer_without_file() {
    Jail::expect_with(|jail| {
        jail.set_env("DUPSIFT_HASHING__SAMPLE_MIDDLE", "false");
        jail.set_env("DUPSIFT_WALK__SKIP_HIDDEN", "true");
        jail.set_env("DUPSIFT_OUTPUT", "json");

        let figment = Settings::figment(None).unwrap();
        let settings: Settings = figment.extract()?;

        assert!(!settings.hashing.sample_middle);
        assert!(settings.walk.skip_hidden);
        assert_eq!(settings.output, OutputFormat::Json);
        Ok(())
    });
}

#[test]
fn test_invalid_env_value_is_reported() {
    Jail::expect_with(|jail| {
        jail.create_file("dupsift.toml", "")?;
        jail.set_env("DUPSIFT_HASHING__SAMPLE_WINDOW", "0");

        let settings = Settings::load(Some(Path::new("dupsift.toml"))).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SettingsError::Hashing(_)));
        assert!(err.to_string().contains("greater than zero"));

        // The finder refuses the same settings
        let config = FinderConfig::default().with_hashing(settings.hashing.clone());
        assert!(DuplicateFinder::new(config).is_err());
        Ok(())
    });
}

#[test]
fn test_cli_flag_repairs_invalid_file() {
    use clap::Parser;
    use dupsift::cli::{Cli, Commands};

    Jail::expect_with(|jail| {
        jail.create_file(
            "dupsift.toml",
            "[hashing]\nsample_threshold = 100\nsample_window = 200\n",
        )?;
        jail.create_dir("data")?;
        jail.create_file("data/a.txt", "same content")?;
        jail.create_file("data/b.txt", "same content")?;

        let cli = Cli::parse_from(["dupsift", "scan", "data", "--sample-window", "50"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan command");
        };

        let mut settings = Settings::load(Some(Path::new("dupsift.toml"))).unwrap();
        settings.apply_scan_args(&args).unwrap();

        let config = FinderConfig::default().with_hashing(settings.hashing.clone());
        let (groups, _) = DuplicateFinder::new(config)
            .unwrap()
            .find_duplicates(&jail.directory().join("data"))
            .unwrap();
        assert_eq!(groups.len(), 1);
        Ok(())
    });
}
