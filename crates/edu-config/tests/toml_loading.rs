use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use edu_config::EduConfig;

#[test]
fn toml_sections_are_extracted() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [database]
            path = "/var/lib/edu/edu.db"

            [approval]
            final_approvers = ["usr-00000001", "usr-00000002"]

            [general]
            default_limit = 50
            "#,
        )?;

        let config: EduConfig = Figment::from(Serialized::defaults(EduConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/edu/edu.db");
        assert_eq!(
            config.approval.final_approvers,
            vec!["usr-00000001".to_string(), "usr-00000002".to_string()]
        );
        assert!(config.approval.is_final_approver("usr-00000002"));
        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [general]
            default_limit = 5
            "#,
        )?;

        let config: EduConfig = Figment::from(Serialized::defaults(EduConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.general.default_limit, 5);
        assert_eq!(config.database.path, ".edu/edu.db");
        assert!(config.approval.final_approvers.is_empty());
        Ok(())
    });
}

#[test]
fn project_config_file_is_picked_up() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".edu"))
            .map_err(|e| e.to_string())?;
        jail.create_file(
            ".edu/config.toml",
            r#"
            [database]
            path = "project.db"
            "#,
        )?;

        let config = EduConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.database.path, "project.db");
        Ok(())
    });
}
