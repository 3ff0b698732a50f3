// src/config.rs
use crate::constants::{
    DEFAULT_ATTACHMENTS_DIR, DEFAULT_CONCURRENCY, DEFAULT_MIGRATION_LOG, MAX_CONCURRENCY,
};
use crate::error::AppError;
use crate::formatting::{ConversionSettings, PropertyFilter};
use crate::output::TitlePolicy;
use crate::types::{ApiKey, DatabaseId, ValidationError};
use clap::Parser;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed command-line input.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Migrate a Notion database into an Obsidian vault", long_about = None)]
pub struct CommandLineInput {
    /// Notion database URL or ID (may also come from the settings file)
    pub database: Option<String>,

    /// Root folder of the Obsidian vault
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Folder inside the vault that receives the notes (must exist)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Folder inside the vault that receives attachments
    #[arg(long)]
    pub attachments: Option<PathBuf>,

    /// How note names are made unique
    #[arg(long, value_enum)]
    pub title_policy: Option<TitlePolicy>,

    /// Write only the property header, not the page content
    #[arg(long, default_value_t = false)]
    pub no_body: bool,

    /// Write relations as a YAML list instead of an inline array
    #[arg(long, default_value_t = false)]
    pub relations_as_list: bool,

    /// Also write `Key:: [[A]], [[B]]` relation lines below the header
    #[arg(long, default_value_t = false)]
    pub semantic_links: bool,

    /// Rewrite date property keys to lower snake case
    #[arg(long, default_value_t = false)]
    pub normalize_date_keys: bool,

    /// Leave a property out of the header (repeatable)
    #[arg(long = "disable-property", value_name = "NAME")]
    pub disabled_properties: Vec<String>,

    /// Number of documents converted at once (1-32, default 4). On Ctrl-C,
    /// documents already running finish; use 1 to stop right after the current one
    #[arg(long)]
    pub concurrency: Option<u32>,

    /// JSON settings file; command-line flags take precedence
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Application log file (defaults to notion2vault.log in the temp dir)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Persisted migration log (defaults to <vault>/.notion2vault/migration.log)
    #[arg(long)]
    pub migration_log: Option<PathBuf>,

    /// Empty the migration log before starting
    #[arg(long, default_value_t = false)]
    pub clear_log: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Settings file contents. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct SettingsFile {
    pub api_key: Option<String>,
    pub database: Option<String>,
    pub vault: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub attachments: Option<PathBuf>,
    pub title_policy: Option<TitlePolicy>,
    pub include_body: Option<bool>,
    pub relations_as_list: Option<bool>,
    pub semantic_links: Option<bool>,
    pub normalize_date_keys: Option<bool>,
    pub concurrency: Option<u32>,
    pub migration_log: Option<PathBuf>,
    /// Per-property switches; `false` leaves the property out.
    pub properties: IndexMap<String, bool>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| AppError::SettingsFile {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        serde_json::from_str(&text).map_err(|e| AppError::SettingsFile {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }
}

/// Resolved migration configuration.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub collection: DatabaseId,
    pub api_key: ApiKey,
    pub vault: PathBuf,
    pub conversion: ConversionSettings,
    pub concurrency: usize,
    pub migration_log: PathBuf,
    pub clear_log: bool,
}

impl MigrationConfig {
    /// Resolves configuration from CLI input, the settings file and the environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let settings = match &cli.settings {
            Some(path) => SettingsFile::load(path)?,
            None => SettingsFile::default(),
        };
        let env_key = std::env::var("NOTION_API_KEY").ok();
        Self::from_parts(cli, settings, env_key)
    }

    /// Merges the three sources. The command line wins over the settings
    /// file; the environment wins over the settings file for the API key.
    pub fn from_parts(
        cli: CommandLineInput,
        settings: SettingsFile,
        env_key: Option<String>,
    ) -> Result<Self, AppError> {
        let api_key = env_key.or(settings.api_key).ok_or_else(|| {
            AppError::MissingConfiguration(
                "NOTION_API_KEY environment variable not set".to_string(),
            )
        })?;
        let api_key = ApiKey::new(api_key)?;

        let database = cli.database.or(settings.database).ok_or_else(|| {
            AppError::MissingConfiguration("No database URL or ID given".to_string())
        })?;
        let collection = DatabaseId::parse(&database)?;

        let vault = cli.vault.or(settings.vault).ok_or_else(|| {
            AppError::MissingConfiguration("No vault folder given (--vault)".to_string())
        })?;

        let concurrency = cli
            .concurrency
            .or(settings.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY as u32);
        if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ValidationError::OutOfBounds {
                value: concurrency,
                min: 1,
                max: MAX_CONCURRENCY,
            }
            .into());
        }

        let property_filter = cli
            .disabled_properties
            .into_iter()
            .fold(PropertyFilter::new(settings.properties), |filter, name| {
                filter.disable(name)
            });

        let conversion = ConversionSettings {
            destination: cli.destination.or(settings.destination).unwrap_or_default(),
            attachments: cli
                .attachments
                .or(settings.attachments)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ATTACHMENTS_DIR)),
            title_policy: cli
                .title_policy
                .or(settings.title_policy)
                .unwrap_or_default(),
            include_body: !cli.no_body && settings.include_body.unwrap_or(true),
            relations_as_list: cli.relations_as_list
                || settings.relations_as_list.unwrap_or(false),
            semantic_links: cli.semantic_links || settings.semantic_links.unwrap_or(false),
            normalize_date_keys: cli.normalize_date_keys
                || settings.normalize_date_keys.unwrap_or(false),
            property_filter,
        };

        let migration_log = cli
            .migration_log
            .or(settings.migration_log)
            .unwrap_or_else(|| vault.join(DEFAULT_MIGRATION_LOG));

        Ok(Self {
            collection,
            api_key,
            vault,
            conversion,
            concurrency: concurrency as usize,
            migration_log,
            clear_log: cli.clear_log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: &str = "secret_abcdefghijklmnopqrstuvwxyz";
    const DB: &str = "https://www.notion.so/team/Reading-List-0123456789abcdef0123456789abcdef?v=1";

    fn cli() -> CommandLineInput {
        CommandLineInput {
            database: Some(DB.to_string()),
            vault: Some(PathBuf::from("/vault")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::from_parts(cli(), SettingsFile::default(), Some(KEY.into()))
            .unwrap();
        assert_eq!(config.collection.as_str(), "0123456789abcdef0123456789abcdef");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.conversion.title_policy, TitlePolicy::AppendId);
        assert!(config.conversion.include_body);
        assert_eq!(config.conversion.attachments, PathBuf::from("attachments"));
        assert_eq!(
            config.migration_log,
            PathBuf::from("/vault/.notion2vault/migration.log")
        );
    }

    #[test]
    fn test_cli_overrides_settings() {
        let settings = SettingsFile {
            destination: Some("FromFile".into()),
            title_policy: Some(TitlePolicy::AppendId),
            include_body: Some(true),
            properties: IndexMap::from([("Secret".to_string(), false)]),
            ..Default::default()
        };
        let cli = CommandLineInput {
            destination: Some("FromCli".into()),
            title_policy: Some(TitlePolicy::Deduplicate),
            no_body: true,
            disabled_properties: vec!["Internal".into()],
            ..cli()
        };

        let config = MigrationConfig::from_parts(cli, settings, Some(KEY.into())).unwrap();
        assert_eq!(config.conversion.destination, PathBuf::from("FromCli"));
        assert_eq!(config.conversion.title_policy, TitlePolicy::Deduplicate);
        assert!(!config.conversion.include_body);
        assert!(!config.conversion.property_filter.is_enabled("Secret"));
        assert!(!config.conversion.property_filter.is_enabled("Internal"));
        assert!(config.conversion.property_filter.is_enabled("Status"));
    }

    #[test]
    fn test_missing_api_key() {
        let err = MigrationConfig::from_parts(cli(), SettingsFile::default(), None).unwrap_err();
        assert!(matches!(err, AppError::MissingConfiguration(_)));
    }

    #[test]
    fn test_concurrency_bounds() {
        let cli = CommandLineInput {
            concurrency: Some(0),
            ..cli()
        };
        let err =
            MigrationConfig::from_parts(cli, SettingsFile::default(), Some(KEY.into())).unwrap_err();
        assert!(matches!(
            err,
            AppError::ValidationError(ValidationError::OutOfBounds { value: 0, .. })
        ));
    }

    #[test]
    fn test_settings_file_supplies_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "api_key": "ntn_abcdefghijklmnopqrstuvwxyz",
                "database": "0123456789abcdef0123456789abcdef",
                "vault": "/notes",
                "title_policy": "deduplicate",
                "relations_as_list": true,
                "properties": { "Owner": false }
            }"#,
        )
        .unwrap();

        let settings = SettingsFile::load(&path).unwrap();
        let config = MigrationConfig::from_parts(
            CommandLineInput::default(),
            settings,
            None,
        )
        .unwrap();
        assert_eq!(config.vault, PathBuf::from("/notes"));
        assert_eq!(config.conversion.title_policy, TitlePolicy::Deduplicate);
        assert!(config.conversion.relations_as_list);
        assert!(!config.conversion.property_filter.is_enabled("Owner"));
    }

    #[test]
    fn test_unreadable_settings_file() {
        let err = SettingsFile::load(Path::new("/definitely/missing.json")).unwrap_err();
        assert!(matches!(err, AppError::SettingsFile { .. }));
    }
}
