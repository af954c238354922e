//! CLI Tooling
//!
//! Command-line interface over the dictionary store, transfer and settings operations,
//! plus a `translate` command that runs the localization engine over a text file.

use crate::config::{AppConfig, ConfigLoader};
use crate::defaults::reset_dictionary;
use crate::dom::{self, Document, NodeId};
use crate::engine::{EngineRuntime, LocalizationEngine, PassOutcome, RuntimeConfig, RuntimeStats};
use crate::error::{ApiError, StorageError};
use crate::settings::{
    export_settings, load_settings, reset_settings, save_settings, PanelPosition, PanelTheme,
};
use crate::store::DictionaryStore;
use crate::transfer::{export_translations, import_translations};
use crate::types::{BackendId, StorageInfo};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Overlay CLI - dictionary store and localization engine
#[derive(Parser)]
#[command(name = "overlay")]
#[command(about = "Exact-match text overlay with a multi-backend dictionary store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the storage areas and the embedded database
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show usage of the active backend
    Info {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show or change the active backend (does not move data)
    Backend {
        #[command(subcommand)]
        command: BackendCommands,
    },
    /// Copy the dictionary to another backend and make it active
    Migrate {
        /// Target backend (sync, local, embedded)
        #[arg(long)]
        to: String,
        /// Source backend; defaults to the active one
        #[arg(long)]
        from: Option<String>,
    },
    /// Replace the dictionary with the content of a JSON file
    Import { file: PathBuf },
    /// Write the dictionary as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Replace the dictionary in the active backend with the default dictionary
    Reset {
        /// Confirm overwriting the current dictionary
        #[arg(long)]
        yes: bool,
    },
    /// Round-trip a probe entry through the active backend
    SelfTest,
    /// Localize each line of a text file and print the result
    Translate {
        file: PathBuf,
        /// Keep the engine running this many seconds, reacting to storage changes
        #[arg(long, default_value = "0")]
        follow_secs: u64,
    },
}

#[derive(Subcommand)]
pub enum BackendCommands {
    Show,
    Set { id: String },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    Show,
    /// Change individual fields; a different backend migrates the dictionary
    Set {
        #[arg(long)]
        backend: Option<String>,
        #[arg(long)]
        update_interval_ms: Option<u64>,
        #[arg(long)]
        max_cache_entries: Option<usize>,
        #[arg(long)]
        debug_mode: Option<bool>,
        #[arg(long)]
        auto_translate: Option<bool>,
        /// side, bottom, floating
        #[arg(long)]
        panel_position: Option<String>,
        /// light, dark, auto
        #[arg(long)]
        panel_theme: Option<String>,
        #[arg(long)]
        auto_backup: Option<bool>,
        #[arg(long)]
        experimental: Option<bool>,
    },
    Reset,
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Merge the config layers and apply command-line overrides.
pub fn load_config(cli: &Cli) -> Result<AppConfig, ApiError> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_with_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    Ok(config)
}

/// CLI context owning the opened dictionary store
pub struct CliContext {
    store: Arc<DictionaryStore>,
    config: AppConfig,
}

impl CliContext {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let data_dir = config.storage.resolve_data_dir()?;
        let store = DictionaryStore::open(&data_dir)?;
        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }

    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = %command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Info { format } => {
                let info = self.store.info()?;
                match format.as_str() {
                    "json" => to_pretty_json(&info),
                    "text" => Ok(format_info_text(&info)),
                    other => Err(ApiError::ConfigError(format!(
                        "Invalid format: {} (must be 'text' or 'json')",
                        other
                    ))),
                }
            }
            Commands::Backend { command } => match command {
                BackendCommands::Show => Ok(self.store.backend()?.to_string()),
                BackendCommands::Set { id } => {
                    let backend = self.store.select_backend(id)?;
                    Ok(format!("Active backend: {}", backend))
                }
            },
            Commands::Migrate { to, from } => {
                let to: BackendId = to.parse()?;
                let from = match from {
                    Some(id) => id.parse()?,
                    None => self.store.backend()?,
                };
                let migrated = self.store.migrate(from, to)?;
                Ok(format!(
                    "Migrated {} entries from {} to {}",
                    migrated.len(),
                    from,
                    to
                ))
            }
            Commands::Import { file } => {
                let text = std::fs::read_to_string(file).map_err(StorageError::from)?;
                let payload = import_translations(&self.store, &text)?;
                Ok(format!(
                    "Imported {} entries ({})",
                    payload.translations.len(),
                    payload.language_pair
                ))
            }
            Commands::Export { out } => {
                let text = export_translations(&self.store)?;
                write_or_return(out.as_deref(), text)
            }
            Commands::Settings { command } => self.handle_settings_command(command),
            Commands::Reset { yes } => {
                if !yes {
                    return Err(ApiError::ConfigError(
                        "Reset overwrites the current dictionary; pass --yes to confirm".to_string(),
                    ));
                }
                let restored = reset_dictionary(&self.store, &self.config.defaults.source())?;
                Ok(format!(
                    "Restored {} default entries ({})",
                    restored.len(),
                    self.store.backend()?
                ))
            }
            Commands::SelfTest => {
                let backend = self.store.backend()?;
                if self.store.self_test()? {
                    Ok(format!("Self-test passed ({})", backend))
                } else {
                    Ok(format!("Self-test FAILED ({})", backend))
                }
            }
            Commands::Translate { file, follow_secs } => self.handle_translate(file, *follow_secs),
        }
    }

    fn handle_settings_command(&self, command: &SettingsCommands) -> Result<String, ApiError> {
        match command {
            SettingsCommands::Show => to_pretty_json(&load_settings(&self.store)?),
            SettingsCommands::Set {
                backend,
                update_interval_ms,
                max_cache_entries,
                debug_mode,
                auto_translate,
                panel_position,
                panel_theme,
                auto_backup,
                experimental,
            } => {
                let mut settings = load_settings(&self.store)?;
                if let Some(id) = backend {
                    settings.backend = id.parse()?;
                }
                if let Some(v) = update_interval_ms {
                    settings.update_interval_ms = *v;
                }
                if let Some(v) = max_cache_entries {
                    settings.max_cache_entries = *v;
                }
                if let Some(v) = debug_mode {
                    settings.debug_mode = *v;
                }
                if let Some(v) = auto_translate {
                    settings.auto_translate = *v;
                }
                if let Some(v) = panel_position {
                    settings.panel_position = parse_keyword::<PanelPosition>("panel position", v)?;
                }
                if let Some(v) = panel_theme {
                    settings.panel_theme = parse_keyword::<PanelTheme>("panel theme", v)?;
                }
                if let Some(v) = auto_backup {
                    settings.auto_backup = *v;
                }
                if let Some(v) = experimental {
                    settings.experimental = *v;
                }
                let saved = save_settings(&self.store, settings)?;
                to_pretty_json(&saved)
            }
            SettingsCommands::Reset => to_pretty_json(&reset_settings(&self.store)?),
            SettingsCommands::Export { out } => {
                let text = export_settings(&load_settings(&self.store)?)?;
                write_or_return(out.as_deref(), text)
            }
        }
    }

    fn handle_translate(&self, file: &Path, follow_secs: u64) -> Result<String, ApiError> {
        let text = std::fs::read_to_string(file).map_err(StorageError::from)?;
        let mut document = Document::new();
        let body = document.body();
        let mut lines: Vec<NodeId> = Vec::new();
        for line in text.lines() {
            let div = document.append_element(body, "div")?;
            lines.push(document.append_text(div, line)?);
        }

        let document = dom::shared(document);
        let engine = Arc::new(LocalizationEngine::new(
            Arc::clone(&self.store),
            Arc::clone(&document),
            self.config.defaults.source(),
        ));

        if follow_secs == 0 {
            if let PassOutcome::Failed(reason) = engine.bootstrap() {
                return Err(ApiError::ConfigError(format!("Localization failed: {}", reason)));
            }
        } else {
            let stats = self.follow(&engine, Duration::from_secs(follow_secs))?;
            info!(passes = stats.passes, translated = stats.translated, "Follow finished");
        }

        let document = document.lock();
        let mut output = Vec::with_capacity(lines.len());
        for node in lines {
            output.push(document.text(node)?.to_string());
        }
        Ok(output.join("\n"))
    }

    fn follow(
        &self,
        engine: &Arc<LocalizationEngine>,
        duration: Duration,
    ) -> Result<RuntimeStats, ApiError> {
        let settings = load_settings(&self.store)?;
        let runtime = EngineRuntime::new(Arc::clone(engine), RuntimeConfig::from_settings(&settings));
        let _watcher = if self.config.watch.external_changes {
            Some(self.store.platform().watch_external_changes()?)
        } else {
            None
        };
        let mutations = engine.document().lock().observe();
        let changes = self.store.platform().changes().subscribe();
        let stop = runtime.stop_handle();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StorageError::from)?;
        let stats = rt.block_on(async {
            let run = runtime.run(mutations, changes);
            tokio::pin!(run);
            tokio::select! {
                stats = &mut run => stats,
                _ = tokio::time::sleep(duration) => {
                    stop.stop();
                    run.await
                }
            }
        });
        Ok(stats)
    }
}

fn command_name(command: &Commands) -> String {
    match command {
        Commands::Info { .. } => "info".to_string(),
        Commands::Backend { command } => match command {
            BackendCommands::Show => "backend.show".to_string(),
            BackendCommands::Set { .. } => "backend.set".to_string(),
        },
        Commands::Migrate { .. } => "migrate".to_string(),
        Commands::Import { .. } => "import".to_string(),
        Commands::Export { .. } => "export".to_string(),
        Commands::Settings { command } => format!("settings.{}", settings_command_name(command)),
        Commands::Reset { .. } => "reset".to_string(),
        Commands::SelfTest => "self-test".to_string(),
        Commands::Translate { .. } => "translate".to_string(),
    }
}

fn settings_command_name(command: &SettingsCommands) -> &'static str {
    match command {
        SettingsCommands::Show => "show",
        SettingsCommands::Set { .. } => "set",
        SettingsCommands::Reset => "reset",
        SettingsCommands::Export { .. } => "export",
    }
}

/// Format storage info as a two-column table.
pub fn format_info_text(info: &StorageInfo) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Backend", "Entries", "Size", "Limit", "Used"]);
    table.add_row(vec![
        info.backend.to_string(),
        info.count.to_string(),
        info.size_formatted.clone(),
        info.backend.format_size(info.limit),
        format!("{:.1}%", info.percent_used),
    ]);
    table.to_string()
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value).map_err(StorageError::from)?)
}

/// Parse a lowercase keyword through the type's serde names.
fn parse_keyword<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .map_err(|_| ApiError::ConfigError(format!("Invalid {}: {}", what, raw)))
}

fn write_or_return(out: Option<&Path>, text: String) -> Result<String, ApiError> {
    match out {
        Some(path) => {
            std::fs::write(path, &text).map_err(StorageError::from)?;
            Ok(format!("Wrote {}", path.display()))
        }
        None => Ok(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::settings::Settings;
    use tempfile::TempDir;

    fn context() -> (CliContext, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            storage: StorageConfig {
                data_dir: Some(dir.path().to_path_buf()),
            },
            ..AppConfig::default()
        };
        (CliContext::new(config).unwrap(), dir)
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "overlay",
            "--data-dir",
            "/tmp/overlay",
            "--log-level",
            "debug",
            "migrate",
            "--to",
            "embedded",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/overlay")));
        assert!(matches!(cli.command, Commands::Migrate { ref to, from: None } if to == "embedded"));
    }

    #[test]
    fn test_backend_set_rejects_unknown_id() {
        let (ctx, _dir) = context();
        let result = ctx.execute(&Commands::Backend {
            command: BackendCommands::Set {
                id: "cloud".to_string(),
            },
        });
        assert!(matches!(result, Err(ApiError::InvalidBackend(_))));
        assert_eq!(
            ctx.execute(&Commands::Backend {
                command: BackendCommands::Show
            })
            .unwrap(),
            "local"
        );
    }

    #[test]
    fn test_import_then_translate_file() {
        let (ctx, dir) = context();
        let import = dir.path().join("import.json");
        std::fs::write(&import, r#"{"translations":{"Save":"Speichern"},"languagePair":"en-de"}"#)
            .unwrap();
        let out = ctx
            .execute(&Commands::Import {
                file: import.clone(),
            })
            .unwrap();
        assert_eq!(out, "Imported 1 entries (en-de)");

        let page = dir.path().join("page.txt");
        std::fs::write(&page, "Save\n  Save  \nSave changes\n").unwrap();
        let out = ctx
            .execute(&Commands::Translate {
                file: page,
                follow_secs: 0,
            })
            .unwrap();
        assert_eq!(out, "Speichern\n  Speichern  \nSave changes");
    }

    #[test]
    fn test_reset_restores_bundled_defaults() {
        let (ctx, dir) = context();
        let import = dir.path().join("import.json");
        std::fs::write(&import, r#"{"translations":{"Custom":"Eigen"}}"#).unwrap();
        ctx.execute(&Commands::Import { file: import }).unwrap();

        assert!(ctx.execute(&Commands::Reset { yes: false }).is_err());
        assert!(ctx.store().load().unwrap().contains_key("Custom"));

        let out = ctx.execute(&Commands::Reset { yes: true }).unwrap();
        assert!(out.starts_with("Restored "));
        let stored = ctx.store().load().unwrap();
        assert!(!stored.contains_key("Custom"));
        assert_eq!(stored.get("OK").map(String::as_str), Some("In Ordnung"));
    }

    #[test]
    fn test_info_text_renders_table() {
        let (ctx, _dir) = context();
        let out = ctx
            .execute(&Commands::Info {
                format: "text".to_string(),
            })
            .unwrap();
        assert!(out.contains("Backend"));
        assert!(out.contains("local"));
        assert!(ctx
            .execute(&Commands::Info {
                format: "yaml".to_string()
            })
            .is_err());
    }

    #[test]
    fn test_settings_set_parses_keywords() {
        let (ctx, _dir) = context();
        let out = ctx
            .execute(&Commands::Settings {
                command: SettingsCommands::Set {
                    backend: None,
                    update_interval_ms: Some(50),
                    max_cache_entries: None,
                    debug_mode: Some(true),
                    auto_translate: None,
                    panel_position: Some("Bottom".to_string()),
                    panel_theme: Some("dark".to_string()),
                    auto_backup: None,
                    experimental: None,
                },
            })
            .unwrap();
        let saved: Settings = serde_json::from_str(&out).unwrap();
        assert_eq!(saved.update_interval_ms, 500);
        assert_eq!(saved.panel_position, PanelPosition::Bottom);
        assert_eq!(saved.panel_theme, PanelTheme::Dark);
        assert!(saved.debug_mode);

        assert!(parse_keyword::<PanelTheme>("panel theme", "neon").is_err());
    }
}
