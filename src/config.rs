//! Flag-file configuration.
//!
//! A config file holds CLI flag tokens, one or more per line, with `#`
//! comments. The global file and the local `.mdviewrc` are merged with
//! [`ConfigFlags::union`], then the command line is merged on top.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::editor::DEFAULT_RENDER_DEBOUNCE_MS;
use crate::highlight::HighlightBackground;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn background(self) -> HighlightBackground {
        match self {
            Self::Auto => HighlightBackground::detect(),
            Self::Light => HighlightBackground::Light,
            Self::Dark => HighlightBackground::Dark,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Which backend turns content into HTML.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererMode {
    /// comrak and syntect in-process.
    #[default]
    Native,
    /// An external converter process.
    Process,
}

impl RendererMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Process => "process",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_watch: bool,
    pub perf: bool,
    pub debounce_ms: Option<u64>,
    pub renderer: Option<RendererMode>,
    pub converter: Option<PathBuf>,
    pub theme: Option<ThemeMode>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: booleans OR together, valued options
    /// from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_watch: self.no_watch || other.no_watch,
            perf: self.perf || other.perf,
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            renderer: other.renderer.or(self.renderer),
            converter: other.converter.clone().or_else(|| self.converter.clone()),
            theme: other.theme.or(self.theme),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

/// Effective runtime settings after all config layers are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub watch: bool,
    pub perf: bool,
    pub debounce_ms: u64,
    pub renderer: RendererMode,
    /// Converter program for [`RendererMode::Process`]; `None` means this
    /// executable's own `render` subcommand.
    pub converter: Option<PathBuf>,
    pub theme: ThemeMode,
    pub render_debug_log: Option<PathBuf>,
}

impl Settings {
    pub fn from_flags(flags: &ConfigFlags) -> Self {
        Self {
            watch: !flags.no_watch,
            perf: flags.perf,
            debounce_ms: flags.debounce_ms.unwrap_or(DEFAULT_RENDER_DEBOUNCE_MS),
            renderer: flags.renderer.unwrap_or_default(),
            converter: flags.converter.clone(),
            theme: flags.theme.unwrap_or_default(),
            render_debug_log: flags.render_debug_log.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_flags(&ConfigFlags::default())
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mdview").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("mdview")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mdview").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("mdview").join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mdviewrc")
}

/// Global then local config, merged. Missing files count as empty.
///
/// # Errors
/// Returns an error if an existing config file cannot be read.
pub fn load_layered(global: &Path, local: &Path) -> Result<ConfigFlags> {
    Ok(load_config_flags(global)?.union(&load_config_flags(local)?))
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mdview defaults (saved with --save)".to_string()];
    if flags.no_watch {
        lines.push("--no-watch".to_string());
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if let Some(renderer) = flags.renderer {
        lines.push(format!("--renderer {}", renderer.as_str()));
    }
    if let Some(converter) = &flags.converter {
        lines.push(format!("--converter {}", converter.display()));
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list. Unknown tokens and
/// unparsable values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline_value.map(str::to_string).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--no-watch" => flags.no_watch = true,
            "--perf" => flags.perf = true,
            "--debounce-ms" => flags.debounce_ms = value().and_then(|v| v.parse().ok()),
            "--renderer" => flags.renderer = value().and_then(|v| parse_renderer(&v)),
            "--converter" => flags.converter = value().map(PathBuf::from),
            "--theme" => flags.theme = value().and_then(|v| parse_theme(&v)),
            "--render-debug-log" => flags.render_debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

fn parse_renderer(s: &str) -> Option<RendererMode> {
    match s {
        "native" => Some(RendererMode::Native),
        "process" => Some(RendererMode::Process),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "mdview",
            "--no-watch",
            "--debounce-ms",
            "250",
            "--renderer=process",
            "--converter",
            "/usr/local/bin/md2html",
            "--theme",
            "dark",
            "--render-debug-log=render.log",
            "README.md",
        ]));
        assert!(flags.no_watch);
        assert_eq!(flags.debounce_ms, Some(250));
        assert_eq!(flags.renderer, Some(RendererMode::Process));
        assert_eq!(flags.converter, Some(PathBuf::from("/usr/local/bin/md2html")));
        assert_eq!(flags.theme, Some(ThemeMode::Dark));
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--debounce-ms", "soon", "--renderer", "gpu"]));
        assert_eq!(flags.debounce_ms, None);
        assert_eq!(flags.renderer, None);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert!(settings.watch);
        assert_eq!(settings.debounce_ms, 120);
        assert_eq!(settings.renderer, RendererMode::Native);
        assert_eq!(settings.theme, ThemeMode::Auto);
    }

    #[test]
    fn test_settings_from_merged_flags() {
        let file = ConfigFlags {
            debounce_ms: Some(300),
            renderer: Some(RendererMode::Process),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_watch: true,
            debounce_ms: Some(50),
            ..ConfigFlags::default()
        };
        let settings = Settings::from_flags(&file.union(&cli));
        assert!(!settings.watch);
        assert_eq!(settings.debounce_ms, 50);
        assert_eq!(settings.renderer, RendererMode::Process);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            no_watch: true,
            perf: true,
            debounce_ms: Some(80),
            renderer: Some(RendererMode::Process),
            converter: Some(PathBuf::from("conv")),
            theme: Some(ThemeMode::Light),
            render_debug_log: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }

    #[test]
    fn test_layered_local_overrides_global() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("config");
        let local = dir.path().join(".mdviewrc");
        std::fs::write(&global, "--theme light\n--perf\n").unwrap();
        std::fs::write(&local, "--theme dark\n").unwrap();

        let merged = load_layered(&global, &local).unwrap();
        assert_eq!(merged.theme, Some(ThemeMode::Dark));
        assert!(merged.perf);
    }
}
