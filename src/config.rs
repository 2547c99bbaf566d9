use std::path::{Path, PathBuf};

use crate::pipeline::structuring::{Lexicon, LexiconError};

/// Application-level constants
pub const APP_NAME: &str = "rxscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming a lexicon JSON file.
pub const LEXICON_ENV_VAR: &str = "RXSCAN_LEXICON";

const LEXICON_FILE_NAME: &str = "lexicon.json";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "rxscan=debug,rxscan_lib=debug,warn"
    } else {
        "rxscan=info,rxscan_lib=info,warn"
    }
}

/// Per-user configuration directory, e.g. ~/.config/rxscan/ on Linux.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Where the lexicon comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexiconSource {
    Builtin,
    /// Named explicitly (flag or env var); must exist.
    Explicit(PathBuf),
    /// Found in the config directory.
    Discovered(PathBuf),
}

/// Priority:
/// 1. explicit path (`--lexicon`)
/// 2. `RXSCAN_LEXICON` env var
/// 3. `<config dir>/rxscan/lexicon.json` if present
/// 4. built-in tables
pub fn resolve_lexicon_source(explicit: Option<&Path>) -> LexiconSource {
    let from_env = std::env::var(LEXICON_ENV_VAR).ok();
    resolve_from(explicit, from_env.as_deref(), config_dir().as_deref())
}

fn resolve_from(
    explicit: Option<&Path>,
    from_env: Option<&str>,
    config_dir: Option<&Path>,
) -> LexiconSource {
    if let Some(path) = explicit {
        return LexiconSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = from_env.map(str::trim).filter(|p| !p.is_empty()) {
        return LexiconSource::Explicit(PathBuf::from(path));
    }
    match config_dir.map(|dir| dir.join(LEXICON_FILE_NAME)) {
        Some(path) if path.is_file() => LexiconSource::Discovered(path),
        _ => LexiconSource::Builtin,
    }
}

/// Load the lexicon the scanner should use, falling back to the built-in
/// tables when no file is configured.
pub fn load_lexicon(explicit: Option<&Path>) -> Result<Lexicon, LexiconError> {
    load_from_source(&resolve_lexicon_source(explicit))
}

pub fn load_from_source(source: &LexiconSource) -> Result<Lexicon, LexiconError> {
    let path = match source {
        LexiconSource::Builtin => {
            tracing::debug!("Using built-in lexicon");
            return Ok(Lexicon::builtin().clone());
        }
        LexiconSource::Explicit(path) | LexiconSource::Discovered(path) => path,
    };

    let lexicon = Lexicon::from_path(path).inspect_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Lexicon file rejected");
    })?;
    tracing::info!(
        path = %path.display(),
        medicines = lexicon.medicines().len(),
        "Loaded lexicon"
    );
    Ok(lexicon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn app_name_is_rxscan() {
        assert_eq!(APP_NAME, "rxscan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_filter_covers_both_crates() {
        let filter = default_log_filter();
        assert!(filter.contains("rxscan="));
        assert!(filter.contains("rxscan_lib="));
    }

    #[test]
    fn explicit_path_wins() {
        let source = resolve_from(Some(Path::new("/tmp/a.json")), Some("/tmp/b.json"), None);
        assert_eq!(source, LexiconSource::Explicit(PathBuf::from("/tmp/a.json")));
    }

    #[test]
    fn env_var_beats_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lexicon.json"), "{}").unwrap();
        let source = resolve_from(None, Some("/tmp/env.json"), Some(dir.path()));
        assert_eq!(source, LexiconSource::Explicit(PathBuf::from("/tmp/env.json")));
    }

    #[test]
    fn blank_env_var_is_ignored() {
        assert_eq!(resolve_from(None, Some("  "), None), LexiconSource::Builtin);
    }

    #[test]
    fn config_dir_file_is_discovered_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_from(None, None, Some(dir.path())), LexiconSource::Builtin);

        let path = dir.path().join("lexicon.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(
            resolve_from(None, None, Some(dir.path())),
            LexiconSource::Discovered(path)
        );
    }

    #[test]
    fn builtin_source_loads_builtin_tables() {
        let lexicon = load_from_source(&LexiconSource::Builtin).unwrap();
        assert_eq!(lexicon.medicines().len(), Lexicon::builtin().medicines().len());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_lexicon(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, LexiconError::Io(_)), "got {err:?}");
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"medicines": [{{"name_key": "zincovit", "form": "Oral Tablet", "icon": "pill", "category": "supplement"}}]}}"#
        )
        .unwrap();
        let lexicon = load_lexicon(Some(file.path())).unwrap();
        assert_eq!(lexicon.medicines().len(), 1);
        assert!(lexicon.lookup("Zincovit 1-0-1").is_some());
    }
}
