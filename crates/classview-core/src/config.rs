//! Project configuration.
//!
//! Lives in `.classview/config.json` under the project root. A missing
//! file means defaults; a malformed one is an error rather than a silent
//! fallback.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".classview";
pub const CONFIG_FILE: &str = "config.json";

/// Depth at which base resolution gives up and reports a cycle.
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassViewConfig {
    /// Path to the `clang` executable.
    pub clang_path: Option<PathBuf>,

    /// Path to the demangler. Defaults to `llvm-cxxfilt` next to clang.
    pub demangler_path: Option<PathBuf>,

    pub max_inheritance_depth: usize,

    /// Appended to every compiler invocation, after the caller's own
    /// arguments.
    pub extra_args: Vec<String>,
}

impl Default for ClassViewConfig {
    fn default() -> Self {
        Self {
            clang_path: None,
            demangler_path: None,
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
            extra_args: Vec::new(),
        }
    }
}

impl ClassViewConfig {
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads the config for `root`, or the defaults if there is none.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path_in(root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|e| ModelError::io(&path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ModelError::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if config.max_inheritance_depth == 0 {
            return Err(ModelError::Config {
                path,
                reason: "maxInheritanceDepth must be at least 1".into(),
            });
        }
        Ok(config)
    }

    /// Writes the config under `root`, creating the directory if needed.
    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).map_err(|e| ModelError::io(&dir, e))?;

        let path = dir.join(CONFIG_FILE);
        let text = serde_json::to_string_pretty(self).map_err(|e| ModelError::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, text).map_err(|e| ModelError::io(&path, e))?;
        Ok(path)
    }

    /// Picks the compiler: explicit override, then config, then the
    /// platform's usual install location.
    pub fn resolve_clang(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.clang_path.clone())
            .unwrap_or_else(default_clang_path)
    }

    /// The caller's compiler arguments followed by `extra_args`.
    pub fn compile_args(&self, args: &[String]) -> Vec<String> {
        args.iter().chain(&self.extra_args).cloned().collect()
    }

    pub fn resolve_demangler(&self, clang: &Path) -> PathBuf {
        if let Some(path) = &self.demangler_path {
            return path.clone();
        }
        let name = format!("llvm-cxxfilt{}", std::env::consts::EXE_SUFFIX);
        match clang.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

pub fn default_clang_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:/Program Files/LLVM/bin/clang.exe")
    } else {
        PathBuf::from("/usr/bin/clang")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_extra_args_follow_caller_args() {
        let config = ClassViewConfig {
            extra_args: vec!["-std=c++20".into(), "-DNDEBUG".into()],
            ..Default::default()
        };
        assert_eq!(
            config.compile_args(&["-Iinclude".into(), "main.cpp".into()]),
            vec!["-Iinclude", "main.cpp", "-std=c++20", "-DNDEBUG"]
        );
        assert_eq!(ClassViewConfig::default().compile_args(&["a.cpp".into()]), vec!["a.cpp"]);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = ClassViewConfig::load(dir.path()).unwrap();
        assert_eq!(config, ClassViewConfig::default());
        assert_eq!(config.max_inheritance_depth, DEFAULT_MAX_INHERITANCE_DEPTH);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let config = ClassViewConfig {
            clang_path: Some(PathBuf::from("/opt/llvm/bin/clang")),
            extra_args: vec!["-std=c++20".into()],
            max_inheritance_depth: 12,
            ..Default::default()
        };

        let path = config.save(dir.path()).unwrap();
        assert!(path.ends_with(".classview/config.json"));
        assert_eq!(ClassViewConfig::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            ClassViewConfig::path_in(dir.path()),
            r#"{ "extraArgs": ["-DNDEBUG"] }"#,
        )
        .unwrap();

        let config = ClassViewConfig::load(dir.path()).unwrap();
        assert_eq!(config.extra_args, vec!["-DNDEBUG".to_string()]);
        assert_eq!(config.max_inheritance_depth, DEFAULT_MAX_INHERITANCE_DEPTH);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(ClassViewConfig::path_in(dir.path()), "{ not json").unwrap();
        let err = ClassViewConfig::load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        fs::write(
            ClassViewConfig::path_in(dir.path()),
            r#"{ "maxInheritanceDepth": 0 }"#,
        )
        .unwrap();
        let err = ClassViewConfig::load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_tool_resolution_order() {
        let config = ClassViewConfig {
            clang_path: Some(PathBuf::from("/opt/llvm/bin/clang")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_clang(Some(Path::new("/custom/clang"))),
            PathBuf::from("/custom/clang")
        );
        let clang = config.resolve_clang(None);
        assert_eq!(clang, PathBuf::from("/opt/llvm/bin/clang"));
        assert_eq!(
            config.resolve_demangler(&clang),
            PathBuf::from(format!(
                "/opt/llvm/bin/llvm-cxxfilt{}",
                std::env::consts::EXE_SUFFIX
            ))
        );
        assert_eq!(
            ClassViewConfig::default().resolve_clang(None),
            default_clang_path()
        );
    }
}
