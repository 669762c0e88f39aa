//! Compiler and demangler invocation.
//!
//! The walker and pipeline only see the `Driver` trait, so tests can swap
//! in a deterministic fake and never spawn a process. `ClangDriver` is the
//! real thing: one `clang` run per refresh, one `llvm-cxxfilt` run per
//! method. Neither retries nor times out; a hung tool is the caller's
//! problem.

use crate::config::ClassViewConfig;
use crate::error::{ModelError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Flags that turn a normal compile into a JSON AST dump.
pub const AST_DUMP_ARGS: [&str; 3] = ["-fsyntax-only", "-Xclang", "-ast-dump=json"];

/// External tools the model builder depends on.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Runs the compiler and returns its full stdout, or `None` if it
    /// exited non-zero.
    async fn compile(&self, args: &[String]) -> Option<String>;

    /// Demangles a linker symbol. `None` if there is no symbol, the tool
    /// fails, or the symbol comes back unchanged.
    async fn demangle(&self, mangled: Option<&str>) -> Option<String>;
}

/// Drives a local LLVM installation.
#[derive(Debug, Clone)]
pub struct ClangDriver {
    clang: PathBuf,
    demangler: PathBuf,
}

impl ClangDriver {
    /// Creates a driver, checking that both executables exist.
    pub fn new(clang: impl Into<PathBuf>, demangler: impl Into<PathBuf>) -> Result<Self> {
        let clang = clang.into();
        let demangler = demangler.into();
        for tool in [&clang, &demangler] {
            if !tool.exists() {
                return Err(ModelError::ToolNotFound(tool.clone()));
            }
        }
        Ok(Self { clang, demangler })
    }

    /// Uses `clang` and `llvm-cxxfilt` from one LLVM `bin` directory.
    pub fn from_bin_dir(dir: &Path) -> Result<Self> {
        let ext = std::env::consts::EXE_SUFFIX;
        Self::new(
            dir.join(format!("clang{ext}")),
            dir.join(format!("llvm-cxxfilt{ext}")),
        )
    }

    pub fn from_config(config: &ClassViewConfig, clang_override: Option<&Path>) -> Result<Self> {
        let clang = config.resolve_clang(clang_override);
        let demangler = config.resolve_demangler(&clang);
        Self::new(clang, demangler)
    }

    /// The caller's arguments followed by the AST dump flags.
    pub fn ast_dump_args(args: &[String]) -> Vec<String> {
        args.iter()
            .cloned()
            .chain(AST_DUMP_ARGS.iter().map(|s| s.to_string()))
            .collect()
    }
}

#[async_trait]
impl Driver for ClangDriver {
    async fn compile(&self, args: &[String]) -> Option<String> {
        let args = Self::ast_dump_args(args);
        info!("Running {} {}", self.clang.display(), args.join(" "));

        let output = match Command::new(&self.clang)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.clang.display(), e);
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "clang exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        debug!("clang produced {} bytes", output.stdout.len());
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn demangle(&self, mangled: Option<&str>) -> Option<String> {
        let mangled = mangled?;
        let output = match Command::new(&self.demangler)
            .arg(mangled)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.demangler.display(), e);
                return None;
            }
        };

        if !output.status.success() {
            debug!("Demangling {} failed with {}", mangled, output.status);
            return None;
        }

        // llvm-cxxfilt echoes symbols it cannot demangle and still exits 0.
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() || text == mangled.trim() {
            debug!("{} did not demangle", mangled);
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_missing_tools_are_reported() {
        let dir = tempdir().unwrap();
        let err = ClangDriver::from_bin_dir(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolNotFound);
        assert!(err.to_string().contains("clang"));
    }

    #[test]
    fn test_missing_demangler_is_reported() {
        let dir = tempdir().unwrap();
        let clang = dir.path().join(format!("clang{}", std::env::consts::EXE_SUFFIX));
        std::fs::write(&clang, "").unwrap();

        match ClangDriver::from_bin_dir(dir.path()) {
            Err(ModelError::ToolNotFound(path)) => {
                assert!(path.to_string_lossy().contains("llvm-cxxfilt"))
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_ast_dump_args_are_appended() {
        let args = ClangDriver::ast_dump_args(&["-std=c++17".into(), "main.cpp".into()]);
        assert_eq!(
            args,
            vec!["-std=c++17", "main.cpp", "-fsyntax-only", "-Xclang", "-ast-dump=json"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_outcomes() {
        // `echo` behaves like llvm-cxxfilt on a symbol it cannot demangle,
        // `false` like a failing compiler.
        let (echo, fail) = (Path::new("/bin/echo"), Path::new("/bin/false"));
        if !echo.exists() || !fail.exists() {
            return;
        }

        let driver = ClangDriver::new(fail, echo).unwrap();
        assert_eq!(driver.compile(&["main.cpp".into()]).await, None);
        assert_eq!(driver.demangle(None).await, None);
        assert_eq!(driver.demangle(Some("_Zgarbage")).await, None);
        assert_eq!(driver.demangle(Some("  _Zgarbage ")).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_demangler() {
        let Some(demangler) = ["/usr/bin/llvm-cxxfilt", "/usr/bin/c++filt"]
            .into_iter()
            .map(Path::new)
            .find(|p| p.exists())
        else {
            return;
        };

        let driver = ClangDriver::new(demangler, demangler).unwrap();
        assert_eq!(
            driver.demangle(Some("_ZN3Foo3barEv")).await.as_deref(),
            Some("Foo::bar()")
        );
        assert_eq!(driver.demangle(Some("_Zgarbage")).await, None);
    }
}
