use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{RenderRequest, Renderer};
use crate::error::{Error, Result};

/// Renders by running an external converter.
///
/// The converter follows the `mdview render` contract: HTML on stdout and
/// exit status 0 on success, diagnostics on stderr otherwise. Only the
/// success/failure of the exit status is surfaced.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    program: PathBuf,
    base_args: Vec<String>,
}

impl ProcessRenderer {
    pub fn new(program: impl Into<PathBuf>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }

    /// Use this executable's own `render` subcommand as the converter.
    ///
    /// # Errors
    /// Returns an error if the current executable path is unavailable.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, vec!["render".to_string()]))
    }

    fn args_for(request: &RenderRequest) -> Vec<String> {
        match request {
            RenderRequest::File(path) => vec![path.display().to_string()],
            RenderRequest::Markdown(_) => vec!["--stdin".to_string()],
            RenderRequest::Text(_) => vec!["--text".to_string(), "--stdin".to_string()],
            RenderRequest::Code { source_path, .. } => {
                let mut args = vec!["--code".to_string(), "--stdin".to_string()];
                if let Some(path) = source_path {
                    args.push("--path".to_string());
                    args.push(path.display().to_string());
                }
                args
            }
            RenderRequest::Html(_) => Vec::new(),
        }
    }

    fn failure_message(request: &RenderRequest) -> &'static str {
        match request {
            RenderRequest::Code { .. } => "Code render failed.",
            _ => "Markdown render failed.",
        }
    }

    fn run(&self, request: &RenderRequest, stdin: Option<&str>) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.base_args)
            .args(Self::args_for(request))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                Error::Render(format!(
                    "Failed to start converter {}: {err}",
                    self.program.display()
                ))
            })?;

        // Feed stdin from a separate thread so a chatty converter cannot
        // fill its stdout pipe while we are still writing.
        let writer = match (stdin, child.stdin.take()) {
            (Some(content), Some(mut pipe)) => {
                let content = content.to_string();
                Some(std::thread::spawn(move || pipe.write_all(content.as_bytes())))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .map_err(|err| Error::Render(format!("Converter did not finish: {err}")))?;
        if let Some(writer) = writer
            && let Ok(Err(err)) = writer.join()
        {
            tracing::debug!(%err, "converter closed stdin early");
        }

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::warn!(status = ?output.status.code(), kind = request.kind(), "converter failed");
        Err(Error::Render(if stderr.is_empty() {
            Self::failure_message(request).to_string()
        } else {
            stderr
        }))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Renderer for ProcessRenderer {
    fn render(&self, request: &RenderRequest) -> Result<String> {
        match request {
            RenderRequest::Html(content) => Ok(content.clone()),
            RenderRequest::File(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFound(path.clone()));
                }
                self.run(request, None)
            }
            RenderRequest::Markdown(content)
            | RenderRequest::Text(content)
            | RenderRequest::Code { content, .. } => self.run(request, Some(content)),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> ProcessRenderer {
        ProcessRenderer::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "converter".to_string()],
        )
    }

    #[test]
    fn test_stdout_is_returned_on_success() {
        let renderer = shell("cat");
        let html = renderer
            .render(&RenderRequest::Markdown("# piped".to_string()))
            .unwrap();
        assert_eq!(html, "# piped");
    }

    #[test]
    fn test_code_request_passes_flags_and_path() {
        let renderer = shell("echo \"$@\"");
        let out = renderer
            .render(&RenderRequest::Code {
                content: "x = 1".to_string(),
                source_path: Some(PathBuf::from("/src/a.py")),
            })
            .unwrap();
        assert_eq!(out.trim(), "--code --stdin --path /src/a.py");
    }

    #[test]
    fn test_stderr_becomes_render_error() {
        let renderer = shell("cat >/dev/null; echo 'parse error at 3' >&2; exit 2");
        let err = renderer
            .render(&RenderRequest::Markdown("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Render(ref msg) if msg == "parse error at 3"));
    }

    #[test]
    fn test_silent_failure_uses_default_message() {
        let renderer = shell("exit 1");
        let err = renderer
            .render(&RenderRequest::Code {
                content: String::new(),
                source_path: None,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Code render failed.");
    }

    #[test]
    fn test_missing_program_is_render_error() {
        let renderer = ProcessRenderer::new("/definitely/not/a/converter", Vec::new());
        let err = renderer
            .render(&RenderRequest::Markdown("x".to_string()))
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to start converter"));
    }

    #[test]
    fn test_html_never_spawns() {
        let renderer = ProcessRenderer::new("/definitely/not/a/converter", Vec::new());
        let out = renderer
            .render(&RenderRequest::Html("<p>x</p>".to_string()))
            .unwrap();
        assert_eq!(out, "<p>x</p>");
    }
}
