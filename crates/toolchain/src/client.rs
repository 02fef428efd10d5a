//! Running an installed Node.js.

use crate::error::{Error, Result};
use crate::platform::PlatformFamily;
use crate::process::{ExecutionContext, ProcessRunner};
use crate::version::Version;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An installed Node.js, usable as a [`ProcessRunner`].
///
/// Every command run through a `Client` is prefixed with the absolute path
/// of the installed `node` executable, so `["--version"]` runs
/// `<root>/bin/node --version`. Use [`Client::npm`] and [`Client::npx`] for
/// the bundled package manager.
#[derive(Clone)]
pub struct Client {
    root: PathBuf,
    node: PathBuf,
    npm_cli: PathBuf,
    npx_cli: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl Client {
    /// Describe the installation at `root`, laid out for `family`.
    ///
    /// Nothing is checked on disk.
    pub fn new(
        family: PlatformFamily,
        root: impl Into<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let root = root.into();
        let npm_bin = family.npm_package_dir(&root).join("bin");

        Self {
            node: family.node_path(&root),
            npm_cli: npm_bin.join("npm-cli.js"),
            npx_cli: npm_bin.join("npx-cli.js"),
            root,
            runner,
        }
    }

    /// Installation directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `node` executable.
    #[must_use]
    pub fn node_path(&self) -> &Path {
        &self.node
    }

    /// npm's entry script.
    #[must_use]
    pub fn npm_cli_path(&self) -> &Path {
        &self.npm_cli
    }

    /// npx's entry script.
    #[must_use]
    pub fn npx_cli_path(&self) -> &Path {
        &self.npx_cli
    }

    /// Runner for the bundled npm.
    #[must_use]
    pub fn npm(&self) -> ScriptRunner {
        self.script("npm", &self.npm_cli)
    }

    /// Runner for the bundled npx.
    #[must_use]
    pub fn npx(&self) -> ScriptRunner {
        self.script("npx", &self.npx_cli)
    }

    /// Ask the installed `node` for its version.
    ///
    /// # Errors
    ///
    /// Returns the runner's error if `node` cannot be run, or
    /// `Error::InvalidVersionOutput` if it prints something unexpected.
    pub fn version(&self) -> Result<Version> {
        let output = self.run(&["--version".to_string()])?;
        Version::parse(&output)
            .ok_or_else(|| Error::InvalidVersionOutput(output.trim().to_string()))
    }

    fn script(&self, name: &'static str, script: &Path) -> ScriptRunner {
        ScriptRunner {
            name,
            node: self.node.clone(),
            script: script.to_path_buf(),
            runner: Arc::clone(&self.runner),
        }
    }
}

impl ProcessRunner for Client {
    fn run_with(&self, command: &[String], context: &ExecutionContext) -> Result<i32> {
        let mut full = Vec::with_capacity(command.len() + 1);
        full.push(path_arg(&self.node));
        full.extend_from_slice(command);
        self.runner.run_with(&full, context)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("root", &self.root)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// Runs a JavaScript entry point (npm, npx) with the installed `node`.
///
/// A command `["install"]` becomes `<node> <script> install`.
#[derive(Clone)]
pub struct ScriptRunner {
    name: &'static str,
    node: PathBuf,
    script: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl ScriptRunner {
    /// Tool name, `npm` or `npx`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The script passed to `node`.
    #[must_use]
    pub fn script_path(&self) -> &Path {
        &self.script
    }
}

impl ProcessRunner for ScriptRunner {
    fn run_with(&self, command: &[String], context: &ExecutionContext) -> Result<i32> {
        let mut full = Vec::with_capacity(command.len() + 2);
        full.push(path_arg(&self.node));
        full.push(path_arg(&self.script));
        full.extend_from_slice(command);
        self.runner.run_with(&full, context)
    }
}

impl fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRunner")
            .field("name", &self.name)
            .field("script", &self.script)
            .finish_non_exhaustive()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CaptureBuffer, MockRunner};

    fn client(runner: &MockRunner) -> Client {
        Client::new(
            PlatformFamily::Unix,
            "/cache/node-v14.2.0-linux-x64",
            Arc::new(runner.clone()),
        )
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_unix_paths() {
        let client = client(&MockRunner::new());
        let root = Path::new("/cache/node-v14.2.0-linux-x64");

        assert_eq!(client.root(), root);
        assert_eq!(client.node_path(), root.join("bin/node"));
        assert_eq!(
            client.npm_cli_path(),
            root.join("lib/node_modules/npm/bin/npm-cli.js")
        );
        assert_eq!(
            client.npx_cli_path(),
            root.join("lib/node_modules/npm/bin/npx-cli.js")
        );
    }

    #[test]
    fn test_windows_paths() {
        let client = Client::new(
            PlatformFamily::Windows,
            "/cache/node-v14.2.0-win-x64",
            Arc::new(MockRunner::new()),
        );
        let root = Path::new("/cache/node-v14.2.0-win-x64");

        assert_eq!(client.node_path(), root.join("node.exe"));
        assert_eq!(
            client.npm_cli_path(),
            root.join("node_modules/npm/bin/npm-cli.js")
        );
    }

    #[test]
    fn test_node_command_is_prefixed() {
        let runner = MockRunner::new();
        let client = client(&runner);

        client.run(&args(&["-e", "console.log(1)"])).unwrap();

        assert_eq!(
            runner.last_command().unwrap(),
            vec![
                path_arg(client.node_path()),
                "-e".to_string(),
                "console.log(1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_npm_runs_script_through_node() {
        let runner = MockRunner::new();
        let client = client(&runner);
        let npm = client.npm();

        npm.run(&args(&["install", "--no-audit"])).unwrap();

        assert_eq!(npm.name(), "npm");
        assert_eq!(
            runner.last_command().unwrap(),
            vec![
                path_arg(client.node_path()),
                path_arg(client.npm_cli_path()),
                "install".to_string(),
                "--no-audit".to_string(),
            ]
        );
    }

    #[test]
    fn test_npx_runs_script_through_node() {
        let runner = MockRunner::new();
        let client = client(&runner);

        client.npx().run(&args(&["cdk", "synth"])).unwrap();

        let command = runner.last_command().unwrap();
        assert_eq!(command[1], path_arg(client.npx_cli_path()));
        assert_eq!(&command[2..], ["cdk", "synth"]);
    }

    #[test]
    fn test_empty_arguments_run_bare_tool() {
        let runner = MockRunner::new();
        let client = client(&runner);

        client.npm().run(&[]).unwrap();

        assert_eq!(runner.last_command().unwrap().len(), 2);
    }

    #[test]
    fn test_context_is_passed_through() {
        let runner = MockRunner::new().with_output("done");
        let client = client(&runner);
        let buffer = CaptureBuffer::new();
        let context = ExecutionContext::new()
            .working_dir("/project")
            .env_var("CI", "true")
            .output(buffer.sink());

        let code = client.npm().run_with(&args(&["ci"]), &context).unwrap();

        assert_eq!(code, 0);
        assert_eq!(buffer.contents(), "done");
        let call = runner.calls().pop().unwrap();
        assert_eq!(call.working_dir, Some(PathBuf::from("/project")));
        assert_eq!(call.env.unwrap().get("CI").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_failure_propagates() {
        let runner = MockRunner::new().with_exit_code(3);
        let client = client(&runner);

        let err = client.npx().run(&args(&["cdk"])).unwrap_err();

        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn test_version() {
        let runner = MockRunner::new().with_output("v14.2.0\n");
        let client = client(&runner);

        assert_eq!(client.version().unwrap(), Version::new(14, 2, 0));
        assert_eq!(
            runner.last_command().unwrap()[1..],
            ["--version".to_string()]
        );
    }

    #[test]
    fn test_version_rejects_garbage() {
        let runner = MockRunner::new().with_output("Segmentation fault\n");
        let client = client(&runner);

        match client.version().unwrap_err() {
            Error::InvalidVersionOutput(output) => assert_eq!(output, "Segmentation fault"),
            other => panic!("Expected InvalidVersionOutput, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_omits_runner() {
        let client = client(&MockRunner::new());
        let rendered = format!("{client:?}");
        assert!(rendered.contains("node-v14.2.0-linux-x64"));
    }
}
