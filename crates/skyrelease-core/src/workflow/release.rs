//! Release pipeline orchestration

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::artifacts::{ArtifactCatalog, BuildConfiguration};
use crate::config::Config;
use crate::confirm::{AnswerSource, ConfirmationGate, DESTRUCTIVE_PROMPT};
use crate::error::{Result, WorkflowError};
use crate::runner::CommandRunner;
use crate::types::{ReleaseReport, ReleaseState, Stage};

/// Options for a release run
#[derive(Debug, Clone, Copy)]
pub struct ReleaseOptions {
    /// Stage to run
    pub stage: Stage,
    /// Record commands instead of running them
    pub dry_run: bool,
    /// Run the publish steps
    pub publish: bool,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            stage: Stage::One,
            dry_run: false,
            publish: true,
        }
    }
}

impl ReleaseOptions {
    /// Create options for a dry run
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    /// Set the stage
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Set whether to publish
    pub fn with_publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }
}

/// Reads the revision the checkout is at
pub trait RevisionSource {
    /// Full commit hash of HEAD in the repository at `root`
    fn head_revision(&self, root: &Path) -> Result<String>;
}

/// Paths the release touches, all absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    /// Checkout root
    pub root: PathBuf,
    /// Package publish tool
    pub pub_path: PathBuf,
    /// Android dist directory
    pub android_dist_root: PathBuf,
    /// Linux dist directory
    pub linux_dist_root: PathBuf,
    /// Framework package published in stage two
    pub sky_package_root: PathBuf,
    /// Engine package published in stage one
    pub sky_engine_package_root: PathBuf,
    /// Services package published in stage one
    pub sky_services_package_root: PathBuf,
    /// Marker file the commit hash is written to
    pub revision_file: PathBuf,
}

impl ReleaseLayout {
    /// Derive every path from the checkout root
    pub fn new(root: &Path, config: &Config) -> Self {
        let android_dist_root = root.join(BuildConfiguration::AndroidArm.dist_dir());
        let sky_engine_package_root = android_dist_root.join("packages/sky_engine/sky_engine");

        Self {
            root: root.to_path_buf(),
            pub_path: root.join(&config.publish.pub_path),
            linux_dist_root: root.join(BuildConfiguration::LinuxX64.dist_dir()),
            sky_package_root: root.join("sky/packages/sky"),
            sky_services_package_root: android_dist_root.join("packages/sky_services/sky_services"),
            revision_file: sky_engine_package_root.join("lib").join("REVISION"),
            sky_engine_package_root,
            android_dist_root,
        }
    }

    /// Dist directory for a configuration
    pub fn dist_root(&self, config: BuildConfiguration) -> &Path {
        match config {
            BuildConfiguration::AndroidArm => &self.android_dist_root,
            BuildConfiguration::LinuxX64 => &self.linux_dist_root,
        }
    }
}

/// The staged, fail-fast release sequence
pub struct ReleasePipeline<'a, S, R> {
    config: &'a Config,
    options: ReleaseOptions,
    layout: ReleaseLayout,
    runner: CommandRunner,
    gate: ConfirmationGate<S>,
    catalog: ArtifactCatalog,
    revisions: R,
    states: Vec<ReleaseState>,
    commit_hash: Option<String>,
}

impl<'a, S: AnswerSource, R: RevisionSource> ReleasePipeline<'a, S, R> {
    /// Create a pipeline over the checkout at `root`
    pub fn new(
        config: &'a Config,
        root: &Path,
        options: ReleaseOptions,
        gate: ConfirmationGate<S>,
        revisions: R,
    ) -> Self {
        Self {
            config,
            options,
            layout: ReleaseLayout::new(root, config),
            runner: CommandRunner::new(options.dry_run),
            gate,
            catalog: ArtifactCatalog::new(config.storage.clone()),
            revisions,
            states: vec![ReleaseState::Init],
            commit_hash: None,
        }
    }

    /// Replace the command runner, e.g. to silence its console output
    pub fn with_runner(mut self, runner: CommandRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Paths this pipeline operates on
    pub fn layout(&self) -> &ReleaseLayout {
        &self.layout
    }

    /// Run the selected stage to completion or the first failure
    #[instrument(skip(self), fields(root = %self.layout.root.display(), stage = %self.options.stage, dry_run = self.options.dry_run, publish = self.options.publish))]
    pub fn execute(mut self) -> Result<ReleaseReport> {
        info!("executing release pipeline");

        self.confirm()?;
        self.check_tools()?;
        self.fetch_upstream()?;
        self.reset_to_upstream()?;

        match self.options.stage {
            Stage::One => self.stage_one()?,
            Stage::Two => self.stage_two()?,
        }

        let report = ReleaseReport {
            stage: self.options.stage,
            dry_run: self.options.dry_run,
            publish: self.options.publish,
            commit_hash: self.commit_hash,
            states: self.states,
            commands: self.runner.into_history(),
        };
        info!(final_state = %report.final_state(), commands = report.commands.len(), "release pipeline complete");
        Ok(report)
    }

    fn advance(&mut self, state: ReleaseState) {
        debug!(state = %state, "release state reached");
        self.states.push(state);
    }

    fn confirm(&mut self) -> Result<()> {
        if !self.options.dry_run && !self.gate.confirm(DESTRUCTIVE_PROMPT) {
            warn!("release declined");
            return Err(WorkflowError::Declined.into());
        }
        self.advance(ReleaseState::Confirmed);
        Ok(())
    }

    /// Refuse to start destructive work when a PATH tool the stage needs is missing
    fn check_tools(&self) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }

        let mut tools = vec!["git"];
        if self.options.stage == Stage::One {
            if let Some(sync) = self.config.sync.command.first() {
                tools.push(sync.as_str());
            }
            tools.extend(["ninja", "gsutil"]);
        }

        for tool in tools {
            if !self.runner.is_available(tool) {
                return Err(WorkflowError::ToolMissing(tool.to_string()).into());
            }
        }
        Ok(())
    }

    fn fetch_upstream(&mut self) -> Result<()> {
        let root = self.layout.root.clone();
        self.runner
            .run(&root, ["git", "fetch", self.config.git.remote.as_str()])
    }

    /// Hard-reset the checkout to upstream, discarding local changes
    fn reset_to_upstream(&mut self) -> Result<()> {
        let root = self.layout.root.clone();
        let upstream = self.config.git.upstream_ref();
        self.runner
            .run(&root, ["git", "reset", upstream.as_str(), "--hard"])?;
        self.advance(ReleaseState::UpstreamReset);
        Ok(())
    }

    fn stage_one(&mut self) -> Result<()> {
        let root = self.layout.root.clone();

        self.runner.run(&root, self.config.sync.command.clone())?;
        let commit_hash = self.revisions.head_revision(&root)?;
        info!(commit_hash = %commit_hash, "captured release revision");
        self.commit_hash = Some(commit_hash.clone());
        self.advance(ReleaseState::SourceSynced);

        for config in BuildConfiguration::ALL {
            for command in config.build_commands() {
                self.runner.run(&root, command)?;
            }
            self.advance(ReleaseState::Built(config));
        }

        self.stamp_revision(&commit_hash)?;

        for config in BuildConfiguration::ALL {
            let dist_root = self.layout.dist_root(config).to_path_buf();
            let uploaded =
                self.catalog
                    .upload_all(&mut self.runner, &dist_root, config, &commit_hash)?;
            debug!(config = %config, uploaded, "artifact batch uploaded");
            self.advance(ReleaseState::Uploaded(config));
        }

        if self.options.publish {
            let engine = self.layout.sky_engine_package_root.clone();
            let services = self.layout.sky_services_package_root.clone();
            self.publish_package(&engine)?;
            self.publish_package(&services)?;
            self.advance(ReleaseState::Published);
        }

        Ok(())
    }

    fn stage_two(&mut self) -> Result<()> {
        if self.options.publish {
            let package = self.layout.sky_package_root.clone();
            self.publish_package(&package)?;
            self.advance(ReleaseState::Published);
        }
        Ok(())
    }

    fn stamp_revision(&mut self, commit_hash: &str) -> Result<()> {
        let path = &self.layout.revision_file;
        if self.options.dry_run {
            info!(path = %path.display(), "dry run, not writing revision marker");
            if !self.runner.is_quiet() {
                println!("WRITING: {} TO: {}", commit_hash, path.display());
            }
        } else {
            info!(path = %path.display(), "writing revision marker");
            std::fs::write(path, commit_hash)?;
        }
        self.advance(ReleaseState::RevisionStamped);
        Ok(())
    }

    fn publish_package(&mut self, package_root: &Path) -> Result<()> {
        info!(package = %package_root.display(), "publishing package");
        let pub_path = self.layout.pub_path.to_string_lossy().into_owned();
        self.runner
            .run(package_root, [pub_path.as_str(), "publish", "--force"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::ReaderPrompt;
    use crate::error::{CommandError, SkyReleaseError};
    use crate::runner::{Executor, Invocation};
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use std::rc::Rc;
    use tempfile::TempDir;

    type TestGate = ConfirmationGate<ReaderPrompt<Cursor<Vec<u8>>, Vec<u8>>>;

    fn gate(dry_run: bool, answer: &str) -> TestGate {
        ConfirmationGate::new(
            dry_run,
            ReaderPrompt::new(Cursor::new(answer.as_bytes().to_vec()), Vec::new()),
        )
    }

    #[derive(Default)]
    struct FixedRevision {
        calls: Cell<usize>,
    }

    impl RevisionSource for &FixedRevision {
        fn head_revision(&self, _root: &Path) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok("abc123".to_string())
        }
    }

    fn run_dry(options: ReleaseOptions, revisions: &FixedRevision) -> ReleaseReport {
        let config = Config::default();
        ReleasePipeline::new(&config, Path::new("/src"), options, gate(true, ""), revisions)
            .with_runner(CommandRunner::new(true).quiet(true))
            .execute()
            .unwrap()
    }

    /// Records every executed command and fails the ones matching `fail_when`
    struct ScriptedExecutor {
        seen: Rc<RefCell<Vec<Invocation>>>,
        fail_when: fn(&Invocation) -> bool,
        missing: &'static [&'static str],
    }

    impl Executor for ScriptedExecutor {
        fn is_available(&self, program: &str) -> bool {
            !self.missing.iter().any(|m| *m == program)
        }

        fn execute(&mut self, invocation: &Invocation) -> Result<()> {
            self.seen.borrow_mut().push(invocation.clone());
            if (self.fail_when)(invocation) {
                return Err(CommandError::Failed {
                    command: invocation.command_line(),
                    cwd: invocation.cwd.clone(),
                    status: "exit status: 1".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    /// Checkout root with the directory the revision marker is written into
    fn release_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        let layout = ReleaseLayout::new(temp.path(), &Config::default());
        std::fs::create_dir_all(layout.revision_file.parent().unwrap()).unwrap();
        temp
    }

    fn run_scripted(
        root: &Path,
        options: ReleaseOptions,
        fail_when: fn(&Invocation) -> bool,
        missing: &'static [&'static str],
        revisions: &FixedRevision,
    ) -> (Result<ReleaseReport>, Vec<Invocation>) {
        let config = Config::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let runner = CommandRunner::new(false)
            .quiet(true)
            .with_executor(ScriptedExecutor {
                seen: Rc::clone(&seen),
                fail_when,
                missing,
            });

        let result = ReleasePipeline::new(&config, root, options, gate(false, "y\n"), revisions)
            .with_runner(runner)
            .execute();
        let seen = seen.borrow().clone();
        (result, seen)
    }

    fn command_lines(report: &ReleaseReport) -> Vec<String> {
        report.commands.iter().map(|c| c.command_line()).collect()
    }

    #[test]
    fn test_layout_paths() {
        let layout = ReleaseLayout::new(Path::new("/src"), &Config::default());
        assert_eq!(
            layout.pub_path,
            PathBuf::from("/src/third_party/dart-sdk/dart-sdk/bin/pub")
        );
        assert_eq!(layout.android_dist_root, PathBuf::from("/src/out/android_Release/dist"));
        assert_eq!(layout.linux_dist_root, PathBuf::from("/src/out/Release/dist"));
        assert_eq!(
            layout.revision_file,
            PathBuf::from("/src/out/android_Release/dist/packages/sky_engine/sky_engine/lib/REVISION")
        );
        assert_eq!(
            layout.sky_services_package_root,
            PathBuf::from("/src/out/android_Release/dist/packages/sky_services/sky_services")
        );
    }

    #[test]
    fn test_stage_one_dry_run_order() {
        let revisions = FixedRevision::default();
        let report = run_dry(ReleaseOptions::dry_run(), &revisions);
        let pub_path = "/src/third_party/dart-sdk/dart-sdk/bin/pub";

        let mut expected = vec![
            "git fetch upstream".to_string(),
            "git reset upstream/master --hard".to_string(),
            "gclient sync".to_string(),
            "sky/tools/gn --android --release".to_string(),
            "ninja -C out/android_Release :dist".to_string(),
            "sky/tools/gn --release".to_string(),
            "ninja -C out/Release :dist".to_string(),
        ];
        for (category, name) in [
            ("shell", "SkyShell.apk"),
            ("viewer", "sky_viewer.mojo"),
            ("viewer", "libsky_viewer_library.so"),
        ] {
            expected.push(format!(
                "gsutil cp -z mojo,dat {category}/{name} gs://mojo/sky/{category}/android-arm/abc123/{name}"
            ));
        }
        for (category, name) in [
            ("shell", "icudtl.dat"),
            ("shell", "sky_shell"),
            ("shell", "sky_snapshot"),
            ("viewer", "sky_viewer.mojo"),
            ("viewer", "libsky_viewer_library.so"),
        ] {
            expected.push(format!(
                "gsutil cp -z mojo,dat {category}/{name} gs://mojo/sky/{category}/linux-x64/abc123/{name}"
            ));
        }
        expected.push(format!("{} publish --force", pub_path));
        expected.push(format!("{} publish --force", pub_path));

        assert_eq!(command_lines(&report), expected);
        assert_eq!(
            report.commands[expected.len() - 2].cwd,
            PathBuf::from("/src/out/android_Release/dist/packages/sky_engine/sky_engine")
        );
        assert_eq!(
            report.commands[expected.len() - 1].cwd,
            PathBuf::from("/src/out/android_Release/dist/packages/sky_services/sky_services")
        );
        assert_eq!(report.commit_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_stage_one_states() {
        let revisions = FixedRevision::default();
        let report = run_dry(ReleaseOptions::dry_run(), &revisions);

        assert_eq!(
            report.states,
            vec![
                ReleaseState::Init,
                ReleaseState::Confirmed,
                ReleaseState::UpstreamReset,
                ReleaseState::SourceSynced,
                ReleaseState::Built(BuildConfiguration::AndroidArm),
                ReleaseState::Built(BuildConfiguration::LinuxX64),
                ReleaseState::RevisionStamped,
                ReleaseState::Uploaded(BuildConfiguration::AndroidArm),
                ReleaseState::Uploaded(BuildConfiguration::LinuxX64),
                ReleaseState::Published,
            ]
        );
    }

    #[test]
    fn test_commit_hash_captured_once() {
        let revisions = FixedRevision::default();
        let report = run_dry(ReleaseOptions::dry_run(), &revisions);

        assert_eq!(revisions.calls.get(), 1);
        let uploads: Vec<_> = report
            .commands
            .iter()
            .filter(|c| c.program == "gsutil")
            .collect();
        assert_eq!(uploads.len(), 8);
        assert!(uploads.iter().all(|c| c.args[4].contains("/abc123/")));
    }

    #[test]
    fn test_stage_one_without_publish() {
        let revisions = FixedRevision::default();
        let report = run_dry(ReleaseOptions::dry_run().with_publish(false), &revisions);

        assert!(report.commands.iter().all(|c| !c.args.contains(&"publish".to_string())));
        assert_eq!(
            report.final_state(),
            ReleaseState::Uploaded(BuildConfiguration::LinuxX64)
        );
    }

    #[test]
    fn test_stage_two_publishes_framework_only() {
        let revisions = FixedRevision::default();
        let report = run_dry(ReleaseOptions::dry_run().with_stage(Stage::Two), &revisions);

        assert_eq!(
            command_lines(&report),
            vec![
                "git fetch upstream",
                "git reset upstream/master --hard",
                "/src/third_party/dart-sdk/dart-sdk/bin/pub publish --force",
            ]
        );
        assert_eq!(report.commands[2].cwd, PathBuf::from("/src/sky/packages/sky"));
        assert_eq!(revisions.calls.get(), 0);
        assert!(report.commit_hash.is_none());
        assert_eq!(report.final_state(), ReleaseState::Published);
    }

    #[test]
    fn test_stage_two_without_publish_does_nothing_after_reset() {
        let revisions = FixedRevision::default();
        let report = run_dry(
            ReleaseOptions::dry_run()
                .with_stage(Stage::Two)
                .with_publish(false),
            &revisions,
        );

        assert_eq!(report.commands.len(), 2);
        assert_eq!(report.final_state(), ReleaseState::UpstreamReset);
    }

    #[test]
    fn test_dry_run_does_not_write_revision_marker() {
        let temp = tempfile::TempDir::new().unwrap();
        let revisions = FixedRevision::default();
        let config = Config::default();
        let pipeline = ReleasePipeline::new(
            &config,
            temp.path(),
            ReleaseOptions::dry_run(),
            gate(true, ""),
            &revisions,
        )
        .with_runner(CommandRunner::new(true).quiet(true));
        let revision_file = pipeline.layout().revision_file.clone();

        pipeline.execute().unwrap();

        assert!(!revision_file.exists());
    }

    #[test]
    fn test_declined_confirmation_runs_nothing() {
        let revisions = FixedRevision::default();
        let config = Config::default();
        let options = ReleaseOptions::default();

        let err = ReleasePipeline::new(&config, Path::new("/src"), options, gate(false, "n\n"), &revisions)
            .with_runner(CommandRunner::new(false).quiet(true))
            .execute()
            .unwrap_err();

        assert!(err.is_declined());
        assert_eq!(revisions.calls.get(), 0);
    }

    #[test]
    fn test_unparseable_confirmation_declines() {
        let revisions = FixedRevision::default();
        let config = Config::default();

        let err = ReleasePipeline::new(
            &config,
            Path::new("/src"),
            ReleaseOptions::default().with_stage(Stage::Two),
            gate(false, "maybe\n"),
            &revisions,
        )
        .execute()
        .unwrap_err();

        assert!(matches!(
            err,
            SkyReleaseError::Workflow(WorkflowError::Declined)
        ));
    }

    #[test]
    fn test_failing_fetch_halts_pipeline() {
        let temp = tempfile::TempDir::new().unwrap();
        let revisions = FixedRevision::default();
        let mut config = Config::default();
        config.git.remote = "no-such-remote-for-skyrelease-tests".to_string();

        let result = ReleasePipeline::new(
            &config,
            temp.path(),
            ReleaseOptions::default().with_stage(Stage::Two),
            gate(false, "yes\n"),
            &revisions,
        )
        .with_runner(CommandRunner::new(false).quiet(true))
        .execute();

        // Either git is missing entirely or the fetch outside a repository fails.
        assert!(result.is_err());
        assert!(!result.unwrap_err().is_declined());
    }

    #[test]
    fn test_stage_one_executes_everything_and_stamps_revision() {
        let root = release_root();
        let revisions = FixedRevision::default();

        let (result, seen) = run_scripted(root.path(), ReleaseOptions::default(), |_| false, &[], &revisions);

        let report = result.unwrap();
        assert!(!report.dry_run);
        assert_eq!(seen.len(), report.commands.len());
        assert_eq!(seen.len(), 17);
        assert_eq!(report.final_state(), ReleaseState::Published);

        let layout = ReleaseLayout::new(root.path(), &Config::default());
        assert_eq!(std::fs::read_to_string(layout.revision_file).unwrap(), "abc123");
    }

    #[test]
    fn test_build_failure_skips_stamp_and_uploads() {
        let root = release_root();
        let revisions = FixedRevision::default();

        let (result, seen) = run_scripted(
            root.path(),
            ReleaseOptions::default(),
            |inv| inv.program == "ninja" && inv.args.contains(&"out/android_Release".to_string()),
            &[],
            &revisions,
        );

        assert!(matches!(
            result.unwrap_err(),
            SkyReleaseError::Command(CommandError::Failed { .. })
        ));
        let lines: Vec<_> = seen.iter().map(|i| i.command_line()).collect();
        assert_eq!(
            lines,
            vec![
                "git fetch upstream",
                "git reset upstream/master --hard",
                "gclient sync",
                "sky/tools/gn --android --release",
                "ninja -C out/android_Release :dist",
            ]
        );
        assert_eq!(revisions.calls.get(), 1);

        let layout = ReleaseLayout::new(root.path(), &Config::default());
        assert!(!layout.revision_file.exists());
    }

    #[test]
    fn test_upload_failure_stops_remaining_uploads() {
        let root = release_root();
        let revisions = FixedRevision::default();

        let (result, seen) = run_scripted(
            root.path(),
            ReleaseOptions::default(),
            |inv| inv.program == "gsutil" && inv.args.iter().any(|a| a.ends_with("sky_viewer.mojo")),
            &[],
            &revisions,
        );

        assert!(result.is_err());
        let uploads: Vec<_> = seen.iter().filter(|i| i.program == "gsutil").collect();
        assert_eq!(uploads.len(), 2);
        assert_eq!(seen.last().unwrap().args[3], "viewer/sky_viewer.mojo");
        assert!(seen.iter().all(|i| !i.args.contains(&"publish".to_string())));
    }

    #[test]
    fn test_first_publish_failure_skips_second_publish() {
        let root = release_root();
        let revisions = FixedRevision::default();

        let (result, seen) = run_scripted(
            root.path(),
            ReleaseOptions::default(),
            |inv| inv.args.first().map(String::as_str) == Some("publish") && inv.cwd.ends_with("sky_engine"),
            &[],
            &revisions,
        );

        assert!(result.is_err());
        let publishes: Vec<_> = seen
            .iter()
            .filter(|i| i.args.first().map(String::as_str) == Some("publish"))
            .collect();
        assert_eq!(publishes.len(), 1);
        assert!(publishes[0].cwd.ends_with("packages/sky_engine/sky_engine"));
        assert_eq!(seen.last().unwrap(), publishes[0]);
    }

    #[test]
    fn test_missing_tool_stops_before_reset() {
        let root = release_root();
        let revisions = FixedRevision::default();

        let (result, seen) = run_scripted(root.path(), ReleaseOptions::default(), |_| false, &["gsutil"], &revisions);

        assert!(matches!(
            result.unwrap_err(),
            SkyReleaseError::Workflow(WorkflowError::ToolMissing(tool)) if tool == "gsutil"
        ));
        assert!(seen.is_empty());
    }

    #[test]
    fn test_stage_two_does_not_need_build_tools() {
        let root = release_root();
        let revisions = FixedRevision::default();

        let (result, seen) = run_scripted(
            root.path(),
            ReleaseOptions::default().with_stage(Stage::Two),
            |_| false,
            &["gclient", "ninja", "gsutil"],
            &revisions,
        );

        assert_eq!(result.unwrap().final_state(), ReleaseState::Published);
        assert_eq!(seen.len(), 3);
    }
}
