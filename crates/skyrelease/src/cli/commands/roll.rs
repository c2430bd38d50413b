//! Version roll command

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info, instrument};

use skyrelease_changelog::ChangelogGenerator;
use skyrelease_core::config::{load_config_or_default, RollConfig};
use skyrelease_git::GitRepo;
use skyrelease_manifests::{ManifestEntry, ManifestFormat, ManifestRegistry, RollOutcome, VersionRoller};

use crate::cli::output;

/// Bump every registered manifest in the current directory
#[derive(Debug, Args)]
pub struct RollCommand {}

impl RollCommand {
    /// Execute the roll command
    pub fn execute(&self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        info!(root = %cwd.display(), "executing roll command");

        let (config, config_path) = load_config_or_default(&cwd)?;
        match &config_path {
            Some(path) => debug!(path = %path.display(), "using configuration file"),
            None => debug!("no configuration found, using defaults"),
        }

        roll_versions(&cwd, &config.roll)?;
        Ok(())
    }
}

/// Bump pubspecs (each followed by its changelog), then Android manifests.
///
/// Manifest paths are resolved against `root` before anything is read.
#[instrument(skip(config), fields(root = %root.display()))]
pub(crate) fn roll_versions(root: &Path, config: &RollConfig) -> anyhow::Result<Vec<RollOutcome>> {
    let registry = ManifestRegistry::from_config(root, config);
    let repo = GitRepo::discover(root)?;
    let changelog = ChangelogGenerator::new(&repo, config.compare_url.as_str());
    let roller = VersionRoller::new();
    let mut outcomes = Vec::with_capacity(registry.entries().len());

    println!("{}", output::header("Pub packages:"));
    for entry in registry.of_format(ManifestFormat::KeyedVersion) {
        let outcome = roller.roll(entry)?;
        println!("{}", outcome);
        changelog.update(
            &changelog_path(entry, &config.changelog_file),
            &entry.path,
            &outcome.new_version,
        )?;
        outcomes.push(outcome);
    }

    println!("{}", output::header("APKs:"));
    for entry in registry.of_format(ManifestFormat::AttributeVersion) {
        let outcome = roller.roll(entry)?;
        println!("{}", outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Changelog sitting next to a manifest
fn changelog_path(entry: &ManifestEntry, file_name: &str) -> PathBuf {
    entry
        .path
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    const APK_MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="org.domokit.sky.demo" android:versionCode="20" android:versionName="0.0.20">
</manifest>
"#;

    fn commit(repo: &Repository, root: &Path, message: &str, files: &[(&str, &str)]) {
        let mut index = repo.index().unwrap();
        for (name, content) in files {
            let full = root.join(name);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(&full, content).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    fn config() -> RollConfig {
        RollConfig {
            pubspecs: vec![
                PathBuf::from("packages/sky/pubspec.yaml"),
                PathBuf::from("packages/sky_engine/pubspec.yaml"),
            ],
            android_manifests: vec![PathBuf::from("apk/AndroidManifest.xml")],
            ..RollConfig::default()
        }
    }

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit(
            &repo,
            temp.path(),
            "initial",
            &[
                ("packages/sky/pubspec.yaml", "name: sky\nversion: 0.0.20\n"),
                ("packages/sky/CHANGELOG.md", "## 0.0.20\n\n  - 3 changes: old\n\n"),
                ("packages/sky_engine/pubspec.yaml", "name: sky_engine\nversion: 0.0.9\n"),
                ("apk/AndroidManifest.xml", APK_MANIFEST),
            ],
        );
        commit(&repo, temp.path(), "engine work", &[("engine.cc", "1\n")]);
        temp
    }

    #[test]
    fn test_roll_versions_bumps_everything() {
        let temp = fixture();

        let outcomes = roll_versions(temp.path(), &config()).unwrap();

        let summary: Vec<_> = outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.old_version.as_str(), o.new_version.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("sky", "0.0.20", "0.0.21"),
                ("sky_engine", "0.0.9", "0.0.10"),
                ("org.domokit.sky.demo", "0.0.20", "0.0.21"),
            ]
        );
        assert_eq!(outcomes[2].new_code.as_deref(), Some("21"));
    }

    #[test]
    fn test_roll_versions_prepends_changelogs() {
        let temp = fixture();

        roll_versions(temp.path(), &config()).unwrap();

        let sky = std::fs::read_to_string(temp.path().join("packages/sky/CHANGELOG.md")).unwrap();
        assert!(sky.starts_with("## 0.0.21\n\n  - 1 changes: https://github.com/domokit/mojo/compare/"));
        assert!(sky.ends_with("## 0.0.20\n\n  - 3 changes: old\n\n"));

        let engine =
            std::fs::read_to_string(temp.path().join("packages/sky_engine/CHANGELOG.md")).unwrap();
        assert!(engine.starts_with("## 0.0.10\n\n  - 1 changes: "));

        assert!(!temp.path().join("apk/CHANGELOG.md").exists());
    }

    #[test]
    fn test_malformed_manifest_stops_the_roll() {
        let temp = fixture();
        std::fs::write(
            temp.path().join("packages/sky_engine/pubspec.yaml"),
            "name: sky_engine\nversion: dev\n",
        )
        .unwrap();

        assert!(roll_versions(temp.path(), &config()).is_err());

        let apk = std::fs::read_to_string(temp.path().join("apk/AndroidManifest.xml")).unwrap();
        assert_eq!(apk, APK_MANIFEST);
    }

    #[test]
    fn test_changelog_path_is_next_to_manifest() {
        let entry = ManifestEntry::new("/src/packages/sky/pubspec.yaml", ManifestFormat::KeyedVersion);
        assert_eq!(
            changelog_path(&entry, "CHANGELOG.md"),
            PathBuf::from("/src/packages/sky/CHANGELOG.md")
        );
    }
}
