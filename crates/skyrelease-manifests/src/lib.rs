//! skyrelease Manifests - Version rolling for pubspec and Android manifests
//!
//! Two document formats carry a version: YAML pubspecs with a `version` key
//! and Android manifests with `versionCode`/`versionName` attributes on the
//! root element. Both are bumped with the same no-carry increment.

pub mod attribute;
pub mod document;
pub mod keyed;
pub mod roller;
pub mod version;

pub use attribute::{AttributeVersionDocument, ANDROID_NAMESPACE, MANIFEST_PREFACE};
pub use document::{ManifestDocument, ManifestFormat};
pub use keyed::KeyedVersionDocument;
pub use roller::{ManifestEntry, ManifestRegistry, RollOutcome, VersionRoller};
pub use version::increment_version;
