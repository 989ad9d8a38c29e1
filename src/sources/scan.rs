//! Installed library discovery.
//!
//! Library roots are directories whose immediate subdirectories are each one
//! installed library. Bundled and sketchbook roots are merged into the shared
//! [`Catalog`]; board-package roots produce a separate list so that a
//! platform's bundled `Servo` never overwrites the user's `Servo`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::board::Platform;
use crate::core::library::{normalize_name, Catalog, LibraryRecord};
use crate::core::properties::{format_version, LibraryProperties, PROPERTIES_FILE};
use crate::util::fs::{dir_name, list_subdirs};

/// Read a library folder's metadata.
///
/// Missing files yield `None` silently; unreadable or malformed ones are
/// logged and also yield `None`, so the folder falls back to folder-name
/// identity.
fn read_properties(lib_dir: &Path) -> Option<LibraryProperties> {
    let path = lib_dir.join(PROPERTIES_FILE);
    if !path.is_file() {
        return None;
    }

    match LibraryProperties::load(&path) {
        Ok(props) => Some(props),
        Err(e) => {
            tracing::warn!("ignoring library metadata: {:#}", e);
            None
        }
    }
}

fn library_dirs(root: &Path) -> Vec<PathBuf> {
    list_subdirs(root).unwrap_or_else(|e| {
        tracing::warn!("skipping library root {}: {:#}", root.display(), e);
        Vec::new()
    })
}

/// Merge every library installed under `root` into `catalog`.
///
/// Existing records are updated in place, keeping their index data. A missing
/// root is not an error. Returns the number of library folders processed.
pub fn scan_library_root(catalog: &mut Catalog, root: &Path, built_in: bool) -> usize {
    if !root.is_dir() {
        tracing::debug!("library root {} does not exist", root.display());
        return 0;
    }

    let dirs = library_dirs(root);
    for lib_dir in &dirs {
        let folder = dir_name(lib_dir);

        let record = match read_properties(lib_dir) {
            Some(props) => {
                let key = normalize_name(&props.name);
                let record = catalog.upsert_with(&key, || LibraryRecord::from_properties(&props));
                record.installed_version = props.version.as_deref().map(format_version);
                record
            }
            None => catalog.upsert_with(&folder, || LibraryRecord::contributed(&folder)),
        };

        record.mark_installed(lib_dir, built_in);
        tracing::debug!(
            "found {} {} in {}",
            record.name,
            record.installed_version.as_deref().unwrap_or("(unversioned)"),
            root.display()
        );
    }

    dirs.len()
}

/// Collect the libraries bundled with one installed platform.
///
/// `taken` holds every key already used in this load. A library whose key is
/// taken is renamed to `name(arch)`; if that is taken too, the library is
/// dropped with a warning. Accepted keys are added to `taken`.
pub fn scan_board_libraries(platform: &Platform, taken: &mut HashSet<String>) -> Vec<LibraryRecord> {
    let root = platform.libraries_path();
    if !root.is_dir() {
        return Vec::new();
    }

    let arch = &platform.architecture;
    let mut libs = Vec::new();

    for lib_dir in library_dirs(&root) {
        let (mut record, mut key) = match read_properties(&lib_dir) {
            Some(props) => {
                let key = normalize_name(&props.name);
                (LibraryRecord::from_properties(&props), key)
            }
            None => {
                let folder = dir_name(&lib_dir);
                (LibraryRecord::new(folder.clone()), folder)
            }
        };

        record.mark_installed(&lib_dir, true);
        record.architectures = vec![arch.clone()];

        if taken.contains(&key) {
            record.name = format!("{}({})", record.name, arch);
            key = format!("{}({})", key, arch);
        }

        if taken.insert(key) {
            tracing::debug!("found board library {} in {}", record.name, root.display());
            libs.push(record);
        } else {
            tracing::warn!(
                "dropping board library {} at {}: name already used",
                record.name,
                lib_dir.display()
            );
        }
    }

    libs
}

/// Collect bundled libraries from every platform, in order.
///
/// Names already present in `catalog` are treated as taken.
pub fn scan_installed_platforms(catalog: &Catalog, platforms: &[Platform]) -> Vec<LibraryRecord> {
    let mut taken: HashSet<String> = catalog.keys().map(str::to_string).collect();
    let mut libs = Vec::new();

    for platform in platforms {
        let found = scan_board_libraries(platform, &mut taken);
        tracing::debug!(
            "{}:{} bundles {} libraries",
            platform.vendor,
            platform.architecture,
            found.len()
        );
        libs.extend(found);
    }

    libs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn add_library(root: &Path, folder: &str, properties: Option<&str>) -> PathBuf {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        if let Some(props) = properties {
            fs::write(dir.join(PROPERTIES_FILE), props).unwrap();
        }
        dir
    }

    fn platform(root: &Path, arch: &str) -> Platform {
        Platform {
            vendor: "arduino".to_string(),
            architecture: arch.to_string(),
            version: Some("1.0.0".to_string()),
            root_path: root.to_path_buf(),
        }
    }

    #[test]
    fn test_missing_root_is_noop() {
        let tmp = TempDir::new().unwrap();
        let mut catalog = Catalog::new();

        let count = scan_library_root(&mut catalog, &tmp.path().join("missing"), false);
        assert_eq!(count, 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_scan_updates_existing_record() {
        let tmp = TempDir::new().unwrap();
        let dir = add_library(
            tmp.path(),
            "Adafruit_GFX_Library",
            Some("name=Adafruit GFX Library\nversion=1.10\nauthor=Someone Else\n"),
        );
        fs::create_dir_all(dir.join("src")).unwrap();

        let mut catalog = Catalog::new();
        let mut seeded = LibraryRecord::new("Adafruit GFX Library");
        seeded.versions = vec!["1.10.0".into(), "1.11.0".into()];
        seeded.author = Some("Adafruit".into());
        catalog.upsert_with("Adafruit_GFX_Library", || seeded);

        scan_library_root(&mut catalog, tmp.path(), false);

        assert_eq!(catalog.len(), 1);
        let gfx = catalog.get("Adafruit_GFX_Library").unwrap();
        assert!(gfx.installed);
        assert!(!gfx.built_in);
        assert_eq!(gfx.installed_version.as_deref(), Some("1.10.0"));
        assert_eq!(gfx.versions, vec!["1.10.0", "1.11.0"]);
        assert_eq!(gfx.author.as_deref(), Some("Adafruit"));
        assert_eq!(gfx.installed_path.as_deref(), Some(dir.as_path()));
        assert_eq!(gfx.source_path, Some(dir.join("src")));
    }

    #[test]
    fn test_scan_creates_records() {
        let tmp = TempDir::new().unwrap();
        add_library(
            tmp.path(),
            "Servo",
            Some("name=Servo\nversion=1.1\nurl=https://example.com/servo\narchitectures=avr,sam\n"),
        );
        let bare = add_library(tmp.path(), "MyHelpers", None);

        let mut catalog = Catalog::new();
        let count = scan_library_root(&mut catalog, tmp.path(), true);
        assert_eq!(count, 2);

        let helpers = catalog.get("MyHelpers").unwrap();
        assert_eq!(helpers.name, "MyHelpers");
        assert_eq!(helpers.types, vec!["Contributed"]);
        assert_eq!(helpers.installed_version, None);
        assert!(helpers.built_in);
        assert_eq!(helpers.source_path.as_deref(), Some(bare.as_path()));

        let servo = catalog.get("Servo").unwrap();
        assert_eq!(servo.website.as_deref(), Some("https://example.com/servo"));
        assert_eq!(servo.architectures, vec!["avr", "sam"]);
        assert!(servo.types.is_empty());
        assert!(servo.versions.is_empty());
    }

    #[test]
    fn test_malformed_metadata_falls_back_to_folder() {
        let tmp = TempDir::new().unwrap();
        add_library(tmp.path(), "Broken", Some("version=1.0\n"));

        let mut catalog = Catalog::new();
        scan_library_root(&mut catalog, tmp.path(), false);

        let broken = catalog.get("Broken").unwrap();
        assert_eq!(broken.types, vec!["Contributed"]);
        assert!(broken.installed);
    }

    #[test]
    fn test_later_pass_wins() {
        let tmp = TempDir::new().unwrap();
        let bundled = tmp.path().join("bundled");
        let sketchbook = tmp.path().join("sketchbook");
        add_library(&bundled, "Wire", Some("name=Wire\nversion=1.0\n"));
        let user = add_library(&sketchbook, "Wire", Some("name=Wire\nversion=2.0\n"));

        let mut catalog = Catalog::new();
        scan_library_root(&mut catalog, &bundled, true);
        scan_library_root(&mut catalog, &sketchbook, false);

        let wire = catalog.get("Wire").unwrap();
        assert!(!wire.built_in);
        assert_eq!(wire.installed_version.as_deref(), Some("2.0.0"));
        assert_eq!(wire.installed_path.as_deref(), Some(user.as_path()));
    }

    #[test]
    fn test_board_library_collision_renaming() {
        let tmp = TempDir::new().unwrap();
        let avr = tmp.path().join("avr");
        let sam = tmp.path().join("sam");
        add_library(&avr.join("libraries"), "Servo", Some("name=Servo\nversion=1.1\n"));
        add_library(&sam.join("libraries"), "Servo", Some("name=Servo\nversion=1.2\n"));

        let catalog = Catalog::new();
        let libs = scan_installed_platforms(&catalog, &[platform(&avr, "avr"), platform(&sam, "sam")]);

        let names: Vec<_> = libs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Servo", "Servo(sam)"]);
        assert_eq!(libs[0].architectures, vec!["avr"]);
        assert_eq!(libs[1].architectures, vec!["sam"]);
        assert!(libs.iter().all(|l| l.built_in && l.installed));
        assert!(libs[0].types.is_empty());
    }

    #[test]
    fn test_board_library_shadowing_catalog_is_renamed() {
        let tmp = TempDir::new().unwrap();
        let avr = tmp.path().join("avr");
        add_library(&avr.join("libraries"), "EEPROM", None);

        let mut catalog = Catalog::new();
        catalog.upsert_with("EEPROM", || LibraryRecord::new("EEPROM"));

        let libs = scan_installed_platforms(&catalog, &[platform(&avr, "avr")]);
        assert_eq!(libs.len(), 1);
        assert_eq!(libs[0].name, "EEPROM(avr)");
        assert!(libs[0].types.is_empty());
        assert_eq!(catalog.get("EEPROM").unwrap().name, "EEPROM");
    }

    #[test]
    fn test_double_collision_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        let third = tmp.path().join("third");
        for root in [&first, &second, &third] {
            add_library(&root.join("libraries"), "SPI", Some("name=SPI\nversion=1.0\n"));
        }

        let catalog = Catalog::new();
        let libs = scan_installed_platforms(
            &catalog,
            &[
                platform(&first, "avr"),
                platform(&second, "megaavr"),
                platform(&third, "megaavr"),
            ],
        );

        let names: Vec<_> = libs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["SPI", "SPI(megaavr)"]);
        assert_eq!(
            libs[1].installed_path,
            Some(second.join("libraries").join("SPI"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_does_not_hide_root() {
        let tmp = TempDir::new().unwrap();
        add_library(tmp.path(), "Servo", Some("name=Servo\nversion=1.1\n"));
        add_library(tmp.path(), "Wire", None);
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("Old")).unwrap();

        let mut catalog = Catalog::new();
        let count = scan_library_root(&mut catalog, tmp.path(), false);

        assert_eq!(count, 2);
        assert!(catalog.get("Servo").unwrap().installed);
        assert!(catalog.get("Wire").unwrap().installed);
        assert!(catalog.get("Old").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_in_board_libraries() {
        let tmp = TempDir::new().unwrap();
        let avr = tmp.path().join("avr");
        add_library(&avr.join("libraries"), "EEPROM", Some("name=EEPROM\nversion=2.0\n"));
        std::os::unix::fs::symlink(tmp.path().join("gone"), avr.join("libraries").join("SPI"))
            .unwrap();

        let libs = scan_installed_platforms(&Catalog::new(), &[platform(&avr, "avr")]);
        let names: Vec<_> = libs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["EEPROM"]);
    }

    #[test]
    fn test_platform_without_libraries() {
        let tmp = TempDir::new().unwrap();
        let mut taken = HashSet::new();
        assert!(scan_board_libraries(&platform(tmp.path(), "avr"), &mut taken).is_empty());
    }
}
