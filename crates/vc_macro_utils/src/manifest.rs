use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The parsed `Cargo.toml` of the crate invoking a proc-macro.
///
/// Used to find the path under which a workspace crate is reachable from
/// generated code.
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the requested crate name starts with `vc_` and the caller depends on
///    the umbrella crate `vc_accel`, return `::vc_accel::short_name`
///    (e.g. `vc_reflect` -> `::vc_accel::reflect`).
/// 3. Repeat 1-2 in `dev-dependencies`.
/// 4. Otherwise, fall back to `::crate_name`.
///
/// A crate that refers to itself in doc tests should carry
/// `extern crate self as crate_name;` in its root so that rule 4 holds.
#[derive(Debug)]
pub struct Manifest {
    manifest: Document<Box<str>>,
    modified_time: SystemTime,
}

const UMBRELLA_NAME: &str = "vc_accel";
const ENGINE_PREFIX: &str = "vc_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> PathBuf {
        let Some(dir) = env::var_os("CARGO_MANIFEST_DIR") else {
            panic!("CARGO_MANIFEST_DIR should be auto-defined by cargo.");
        };
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        assert!(
            path.exists(),
            "Cargo manifest does not exist at path {}",
            path.display(),
        );
        path
    }

    #[inline(never)]
    fn read(path: &Path) -> Document<Box<str>> {
        let source = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(source)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    fn parse_path(path: &str) -> syn::Path {
        syn::parse_str(path).unwrap_or_else(|_| panic!("`{path}` is not a valid path"))
    }

    fn find_in(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::parse_path(&format!("::{name}")));
        }
        let module = name.strip_prefix(ENGINE_PREFIX)?;
        deps.contains_key(UMBRELLA_NAME)
            .then(|| Self::parse_path(&format!("::{UMBRELLA_NAME}::{module}")))
    }

    /// Return the [`syn::Path`] of the package named `name`, as seen from the
    /// caller's `Cargo.toml`. See the type-level documentation for the rules.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        for table in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = self.manifest.get(table)
                && let Some(path) = Self::find_in(deps, name)
            {
                return path;
            }
        }
        Self::parse_path(&format!("::{name}"))
    }

    /// Run `func` with the caller's manifest.
    ///
    /// Manifests are cached per path and re-read when the file's modification
    /// time changes. Call it once per macro invocation and keep the result.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = std::fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(manifest) = manifests.get(&path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }
        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read(&path),
            modified_time,
        };
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}
