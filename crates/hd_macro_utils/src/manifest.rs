use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::Span;
use toml_edit::{Document, Item, Table};

/// The caller's `Cargo.toml`, used to find the path under which generated
/// code can name a workspace crate.
///
/// # Example
///
/// ```rust
/// # use hd_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("hd_codec"));
/// ```
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the requested crate name begins with `hd_` and the caller depends on
///    the facade crate `hyperdoc`, return `::hyperdoc::short_name`
///    (e.g. `hd_codec` -> `::hyperdoc::codec`).
/// 3. Repeat step 1-2 in `dev-dependencies`.
/// 4. Otherwise, fall back to the absolute path `::crate_name`.
///
/// A manifest that cannot be read or parsed behaves like one without
/// dependencies, so resolution ends at rule 4.
///
/// ## Note
///
/// A crate that expands its own derives should add
/// `extern crate self as crate_name;` to its root so that rule 4 resolves
/// inside the crate as well.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Option<Document<Box<str>>>,
    pub modified_time: Option<SystemTime>,
}

const FACADE_NAME: &str = "hyperdoc";
const CRATE_PREFIX: &str = "hd_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> Option<PathBuf> {
        let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
        path.push("Cargo.toml");
        Some(path)
    }

    #[inline(never)]
    fn modified_time(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
    }

    #[inline(never)]
    fn read(path: &Path) -> Option<Document<Box<str>>> {
        let text = std::fs::read_to_string(path).ok()?.into_boxed_str();
        Document::parse(text).ok()
    }

    fn absolute_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> syn::Path {
        let mut path = syn::Path {
            leading_colon: Some(Default::default()),
            segments: Default::default(),
        };
        for segment in segments {
            path.segments.push(syn::PathSegment::from(syn::Ident::new(
                segment,
                Span::call_site(),
            )));
        }
        path
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::absolute_path([name]));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        deps.contains_key(FACADE_NAME)
            .then(|| Self::absolute_path([FACADE_NAME, module]))
    }

    /// Return a [`syn::Path`] for the package named `name` as seen from the
    /// caller. See the type documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        let Some(manifest) = &self.manifest else {
            return Self::absolute_path([name]);
        };

        for section in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = manifest.get(section)
                && let Some(path) = Self::find_in_deps(deps, name)
            {
                return path;
            }
        }

        Self::absolute_path([name])
    }

    /// Run `func` with the caller's manifest.
    ///
    /// Manifests are cached per path and re-read when their modification time
    /// changes. Call this once per macro invocation and reuse the result.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(path) = Self::manifest_path() else {
            return func(&Manifest {
                manifest: None,
                modified_time: None,
            });
        };
        let modified_time = Self::modified_time(&path);

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(manifest) = manifests.get(&path)
            && manifest.modified_time == modified_time
            && modified_time.is_some()
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

#[cfg(test)]
mod tests {
    use quote::ToTokens;
    use toml_edit::Document;

    use super::Manifest;

    fn manifest(text: &str) -> Manifest {
        Manifest {
            manifest: Document::parse(text.to_owned().into_boxed_str()).ok(),
            modified_time: None,
        }
    }

    fn path_text(path: syn::Path) -> String {
        path.to_token_stream().to_string().replace(' ', "")
    }

    #[test]
    fn direct_dependency() {
        let m = manifest("[dependencies]\nhd_codec = \"0.0.1\"\n");
        assert_eq!(path_text(m.get_crate_path("hd_codec")), "::hd_codec");
    }

    #[test]
    fn through_facade() {
        let m = manifest("[dependencies]\nhyperdoc = \"0.0.1\"\n");
        assert_eq!(path_text(m.get_crate_path("hd_codec")), "::hyperdoc::codec");
        assert_eq!(path_text(m.get_crate_path("serde")), "::serde");
    }

    #[test]
    fn dev_dependencies_and_fallback() {
        let m = manifest("[dev-dependencies]\nhyperdoc = \"0.0.1\"\n");
        assert_eq!(path_text(m.get_crate_path("hd_codec")), "::hyperdoc::codec");

        let unreadable = Manifest {
            manifest: None,
            modified_time: None,
        };
        assert_eq!(path_text(unreadable.get_crate_path("hd_codec")), "::hd_codec");
    }
}
