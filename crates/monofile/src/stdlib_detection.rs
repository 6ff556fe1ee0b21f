//! Standard library detection
//!
//! Single source of truth for deciding which packages stay ordinary imports.
//! Only the import path is consulted: Go reserves paths whose first element
//! has no dot for the standard library, while anything fetched from a
//! module host starts with a domain.

use crate::program::Package;

/// Check if an import path names a standard library package
///
/// Vendored and GOROOT-relative layouts are not recognised.
pub fn is_standard_import_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.contains('.')
}

/// Check if a package is kept as an import instead of being inlined
///
/// Ad-hoc units are always inlined, whatever their path looks like.
pub fn is_retained(package: &Package) -> bool {
    !package.is_adhoc() && is_standard_import_path(&package.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ADHOC_PACKAGE_PATH;

    #[test]
    fn test_is_standard_import_path() {
        assert!(is_standard_import_path("fmt"));
        assert!(is_standard_import_path("net/http"));
        assert!(is_standard_import_path("encoding/json"));
        assert!(is_standard_import_path("internal/x.y"));
        assert!(is_standard_import_path(""));

        assert!(!is_standard_import_path("rsc.io/quote"));
        assert!(!is_standard_import_path("example.com/mypackage/embedding"));
        assert!(!is_standard_import_path("golang.org/x/tools"));
    }

    #[test]
    fn test_adhoc_units_are_never_retained() {
        // "command-line-arguments" has no dot but is the ad-hoc unit
        assert!(is_standard_import_path(ADHOC_PACKAGE_PATH));
        assert!(!is_retained(&Package::stub(ADHOC_PACKAGE_PATH, "main")));

        let mut flagged = Package::stub("scratch", "main");
        flagged.adhoc = true;
        assert!(!is_retained(&flagged));

        assert!(is_retained(&Package::stub("strings", "strings")));
        assert!(!is_retained(&Package::stub("example.com/lib", "lib")));
    }
}
