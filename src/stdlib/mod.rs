//! Standard-library module registry.
//!
//! Static knowledge of which top-level module names belong to the CPython
//! standard library for a given runtime version. Imports of these modules
//! are never dependency issues, so the classifier consults this registry
//! before anything else.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur when parsing a Python version string.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The string is not of the form `major.minor`.
    #[error("invalid Python version: {0}")]
    Invalid(String),

    /// The version is outside the range this registry knows about.
    #[error("unsupported Python version: {0} (supported: 3.9 through 3.13)")]
    Unsupported(String),
}

/// A Python runtime version, down to the minor release.
///
/// Only the major and minor components matter for standard-library
/// membership; patch releases never add or remove top-level modules.
///
/// # Example
///
/// ```
/// use depscope::stdlib::PythonVersion;
///
/// let version: PythonVersion = "3.11".parse().unwrap();
/// assert_eq!(version.minor, 11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl PythonVersion {
    /// Creates a version from major and minor components.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self::new(3, 12)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| VersionError::Invalid(s.to_string()))?;
        let major: u8 = major
            .parse()
            .map_err(|_| VersionError::Invalid(s.to_string()))?;
        let minor: u8 = minor
            .split('.')
            .next()
            .unwrap_or(minor)
            .parse()
            .map_err(|_| VersionError::Invalid(s.to_string()))?;

        if major != 3 || !(9..=13).contains(&minor) {
            return Err(VersionError::Unsupported(s.to_string()));
        }
        Ok(Self { major, minor })
    }
}

/// Top-level standard-library modules present in every supported version
/// (3.9 baseline). Sorted so membership checks can binary-search.
const BASE_MODULES: &[&str] = &[
    "__future__",
    "_thread",
    "abc",
    "argparse",
    "array",
    "ast",
    "asyncio",
    "atexit",
    "base64",
    "bdb",
    "binascii",
    "bisect",
    "builtins",
    "bz2",
    "cProfile",
    "calendar",
    "cmath",
    "cmd",
    "code",
    "codecs",
    "codeop",
    "collections",
    "colorsys",
    "compileall",
    "concurrent",
    "configparser",
    "contextlib",
    "contextvars",
    "copy",
    "copyreg",
    "csv",
    "ctypes",
    "curses",
    "dataclasses",
    "datetime",
    "dbm",
    "decimal",
    "difflib",
    "dis",
    "doctest",
    "email",
    "encodings",
    "ensurepip",
    "enum",
    "errno",
    "faulthandler",
    "fcntl",
    "filecmp",
    "fileinput",
    "fnmatch",
    "fractions",
    "ftplib",
    "functools",
    "gc",
    "getopt",
    "getpass",
    "gettext",
    "glob",
    "graphlib",
    "grp",
    "gzip",
    "hashlib",
    "heapq",
    "hmac",
    "html",
    "http",
    "idlelib",
    "imaplib",
    "importlib",
    "inspect",
    "io",
    "ipaddress",
    "itertools",
    "json",
    "keyword",
    "linecache",
    "locale",
    "logging",
    "lzma",
    "mailbox",
    "marshal",
    "math",
    "mimetypes",
    "mmap",
    "modulefinder",
    "multiprocessing",
    "netrc",
    "numbers",
    "operator",
    "optparse",
    "os",
    "pathlib",
    "pdb",
    "pickle",
    "pickletools",
    "pkgutil",
    "platform",
    "plistlib",
    "poplib",
    "posixpath",
    "pprint",
    "profile",
    "pstats",
    "pty",
    "pwd",
    "py_compile",
    "pyclbr",
    "pydoc",
    "queue",
    "quopri",
    "random",
    "re",
    "readline",
    "reprlib",
    "resource",
    "rlcompleter",
    "runpy",
    "sched",
    "secrets",
    "select",
    "selectors",
    "shelve",
    "shlex",
    "shutil",
    "signal",
    "site",
    "smtplib",
    "socket",
    "socketserver",
    "sqlite3",
    "ssl",
    "stat",
    "statistics",
    "string",
    "stringprep",
    "struct",
    "subprocess",
    "symtable",
    "sys",
    "sysconfig",
    "syslog",
    "tabnanny",
    "tarfile",
    "tempfile",
    "termios",
    "test",
    "textwrap",
    "threading",
    "time",
    "timeit",
    "tkinter",
    "token",
    "tokenize",
    "trace",
    "traceback",
    "tracemalloc",
    "tty",
    "turtle",
    "types",
    "typing",
    "unicodedata",
    "unittest",
    "urllib",
    "uuid",
    "venv",
    "warnings",
    "wave",
    "weakref",
    "webbrowser",
    "wsgiref",
    "xml",
    "xmlrpc",
    "zipapp",
    "zipfile",
    "zipimport",
    "zlib",
    "zoneinfo",
];

/// Modules first shipped in 3.11.
const ADDED_3_11: &[&str] = &["tomllib"];

/// Modules removed in 3.12 (PEP 594 first wave plus distutils).
const REMOVED_3_12: &[&str] = &["asynchat", "asyncore", "distutils", "imp", "smtpd"];

/// Modules removed in 3.13 (PEP 594 dead batteries).
const REMOVED_3_13: &[&str] = &[
    "aifc", "audioop", "cgi", "cgitb", "chunk", "crypt", "imghdr", "lib2to3", "mailcap", "msilib",
    "nis", "nntplib", "ossaudiodev", "pipes", "sndhdr", "spwd", "sunau", "telnetlib", "uu",
    "xdrlib",
];

/// Modules present in 3.9–3.11 but not in the 3.9 baseline list above
/// because they were later removed; they must still answer true for the
/// versions that shipped them.
const LEGACY_MODULES: &[&str] = &[
    "aifc",
    "asynchat",
    "asyncore",
    "audioop",
    "cgi",
    "cgitb",
    "chunk",
    "crypt",
    "distutils",
    "imghdr",
    "imp",
    "lib2to3",
    "mailcap",
    "msilib",
    "nis",
    "nntplib",
    "ossaudiodev",
    "pipes",
    "smtpd",
    "sndhdr",
    "spwd",
    "sunau",
    "telnetlib",
    "uu",
    "xdrlib",
];

/// Answers "is this top-level module part of the standard library?" for a
/// given runtime version.
///
/// # Example
///
/// ```
/// use depscope::stdlib::{is_stdlib_module, PythonVersion};
///
/// assert!(is_stdlib_module("json", PythonVersion::new(3, 12)));
/// assert!(is_stdlib_module("tomllib", PythonVersion::new(3, 11)));
/// assert!(!is_stdlib_module("tomllib", PythonVersion::new(3, 10)));
/// assert!(!is_stdlib_module("numpy", PythonVersion::new(3, 12)));
/// ```
pub fn is_stdlib_module(module: &str, version: PythonVersion) -> bool {
    if version.minor >= 11 && ADDED_3_11.contains(&module) {
        return true;
    }
    if version.minor >= 12 && REMOVED_3_12.contains(&module) {
        return false;
    }
    if version.minor >= 13 && REMOVED_3_13.contains(&module) {
        return false;
    }
    BASE_MODULES.binary_search(&module).is_ok() || LEGACY_MODULES.contains(&module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_modules_sorted() {
        // binary_search requires sorted input
        let mut sorted = BASE_MODULES.to_vec();
        sorted.sort_unstable();
        assert_eq!(BASE_MODULES, sorted.as_slice());
    }

    #[test]
    fn test_common_modules() {
        let v = PythonVersion::default();
        for module in ["os", "sys", "json", "typing", "collections", "re"] {
            assert!(is_stdlib_module(module, v), "{module} should be stdlib");
        }
    }

    #[test]
    fn test_third_party_modules() {
        let v = PythonVersion::default();
        for module in ["numpy", "requests", "django", "cv2"] {
            assert!(!is_stdlib_module(module, v), "{module} is not stdlib");
        }
    }

    #[test]
    fn test_tomllib_added_in_3_11() {
        assert!(!is_stdlib_module("tomllib", PythonVersion::new(3, 10)));
        assert!(is_stdlib_module("tomllib", PythonVersion::new(3, 11)));
        assert!(is_stdlib_module("tomllib", PythonVersion::new(3, 12)));
    }

    #[test]
    fn test_distutils_removed_in_3_12() {
        assert!(is_stdlib_module("distutils", PythonVersion::new(3, 11)));
        assert!(!is_stdlib_module("distutils", PythonVersion::new(3, 12)));
    }

    #[test]
    fn test_dead_batteries_removed_in_3_13() {
        assert!(is_stdlib_module("telnetlib", PythonVersion::new(3, 12)));
        assert!(!is_stdlib_module("telnetlib", PythonVersion::new(3, 13)));
    }

    #[test]
    fn test_version_parse() {
        let v: PythonVersion = "3.10".parse().unwrap();
        assert_eq!(v, PythonVersion::new(3, 10));

        assert!("3".parse::<PythonVersion>().is_err());
        assert!("2.7".parse::<PythonVersion>().is_err());
        assert!("3.99".parse::<PythonVersion>().is_err());
        assert!("not-a-version".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_version_display() {
        assert_eq!(PythonVersion::new(3, 11).to_string(), "3.11");
    }
}
