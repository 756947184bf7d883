//! Reading and rewriting `Chart.yaml`.
//!
//! Reads go through `serde_yaml` into [`ChartManifest`]. Writes must leave
//! every byte outside the top-level `version` value untouched (comments,
//! key order, quoting, blank lines), which a `serde_yaml` round trip cannot
//! do. The update therefore validates the document tree first and then
//! patches only the value substring on the line holding the top-level
//! `version:` key.

use crate::error::{Error, Result};
use crate::models::chart::{scalar_to_string, ChartManifest};
use serde_yaml::Value as Yaml;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a chart manifest inside a chart directory.
pub const CHART_FILE: &str = "Chart.yaml";

/// Key rewritten by [`update_version`].
const VERSION_KEY: &str = "version";

/// Path to the manifest for `chart_dir`.
pub fn manifest_path(chart_dir: &Path) -> PathBuf {
    chart_dir.join(CHART_FILE)
}

/// Read and validate `<chart_dir>/Chart.yaml`.
///
/// Fails with `Io` when unreadable, `Parse` on malformed YAML or a
/// non-mapping document, and `MissingField` when `version` is absent or empty.
pub fn read_manifest(chart_dir: &Path) -> Result<ChartManifest> {
    let path = manifest_path(chart_dir);
    let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let doc = parse_document(&path, &source)?;
    let manifest: ChartManifest = serde_yaml::from_value(doc).map_err(|e| Error::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;
    if manifest.version.trim().is_empty() {
        return Err(Error::MissingField { path });
    }
    Ok(manifest)
}

/// Replace the top-level `version` value of `<chart_dir>/Chart.yaml` with
/// `new_version`, leaving all other content byte-for-byte intact.
///
/// Fails with `FieldNotFound`, leaving the file unwritten, when no line edit
/// changes the top-level `version` and nothing else in the parsed document.
pub fn update_version(chart_dir: &Path, new_version: &str) -> Result<()> {
    let path = manifest_path(chart_dir);
    let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let doc = parse_document(&path, &source)?;

    let has_version = doc
        .as_mapping()
        .map(|m| m.contains_key(VERSION_KEY))
        .unwrap_or(false);
    if !has_version {
        return Err(Error::FieldNotFound { path });
    }

    let updated = version_line_spans(&source)
        .map(|(start, end)| splice(&source, start, end, new_version))
        .find(|candidate| rewrites_only_version(&doc, candidate, new_version))
        .ok_or_else(|| Error::FieldNotFound { path: path.clone() })?;
    tracing::debug!(path = %path.display(), version = new_version, "writing manifest");
    fs::write(&path, updated).map_err(|e| Error::io(&path, e))
}

fn parse_document(path: &Path, source: &str) -> Result<Yaml> {
    let doc: Yaml = serde_yaml::from_str(source).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !doc.is_mapping() {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: "expected a mapping at the top level".to_string(),
        });
    }
    Ok(doc)
}

/// Byte spans of the values on every column-zero `version:` line.
///
/// Top-level keys of a block mapping start at column zero, so indented
/// `version:` keys (e.g. under `dependencies`) are never candidates. Lines
/// inside a multi-line scalar can still match, so every candidate rewrite
/// goes through [`rewrites_only_version`] before it is written.
fn version_line_spans(source: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    source
        .split_inclusive('\n')
        .scan(0usize, |offset, line| {
            let at = *offset;
            *offset += line.len();
            Some((at, line))
        })
        .filter_map(|(at, line)| version_value_span(line).map(|(s, e)| (at + s, at + e)))
}

fn splice(source: &str, start: usize, end: usize, value: &str) -> String {
    let mut out = String::with_capacity(source.len() + value.len());
    out.push_str(&source[..start]);
    out.push_str(value);
    out.push_str(&source[end..]);
    out
}

/// True when `candidate` parses to the same top-level mapping as `before`
/// except for `version`, which must now read as `new_version`.
fn rewrites_only_version(before: &Yaml, candidate: &str, new_version: &str) -> bool {
    let (Ok(Yaml::Mapping(mut after)), Some(before)) =
        (serde_yaml::from_str::<Yaml>(candidate), before.as_mapping())
    else {
        return false;
    };
    let mut before = before.clone();
    let written = after.remove(VERSION_KEY).map(scalar_to_string);
    before.remove(VERSION_KEY);
    matches!(written, Some(Ok(Some(v))) if v == new_version) && after == before
}

/// Byte span of the value text (inside quotes, if quoted) when `line` is a
/// top-level `version:` entry. Quoting, a leading `&anchor` or `!tag` and a
/// trailing `# comment` stay outside the span.
fn version_value_span(line: &str) -> Option<(usize, usize)> {
    let body = line.trim_end_matches(['\n', '\r']);
    let rest = ["version", "\"version\"", "'version'"]
        .iter()
        .find_map(|k| body.strip_prefix(k))?;
    let after_key = rest.trim_start_matches([' ', '\t']);
    let after_colon = after_key.strip_prefix(':')?;
    if !(after_colon.is_empty() || after_colon.starts_with([' ', '\t'])) {
        return None;
    }
    let mut value = after_colon.trim_start_matches([' ', '\t']);
    while value.starts_with(['&', '!']) {
        let token_end = value.find([' ', '\t'])?;
        value = value[token_end..].trim_start_matches([' ', '\t']);
    }
    let value_start = body.len() - value.len();

    match value.chars().next() {
        None | Some('#') | Some('|') | Some('>') => None,
        Some(q @ ('"' | '\'')) => {
            let inner = &value[1..];
            let close = inner.find(q)?;
            Some((value_start + 1, value_start + 1 + close))
        }
        Some(_) => {
            let comment = [" #", "\t#"]
                .iter()
                .filter_map(|m| value.find(m))
                .min()
                .unwrap_or(value.len());
            let len = value[..comment].trim_end().len();
            Some((value_start, value_start + len))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CHART: &str = r#"# Top comment
apiVersion: v2
name: demo   # the name
description: A demo chart
type: application

dependencies:
  - name: redis
    version: 17.0.0
    repository: https://charts.example.com

# bump me
version: 0.1.0 # managed by chartbump
appVersion: "1.16.0"
"#;

    fn write_chart(content: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CHART_FILE), content).unwrap();
        dir
    }

    #[test]
    fn test_read_manifest_fields() {
        let dir = write_chart(CHART);
        let m = read_manifest(dir.path()).unwrap();
        assert_eq!(m.api_version, "v2");
        assert_eq!(m.name, "demo");
        assert_eq!(m.chart_type.as_deref(), Some("application"));
        assert_eq!(m.version, "0.1.0");
        assert_eq!(m.app_version.as_deref(), Some("1.16.0"));
    }

    #[test]
    fn test_read_manifest_errors() {
        let missing = tempdir().unwrap();
        assert!(matches!(read_manifest(missing.path()), Err(Error::Io { .. })));

        let no_version = write_chart("apiVersion: v2\nname: demo\n");
        assert!(matches!(
            read_manifest(no_version.path()),
            Err(Error::MissingField { .. })
        ));

        let empty_version = write_chart("name: demo\nversion: \"\"\n");
        assert!(matches!(
            read_manifest(empty_version.path()),
            Err(Error::MissingField { .. })
        ));

        let malformed = write_chart("name: [unclosed\nversion: 1.0.0\n");
        assert!(matches!(
            read_manifest(malformed.path()),
            Err(Error::Parse { .. })
        ));

        let scalar_doc = write_chart("just a string\n");
        assert!(matches!(
            read_manifest(scalar_doc.path()),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_update_preserves_everything_else() {
        let dir = write_chart(CHART);
        update_version(dir.path(), "0.1.1").unwrap();
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        let expected = CHART.replace(
            "version: 0.1.0 # managed by chartbump",
            "version: 0.1.1 # managed by chartbump",
        );
        assert_eq!(after, expected);
        // nested dependency version untouched
        assert!(after.contains("    version: 17.0.0\n"));
    }

    #[test]
    fn test_update_then_read_round_trip() {
        let dir = write_chart(CHART);
        let before = read_manifest(dir.path()).unwrap();
        update_version(dir.path(), "0.2.7").unwrap();
        let after = read_manifest(dir.path()).unwrap();
        assert_eq!(after.version, "0.2.7");
        assert_eq!(
            ChartManifest {
                version: before.version.clone(),
                ..after
            },
            before
        );
    }

    #[test]
    fn test_update_keeps_quotes_and_crlf() {
        let dir = write_chart("name: demo\r\nversion: 'v1.0.0'\r\nappVersion: x\r\n");
        update_version(dir.path(), "v1.0.1").unwrap();
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(after, "name: demo\r\nversion: 'v1.0.1'\r\nappVersion: x\r\n");

        let dir = write_chart("\"version\" :  \"2.0.0\"\n");
        update_version(dir.path(), "2.0.1").unwrap();
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(after, "\"version\" :  \"2.0.1\"\n");
    }

    #[test]
    fn test_update_without_top_level_version() {
        let dir = write_chart("name: demo\ndependencies:\n  - name: a\n    version: 1.0.0\n");
        assert!(matches!(
            update_version(dir.path(), "1.0.1"),
            Err(Error::FieldNotFound { .. })
        ));
        // file untouched on failure
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert!(after.contains("version: 1.0.0"));
    }

    #[test]
    fn test_update_skips_version_line_inside_quoted_scalar() {
        let source = "name: demo\ndescription: \"first line\nversion: 9.9.9\"\nversion: 0.1.0\n";
        let dir = write_chart(source);
        update_version(dir.path(), "0.1.1").unwrap();
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(after, source.replace("version: 0.1.0", "version: 0.1.1"));
        let m = read_manifest(dir.path()).unwrap();
        assert_eq!(m.version, "0.1.1");
        assert_eq!(m.description, "first line version: 9.9.9");
    }

    #[test]
    fn test_update_refuses_when_no_line_edit_is_safe() {
        // the real key is escaped, so the only candidate line sits in `description`
        let source = "description: \"a\nversion: 2.0.0\"\n\"ver\\u0073ion\": 1.0.0\n";
        let dir = write_chart(source);
        assert_eq!(read_manifest(dir.path()).unwrap().version, "1.0.0");
        assert!(matches!(
            update_version(dir.path(), "1.0.1"),
            Err(Error::FieldNotFound { .. })
        ));
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(after, source);
    }

    #[test]
    fn test_update_keeps_anchor() {
        let dir = write_chart("name: demo\nversion: &v 0.1.0\n");
        update_version(dir.path(), "0.1.1").unwrap();
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(after, "name: demo\nversion: &v 0.1.1\n");

        // an alias would silently change appVersion too
        let aliased = "name: demo\nversion: &v 0.1.0\nappVersion: *v\n";
        let dir = write_chart(aliased);
        assert!(matches!(
            update_version(dir.path(), "0.1.1"),
            Err(Error::FieldNotFound { .. })
        ));
        let after = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(after, aliased);
    }

    #[test]
    fn test_similar_keys_are_not_matched() {
        assert_eq!(version_value_span("versions: 1\n"), None);
        assert_eq!(version_value_span("  version: 1.0.0\n"), None);
        assert_eq!(version_value_span("version:1.0.0\n"), None);
        assert_eq!(version_value_span("version: 1.0.0\n"), Some((9, 14)));
        assert_eq!(version_value_span("version: !!str 1.0.0\n"), Some((15, 20)));
        assert_eq!(version_value_span("version: &v\n"), None);
    }
}
