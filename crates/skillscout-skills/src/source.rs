use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SourceError;

pub const DEFAULT_BRANCH: &str = "main";

/// Raw document text with the provenance label it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub content: String,
    pub origin: String,
}

/// A source entry exactly as it appears in the configuration file.
///
/// Validated into a [`SourceSpec`] by [`resolve_sources`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl SourceConfig {
    #[must_use]
    pub fn github(url: impl Into<String>) -> Self {
        Self {
            kind: "github".into(),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.subpath = Some(subpath.into());
        self
    }

    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            kind: "local".into(),
            path: Some(path.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Remote(RemoteSource),
    Local(LocalSource),
}

impl TryFrom<&SourceConfig> for SourceSpec {
    type Error = SourceError;

    fn try_from(config: &SourceConfig) -> Result<Self, Self::Error> {
        let required = |value: &Option<String>, field: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| SourceError::MissingField {
                    kind: config.kind.clone(),
                    field,
                })
        };

        match config.kind.as_str() {
            "github" => {
                let url = required(&config.url, "url")?;
                RemoteSource::from_url(&url, config.subpath.as_deref()).map(Self::Remote)
            }
            "local" => {
                let path = required(&config.path, "path")?;
                Ok(Self::Local(LocalSource {
                    directory: PathBuf::from(path),
                }))
            }
            other => Err(SourceError::UnknownType(other.to_owned())),
        }
    }
}

/// Validate configured sources, keeping their order.
///
/// Entries with an unknown `type` or missing fields are logged and skipped.
#[must_use]
pub fn resolve_sources(configs: &[SourceConfig]) -> Vec<SourceSpec> {
    configs
        .iter()
        .filter_map(|config| match SourceSpec::try_from(config) {
            Ok(spec) => Some(spec),
            Err(e) => {
                tracing::warn!("skipping skill source: {e}");
                None
            }
        })
        .collect()
}

/// A GitHub repository, optionally pinned to a branch and narrowed to a subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub subpath: Option<String>,
    /// `scheme://host/owner/repo`, used to build provenance labels.
    pub repo_url: String,
}

impl RemoteSource {
    /// Parse `https://host/owner/repo[/tree/<branch>[/<subpath>...]]`.
    ///
    /// A subpath embedded in the URL is used only when `subpath` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if the URL does not parse or has no
    /// `owner/repo` path.
    pub fn from_url(url: &str, subpath: Option<&str>) -> Result<Self, SourceError> {
        let invalid = |reason: &str| SourceError::InvalidUrl {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };
        let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let [owner, repo, rest @ ..] = segments.as_slice() else {
            return Err(invalid("expected /<owner>/<repo>"));
        };
        let repo = repo.trim_end_matches(".git");

        let mut branch = None;
        let mut url_subpath = None;
        if let ["tree", name, tail @ ..] = rest {
            branch = Some((*name).to_owned());
            if !tail.is_empty() {
                url_subpath = Some(tail.join("/"));
            }
        }

        let subpath = normalize_subpath(subpath).or_else(|| {
            let from_url = normalize_subpath(url_subpath.as_deref());
            if let Some(ref p) = from_url {
                tracing::debug!("using subpath '{p}' from URL {url}");
            }
            from_url
        });

        Ok(Self {
            owner: (*owner).to_owned(),
            repo: repo.to_owned(),
            branch,
            subpath,
            repo_url: format!("{}/{owner}/{repo}", parsed.origin().ascii_serialization()),
        })
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    #[must_use]
    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }
}

fn normalize_subpath(subpath: Option<&str>) -> Option<String> {
    subpath
        .map(|p| p.trim().trim_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
}

/// A local directory scanned recursively for SKILL.md files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSource {
    pub directory: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_repo_url() {
        let src = RemoteSource::from_url("https://github.com/acme/skills", None).unwrap();
        assert_eq!(src.owner, "acme");
        assert_eq!(src.repo, "skills");
        assert_eq!(src.branch(), "main");
        assert_eq!(src.subpath(), None);
        assert_eq!(src.repo_url, "https://github.com/acme/skills");
    }

    #[test]
    fn trailing_slash_and_git_suffix() {
        let src = RemoteSource::from_url("https://github.com/acme/skills.git/", None).unwrap();
        assert_eq!(src.repo, "skills");
        assert_eq!(src.repo_url, "https://github.com/acme/skills");
    }

    #[test]
    fn tree_url_extracts_branch_and_subpath() {
        let src = RemoteSource::from_url(
            "https://github.com/acme/cookbook/tree/dev/skills/custom_skills",
            None,
        )
        .unwrap();
        assert_eq!(src.branch(), "dev");
        assert_eq!(src.subpath(), Some("skills/custom_skills"));
        assert_eq!(src.repo_url, "https://github.com/acme/cookbook");
    }

    #[test]
    fn tree_url_with_branch_only() {
        let src = RemoteSource::from_url("https://github.com/acme/cookbook/tree/v2", None).unwrap();
        assert_eq!(src.branch(), "v2");
        assert_eq!(src.subpath(), None);
    }

    #[test]
    fn explicit_subpath_wins_over_url_subpath() {
        let src = RemoteSource::from_url(
            "https://github.com/acme/cookbook/tree/main/from-url",
            Some("/explicit/"),
        )
        .unwrap();
        assert_eq!(src.subpath(), Some("explicit"));
    }

    #[test]
    fn empty_explicit_subpath_falls_back_to_url() {
        let src = RemoteSource::from_url(
            "https://github.com/acme/cookbook/tree/main/from-url",
            Some("  "),
        )
        .unwrap();
        assert_eq!(src.subpath(), Some("from-url"));
    }

    #[test]
    fn url_without_repo_is_invalid() {
        let err = RemoteSource::from_url("https://github.com/acme", None).unwrap_err();
        assert!(matches!(err, SourceError::InvalidUrl { .. }));
    }

    #[test]
    fn unparseable_url_is_invalid() {
        assert!(RemoteSource::from_url("not a url", None).is_err());
    }

    #[test]
    fn config_to_spec() {
        let remote = SourceSpec::try_from(&SourceConfig::github("https://github.com/a/b")).unwrap();
        assert!(matches!(remote, SourceSpec::Remote(ref r) if r.owner == "a"));

        let local = SourceSpec::try_from(&SourceConfig::local("~/skills")).unwrap();
        assert_eq!(
            local,
            SourceSpec::Local(LocalSource {
                directory: PathBuf::from("~/skills")
            })
        );
    }

    #[test]
    fn unknown_type_rejected() {
        let config = SourceConfig {
            kind: "gitlab".into(),
            url: Some("https://gitlab.com/a/b".into()),
            ..SourceConfig::default()
        };
        assert_eq!(
            SourceSpec::try_from(&config),
            Err(SourceError::UnknownType("gitlab".into()))
        );
    }

    #[test]
    fn missing_required_field_rejected() {
        let config = SourceConfig {
            kind: "local".into(),
            ..SourceConfig::default()
        };
        assert_eq!(
            SourceSpec::try_from(&config),
            Err(SourceError::MissingField {
                kind: "local".into(),
                field: "path"
            })
        );
    }

    #[test]
    fn resolve_sources_skips_invalid_and_keeps_order() {
        let configs = vec![
            SourceConfig::local("/a"),
            SourceConfig {
                kind: "ftp".into(),
                ..SourceConfig::default()
            },
            SourceConfig::github("https://github.com/o/r").with_subpath("skills"),
            SourceConfig {
                kind: "github".into(),
                ..SourceConfig::default()
            },
            SourceConfig::local("/b"),
        ];
        let specs = resolve_sources(&configs);
        assert_eq!(specs.len(), 3);
        assert!(matches!(&specs[0], SourceSpec::Local(l) if l.directory == PathBuf::from("/a")));
        assert!(matches!(&specs[1], SourceSpec::Remote(r) if r.subpath() == Some("skills")));
        assert!(matches!(&specs[2], SourceSpec::Local(l) if l.directory == PathBuf::from("/b")));
    }

    #[test]
    fn deserializes_from_json_entry() {
        let config: SourceConfig = serde_json::from_str(
            r#"{"type": "github", "url": "https://github.com/o/r", "subpath": "s"}"#,
        )
        .unwrap();
        assert_eq!(config, SourceConfig::github("https://github.com/o/r").with_subpath("s"));
    }
}
