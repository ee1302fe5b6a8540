//! App configuration consulted by push registration.
//!
//! The project identifier may live in two places. The manifest's
//! `extra.eas.projectId` is checked first, then the build-time
//! `eas.projectId`. Empty strings count as absent.

use std::path::Path;

use serde::Deserialize;

use crate::Error;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub manifest: Option<Manifest>,
    #[serde(default)]
    pub eas: Option<EasConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub extra: Option<ManifestExtra>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtra {
    #[serde(default)]
    pub eas: Option<EasConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EasConfig {
    #[serde(default)]
    pub project_id: Option<String>,
}

impl AppConfig {
    /// Config whose manifest carries `project_id`
    pub fn with_project_id(project_id: &str) -> Self {
        Self {
            manifest: Some(Manifest {
                name: None,
                extra: Some(ManifestExtra {
                    eas: Some(EasConfig {
                        project_id: Some(project_id.to_owned()),
                    }),
                }),
            }),
            eas: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// First non-empty project identifier
    pub fn project_id(&self) -> Option<&str> {
        let from_manifest = self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.extra.as_ref())
            .and_then(|extra| extra.eas.as_ref())
            .and_then(|eas| eas.project_id.as_deref());
        let from_build = self.eas.as_ref().and_then(|eas| eas.project_id.as_deref());

        [from_manifest, from_build]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
    }
}
